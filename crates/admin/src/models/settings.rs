//! Per-bundle storefront settings: display options, colors and labels.

use serde::{Deserialize, Serialize};

use neat_bundle_core::BundleId;

const DEFAULT_COLOR: &str = "#000000";

/// Stored settings for one bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSettings {
    pub bundle_id: BundleId,
    #[serde(flatten)]
    pub options: DisplayOptions,
    pub bundle_colors: BundleColors,
    pub bundle_labels: BundleLabels,
}

/// Settings as submitted by the admin UI.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(flatten)]
    pub options: DisplayOptions,
    pub bundle_colors: BundleColors,
    pub bundle_labels: BundleLabels,
}

/// Storefront behavior toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    pub display_discount_banner: bool,
    pub hide_pricing_summary: bool,
    pub skip_the_cart: bool,
    pub allow_back_navigation: bool,
    pub show_out_of_stock_products: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            display_discount_banner: false,
            hide_pricing_summary: false,
            skip_the_cart: false,
            allow_back_navigation: true,
            show_out_of_stock_products: false,
        }
    }
}

/// Widget colors, as `#RGB` or `#RRGGBB` hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleColors {
    pub add_to_bundle_btn: String,
    pub add_to_bundle_text: String,
    pub next_step_btn: String,
    pub next_step_btn_text: String,
    pub view_product_btn: String,
    pub view_product_btn_text: String,
    pub remove_products_btn: String,
    pub remove_products_btn_text: String,
    pub prev_step_btn: String,
    pub prev_step_btn_text: String,
    pub steps_icon: String,
    #[serde(rename = "titleAndDESC")]
    pub title_and_desc: String,
}

impl BundleColors {
    /// Every color field with its wire name, for validation.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 12] {
        [
            ("addToBundleBtn", self.add_to_bundle_btn.as_str()),
            ("addToBundleText", self.add_to_bundle_text.as_str()),
            ("nextStepBtn", self.next_step_btn.as_str()),
            ("nextStepBtnText", self.next_step_btn_text.as_str()),
            ("viewProductBtn", self.view_product_btn.as_str()),
            ("viewProductBtnText", self.view_product_btn_text.as_str()),
            ("removeProductsBtn", self.remove_products_btn.as_str()),
            ("removeProductsBtnText", self.remove_products_btn_text.as_str()),
            ("prevStepBtn", self.prev_step_btn.as_str()),
            ("prevStepBtnText", self.prev_step_btn_text.as_str()),
            ("stepsIcon", self.steps_icon.as_str()),
            ("titleAndDESC", self.title_and_desc.as_str()),
        ]
    }
}

impl Default for BundleColors {
    fn default() -> Self {
        let color = || DEFAULT_COLOR.to_string();
        Self {
            add_to_bundle_btn: color(),
            add_to_bundle_text: color(),
            next_step_btn: color(),
            next_step_btn_text: color(),
            view_product_btn: color(),
            view_product_btn_text: color(),
            remove_products_btn: color(),
            remove_products_btn_text: color(),
            prev_step_btn: color(),
            prev_step_btn_text: color(),
            steps_icon: color(),
            title_and_desc: color(),
        }
    }
}

/// Button labels shown in the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleLabels {
    pub add_to_bundle_btn: String,
    pub next_step_btn: String,
    pub prev_step_btn: String,
    pub view_product_btn: String,
}

impl BundleLabels {
    /// Every label field with its wire name, for validation.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("addToBundleBtn", self.add_to_bundle_btn.as_str()),
            ("nextStepBtn", self.next_step_btn.as_str()),
            ("prevStepBtn", self.prev_step_btn.as_str()),
            ("viewProductBtn", self.view_product_btn.as_str()),
        ]
    }
}

impl Default for BundleLabels {
    fn default() -> Self {
        Self {
            add_to_bundle_btn: "Add to bundle".to_string(),
            next_step_btn: "Next step".to_string(),
            prev_step_btn: "Previous step".to_string(),
            view_product_btn: "View product".to_string(),
        }
    }
}
