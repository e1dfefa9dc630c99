//! Bundle step domain models.
//!
//! A step is either a product step (the shopper picks from
//! [`ProductInput::products`]) or a content step (the shopper fills
//! [`ContentInput`] slots). Both payloads are always stored so a step can
//! switch type without losing the other side's configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use neat_bundle_core::{BundleId, ContentInputType, StepId, StepType};

/// Lightweight step listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSummary {
    pub id: StepId,
    /// 1-based position within the bundle.
    pub step_number: i32,
    pub title: String,
    pub step_type: StepType,
}

/// A fully loaded step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Unique step ID.
    pub id: StepId,
    /// Bundle this step belongs to.
    pub bundle_id: BundleId,
    /// 1-based position within the bundle.
    pub step_number: i32,
    /// Step title shown to shoppers.
    pub title: String,
    /// Step description shown to shoppers.
    pub description: String,
    /// Which payload the storefront renders.
    pub step_type: StepType,
    /// Product selection configuration.
    pub product_input: ProductInput,
    /// Content input slots, in position order.
    pub content_inputs: Vec<ContentInput>,
    /// When the step was created.
    pub created_at: DateTime<Utc>,
}

/// Product selection configuration for a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    /// Minimum number of products the shopper must pick.
    pub min_products_on_step: i32,
    /// Maximum number of products the shopper may pick.
    pub max_products_on_step: i32,
    /// Whether the same product may be picked more than once.
    pub allow_product_duplicates: bool,
    /// Whether product prices are shown on the step.
    pub show_product_price: bool,
    /// Products the merchant selected for this step.
    #[serde(default)]
    pub products: Vec<SelectedProduct>,
}

impl Default for ProductInput {
    fn default() -> Self {
        Self {
            min_products_on_step: 1,
            max_products_on_step: 3,
            allow_product_duplicates: false,
            show_product_price: true,
            products: Vec::new(),
        }
    }
}

/// A product chosen by the merchant from their catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedProduct {
    /// Shopify product GID.
    pub shopify_product_id: String,
    /// Product handle.
    pub handle: String,
    /// Product title at the time it was selected.
    pub title: String,
}

/// A content input slot on a content step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInput {
    pub input_type: ContentInputType,
    pub input_label: String,
    /// Character limit; only meaningful for text inputs.
    pub max_chars: i32,
    pub required: bool,
}

impl ContentInput {
    /// The two slots every new step starts with.
    #[must_use]
    pub fn default_slots() -> Vec<Self> {
        vec![
            Self {
                input_type: ContentInputType::Text,
                input_label: "Enter text".to_string(),
                max_chars: 50,
                required: true,
            },
            Self {
                input_type: ContentInputType::None,
                input_label: String::new(),
                max_chars: 0,
                required: false,
            },
        ]
    }
}

/// Step content as submitted by the admin UI.
///
/// Used for creating, appending, inserting and updating steps. The step
/// number is never part of a draft; it is assigned by the sequencer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDraft {
    pub title: String,
    pub description: String,
    pub step_type: StepType,
    #[serde(default)]
    pub product_input: ProductInput,
    #[serde(default = "ContentInput::default_slots")]
    pub content_inputs: Vec<ContentInput>,
}

impl StepDraft {
    /// Default product step created for position `step_number`.
    #[must_use]
    pub fn default_product(step_number: i32) -> Self {
        Self {
            title: format!("Step {step_number}"),
            description: format!("This is a description for Step {step_number}"),
            step_type: StepType::Product,
            product_input: ProductInput::default(),
            content_inputs: ContentInput::default_slots(),
        }
    }
}

impl Step {
    /// Draft of a copy of this step: same content, title suffixed with " - Copy".
    #[must_use]
    pub fn copy_draft(&self) -> StepDraft {
        StepDraft {
            title: format!("{} - Copy", self.title),
            description: self.description.clone(),
            step_type: self.step_type,
            product_input: self.product_input.clone(),
            content_inputs: self.content_inputs.clone(),
        }
    }
}
