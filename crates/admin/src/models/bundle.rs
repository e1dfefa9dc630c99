//! Bundle domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use neat_bundle_core::{BundleId, BundlePricing, DiscountType, ShopDomain};

use super::step::StepSummary;

/// A merchant-configured bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Unique bundle ID.
    pub id: BundleId,
    /// Shop that owns the bundle.
    pub shop_domain: ShopDomain,
    /// Display title.
    pub title: String,
    /// Whether the bundle is live on the storefront.
    pub published: bool,
    /// How the bundle price is computed.
    pub pricing: BundlePricing,
    /// Discount applied to calculated pricing.
    pub discount_type: DiscountType,
    /// Discount amount (percent or currency units, per `discount_type`).
    pub discount_value: Decimal,
    /// When the bundle was created.
    pub created_at: DateTime<Utc>,
    /// When the bundle was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A bundle together with its ordered step summaries.
///
/// This is the payload cached under the bundle-data key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleWithSteps {
    #[serde(flatten)]
    pub bundle: Bundle,
    /// Steps ordered by step number.
    pub steps: Vec<StepSummary>,
}

/// Input for creating a bundle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBundle {
    /// Display title.
    pub title: String,
}

/// Partial update of a bundle's own fields.
///
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleUpdate {
    pub title: Option<String>,
    pub published: Option<bool>,
    pub pricing: Option<BundlePricing>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
}

impl BundleUpdate {
    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.published.is_none()
            && self.pricing.is_none()
            && self.discount_type.is_none()
            && self.discount_value.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_update_partial() {
        let update: BundleUpdate =
            serde_json::from_str(r#"{"published": true, "discountType": "NO_DISCOUNT"}"#).unwrap();
        assert_eq!(update.published, Some(true));
        assert_eq!(update.discount_type, Some(DiscountType::NoDiscount));
        assert!(update.title.is_none());
        assert!(!update.is_empty());
        assert!(BundleUpdate::default().is_empty());
    }

    #[test]
    fn test_bundle_with_steps_is_flat() {
        let bundle = Bundle {
            id: BundleId::new(4),
            shop_domain: ShopDomain::parse("demo.myshopify.com").unwrap(),
            title: "Gift box".to_string(),
            published: false,
            pricing: BundlePricing::Calculated,
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::new(10, 0),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(BundleWithSteps {
            bundle,
            steps: vec![],
        })
        .unwrap();

        assert_eq!(value["id"], 4);
        assert_eq!(value["shopDomain"], "demo.myshopify.com");
        assert_eq!(value["discountType"], "PERCENTAGE");
        assert!(value["steps"].as_array().unwrap().is_empty());
    }
}
