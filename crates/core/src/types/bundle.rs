//! Bundle pricing enums.

use serde::{Deserialize, Serialize};

/// How the bundle price is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BundlePricing {
    /// Sum of the selected products, then discounted.
    #[default]
    Calculated,
    /// A fixed bundle price.
    Fixed,
}

text_enum!(BundlePricing {
    Calculated => "CALCULATED",
    Fixed => "FIXED",
});

/// Discount applied to a calculated bundle price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    #[default]
    Percentage,
    Fixed,
    NoDiscount,
}

text_enum!(DiscountType {
    Percentage => "PERCENTAGE",
    Fixed => "FIXED",
    NoDiscount => "NO_DISCOUNT",
});
