//! Bundle step enums and limits.

use serde::{Deserialize, Serialize};

/// Maximum number of steps a single bundle may hold.
pub const MAX_STEPS_PER_BUNDLE: i32 = 5;

/// What a shopper does on a bundle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepType {
    /// Shopper picks products from the step's selection.
    Product,
    /// Shopper fills in content inputs (text, image upload).
    Content,
}

text_enum!(StepType {
    Product => "PRODUCT",
    Content => "CONTENT",
});

/// Kind of a content input on a content step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentInputType {
    /// Free text with a character limit.
    Text,
    /// Image upload.
    Image,
    /// Slot is disabled.
    #[default]
    None,
}

text_enum!(ContentInputType {
    Text => "TEXT",
    Image => "IMAGE",
    None => "NONE",
});

impl ContentInputType {
    /// Whether the shopper sees this input at all.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether a character limit applies to this input.
    #[must_use]
    pub const fn has_char_limit(self) -> bool {
        matches!(self, Self::Text)
    }
}
