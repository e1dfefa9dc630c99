//! Validation of bundle settings submitted by the admin UI.

use crate::models::{FieldError, SettingsUpdate};

/// Validate colors (`#RGB` or `#RRGGBB`) and labels (non-empty).
#[must_use]
pub fn validate_settings(input: &SettingsUpdate) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for (name, value) in input.bundle_colors.fields() {
        if !is_hex_color(value) {
            errors.push(FieldError::new(
                format!("color-{name}"),
                name,
                format!("'{value}' is not a valid hex color."),
            ));
        }
    }

    for (name, value) in input.bundle_labels.fields() {
        if value.trim().is_empty() {
            errors.push(FieldError::new(
                format!("label-{name}"),
                name,
                "Label is required.",
            ));
        }
    }

    errors
}

fn is_hex_color(value: &str) -> bool {
    value.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
    })
}
