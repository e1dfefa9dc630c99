//! Field-level validation of step drafts.
//!
//! Every violated rule is reported; validation never stops at the first
//! failure. Field ids match the admin form so the UI can attach each message
//! to its input.

use neat_bundle_core::StepType;

use crate::models::{ContentInput, FieldError, ProductInput, StepDraft};

/// Validate a step draft against the rules of its step type.
///
/// Returns an empty list when the draft is valid.
#[must_use]
pub fn validate_step(draft: &StepDraft) -> Vec<FieldError> {
    let mut errors = validate_new_step(draft);

    if draft.step_type == StepType::Product {
        validate_selection(&draft.product_input, &mut errors);
    }

    errors
}

/// Validate a draft for a step that is about to be added.
///
/// Same rules as [`validate_step`] except the product selection count:
/// products are picked once the step exists.
#[must_use]
pub fn validate_new_step(draft: &StepDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if is_blank(&draft.title) {
        errors.push(FieldError::new(
            "stepTitle",
            "Step title",
            "Step title is required.",
        ));
    }
    if is_blank(&draft.description) {
        errors.push(FieldError::new(
            "stepDESC",
            "Step description",
            "Step description is required.",
        ));
    }

    match draft.step_type {
        StepType::Product => validate_product_input(&draft.product_input, &mut errors),
        StepType::Content => validate_content_inputs(&draft.content_inputs, &mut errors),
    }

    errors
}

fn validate_product_input(input: &ProductInput, errors: &mut Vec<FieldError>) {
    let min = input.min_products_on_step;
    let max = input.max_products_on_step;

    if min < 1 {
        errors.push(FieldError::new(
            "minProducts",
            "Minimum products",
            "Minimum products must be at least 1.",
        ));
    }
    if max < min {
        errors.push(FieldError::new(
            "maxProducts",
            "Maximum products",
            "Maximum products must be greater than or equal to minimum products.",
        ));
    }
}

fn validate_selection(input: &ProductInput, errors: &mut Vec<FieldError>) {
    let min = input.min_products_on_step;
    let selected = input.products.len();
    if usize::try_from(min).is_ok_and(|min| selected < min) {
        errors.push(FieldError::new(
            "products",
            "Products",
            format!("Select at least {min} product(s) for this step."),
        ));
    }
}

/// Positions in field ids are 1-based, matching the stored slot order.
fn validate_content_inputs(inputs: &[ContentInput], errors: &mut Vec<FieldError>) {
    for (position, input) in (1_u32..).zip(inputs) {
        if !input.input_type.is_enabled() {
            continue;
        }

        if is_blank(&input.input_label) {
            errors.push(FieldError::new(
                format!("inputLabel-{position}"),
                format!("Input {position} label"),
                "Input label is required.",
            ));
        }
        if input.input_type.has_char_limit() && input.max_chars < 1 {
            errors.push(FieldError::new(
                format!("maxChars-{position}"),
                format!("Input {position} max characters"),
                "Max characters must be at least 1.",
            ));
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
