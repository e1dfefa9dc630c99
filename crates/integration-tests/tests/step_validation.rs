//! Integration tests for step draft validation.
//!
//! Exercises the public validation API the admin routes use before any
//! database write.

use neat_bundle_admin::models::{ContentInput, StepDraft};
use neat_bundle_admin::services::{validate_new_step, validate_step};
use neat_bundle_core::{ContentInputType, StepType};
use neat_bundle_integration_tests::product_draft;

fn field_ids(draft: &StepDraft) -> Vec<String> {
    validate_step(draft).into_iter().map(|e| e.field_id).collect()
}

// =============================================================================
// Product Steps
// =============================================================================

#[test]
fn test_min_above_max_reports_max_products() {
    let ids = field_ids(&product_draft("Pick", 3, 2, 3));
    assert_eq!(ids, vec!["maxProducts"]);
}

#[test]
fn test_exact_selection_is_valid() {
    assert!(validate_step(&product_draft("Pick", 1, 3, 3)).is_empty());
}

#[test]
fn test_selection_below_minimum() {
    let errors = validate_step(&product_draft("Pick", 2, 3, 1));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field_id, "products");
    assert_eq!(errors[0].message, "Select at least 2 product(s) for this step.");
}

#[test]
fn test_new_step_may_have_no_products_yet() {
    assert!(validate_new_step(&product_draft("Pick", 2, 3, 0)).is_empty());
    assert_eq!(validate_step(&product_draft("Pick", 2, 3, 0)).len(), 1);
}

#[test]
fn test_all_violations_reported_together() {
    let mut draft = product_draft("", 0, -1, 0);
    draft.description = " ".to_owned();

    assert_eq!(
        field_ids(&draft),
        vec!["stepTitle", "stepDESC", "minProducts", "maxProducts"]
    );
}

// =============================================================================
// Content Steps
// =============================================================================

fn content_step(inputs: Vec<ContentInput>) -> StepDraft {
    StepDraft {
        step_type: StepType::Content,
        content_inputs: inputs,
        ..StepDraft::default_product(2)
    }
}

#[test]
fn test_default_content_slots_are_valid() {
    let draft = content_step(ContentInput::default_slots());
    assert!(validate_step(&draft).is_empty());
}

#[test]
fn test_content_field_ids_use_slot_position() {
    let draft = content_step(vec![
        ContentInput {
            input_type: ContentInputType::Text,
            input_label: "Message".to_owned(),
            max_chars: 100,
            required: true,
        },
        ContentInput {
            input_type: ContentInputType::Text,
            input_label: String::new(),
            max_chars: 0,
            required: false,
        },
    ]);

    assert_eq!(field_ids(&draft), vec!["inputLabel-2", "maxChars-2"]);
}

#[test]
fn test_content_step_ignores_product_bounds() {
    let mut draft = content_step(ContentInput::default_slots());
    draft.product_input.min_products_on_step = 5;
    draft.product_input.max_products_on_step = 1;

    assert!(validate_step(&draft).is_empty());
}
