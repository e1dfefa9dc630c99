//! Postgres-backed scenarios for step numbering.
//!
//! Each test gets a fresh database with the builder migrations applied.
//! Run with `cargo test -p neat-bundle-integration-tests -- --ignored`
//! and `DATABASE_URL` pointing at a scratch server.

#![allow(clippy::unwrap_used)]

use sqlx::PgPool;

use neat_bundle_admin::db::{BundleRepository, SequencerError, StepRepository, StepSequencer};
use neat_bundle_admin::models::NewBundle;
use neat_bundle_core::BundleId;
use neat_bundle_integration_tests::{demo_shop, product, product_draft};

async fn new_bundle(pool: &PgPool) -> BundleId {
    BundleRepository::new(pool)
        .create(
            &demo_shop(),
            &NewBundle {
                title: "Gift box".to_owned(),
            },
        )
        .await
        .unwrap()
        .bundle
        .id
}

async fn titles(pool: &PgPool, bundle_id: BundleId) -> Vec<(i32, String)> {
    StepRepository::new(pool)
        .list_summaries(bundle_id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| (s.step_number, s.title))
        .collect()
}

fn numbers(steps: &[(i32, String)]) -> Vec<i32> {
    steps.iter().map(|(n, _)| *n).collect()
}

// =============================================================================
// Duplicate
// =============================================================================

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_middle_step(pool: PgPool) {
    let bundle_id = new_bundle(&pool).await;

    let copy = StepSequencer::new(&pool)
        .duplicate_step(bundle_id, 2)
        .await
        .unwrap();

    assert_eq!(copy.step_number, 3);
    assert_eq!(
        titles(&pool, bundle_id).await,
        vec![
            (1, "Step 1".to_owned()),
            (2, "Step 2".to_owned()),
            (3, "Step 2 - Copy".to_owned()),
            (4, "Step 3".to_owned()),
        ]
    );
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_copies_payload(pool: PgPool) {
    let bundle_id = new_bundle(&pool).await;
    StepRepository::new(&pool)
        .replace_selected_products(bundle_id, 1, &[product(1), product(2)])
        .await
        .unwrap();

    StepSequencer::new(&pool)
        .duplicate_step(bundle_id, 1)
        .await
        .unwrap();

    let copy = StepRepository::new(&pool)
        .get(bundle_id, 2)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(copy.title, "Step 1 - Copy");
    assert_eq!(copy.product_input.products, vec![product(1), product(2)]);
    assert_eq!(copy.content_inputs.len(), 2);
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_at_limit_changes_nothing(pool: PgPool) {
    let bundle_id = new_bundle(&pool).await;
    let sequencer = StepSequencer::new(&pool);
    sequencer.duplicate_step(bundle_id, 1).await.unwrap();
    sequencer.duplicate_step(bundle_id, 1).await.unwrap();
    let before = titles(&pool, bundle_id).await;
    assert_eq!(before.len(), 5);

    let err = sequencer.duplicate_step(bundle_id, 3).await.unwrap_err();

    assert!(matches!(err, SequencerError::LimitExceeded { max: 5 }));
    assert_eq!(titles(&pool, bundle_id).await, before);
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_missing_step(pool: PgPool) {
    let bundle_id = new_bundle(&pool).await;

    let err = StepSequencer::new(&pool)
        .duplicate_step(bundle_id, 4)
        .await
        .unwrap_err();

    assert!(matches!(err, SequencerError::StepNotFound { step_number: 4, .. }));
}

// =============================================================================
// Delete
// =============================================================================

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_shifts_later_steps_down(pool: PgPool) {
    let bundle_id = new_bundle(&pool).await;
    let sequencer = StepSequencer::new(&pool);
    sequencer
        .append_step(bundle_id, &product_draft("Fourth", 1, 3, 0))
        .await
        .unwrap();

    sequencer.delete_step(bundle_id, 2).await.unwrap();

    assert_eq!(
        titles(&pool, bundle_id).await,
        vec![
            (1, "Step 1".to_owned()),
            (2, "Step 3".to_owned()),
            (3, "Fourth".to_owned()),
        ]
    );
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_missing_step(pool: PgPool) {
    let bundle_id = new_bundle(&pool).await;

    let err = StepSequencer::new(&pool)
        .delete_step(bundle_id, 9)
        .await
        .unwrap_err();

    assert!(matches!(err, SequencerError::StepNotFound { step_number: 9, .. }));
    assert_eq!(numbers(&titles(&pool, bundle_id).await), vec![1, 2, 3]);
}

// =============================================================================
// Append / Insert
// =============================================================================

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_at_front(pool: PgPool) {
    let bundle_id = new_bundle(&pool).await;

    let step = StepSequencer::new(&pool)
        .insert_step_after(bundle_id, 0, &product_draft("Intro", 1, 3, 0))
        .await
        .unwrap();

    assert_eq!(step.step_number, 1);
    assert_eq!(
        titles(&pool, bundle_id).await,
        vec![
            (1, "Intro".to_owned()),
            (2, "Step 1".to_owned()),
            (3, "Step 2".to_owned()),
            (4, "Step 3".to_owned()),
        ]
    );
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_after_missing_anchor(pool: PgPool) {
    let bundle_id = new_bundle(&pool).await;

    let err = StepSequencer::new(&pool)
        .insert_step_after(bundle_id, 4, &product_draft("Late", 1, 3, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, SequencerError::StepNotFound { step_number: 4, .. }));
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_append_to_unknown_bundle(pool: PgPool) {
    let err = StepSequencer::new(&pool)
        .append_step(BundleId::new(999), &product_draft("Orphan", 1, 3, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, SequencerError::BundleNotFound(_)));
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_numbers_stay_dense_through_mixed_operations(pool: PgPool) {
    let bundle_id = new_bundle(&pool).await;
    let sequencer = StepSequencer::new(&pool);

    sequencer.delete_step(bundle_id, 1).await.unwrap();
    sequencer
        .insert_step_after(bundle_id, 1, &product_draft("Middle", 1, 3, 0))
        .await
        .unwrap();
    sequencer.duplicate_step(bundle_id, 3).await.unwrap();
    sequencer.delete_step(bundle_id, 4).await.unwrap();
    sequencer
        .append_step(bundle_id, &product_draft("Last", 1, 3, 0))
        .await
        .unwrap();
    sequencer.delete_step(bundle_id, 2).await.unwrap();

    let steps = titles(&pool, bundle_id).await;
    let expected: Vec<i32> = (1..=i32::try_from(steps.len()).unwrap()).collect();
    assert_eq!(numbers(&steps), expected);
    assert_eq!(steps.last().unwrap().1, "Last");
}
