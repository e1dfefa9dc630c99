//! Transactional step sequencing.
//!
//! Every operation here runs in a single transaction that first locks the
//! bundle row (`SELECT ... FOR UPDATE`), so concurrent sequencing on the same
//! bundle is serialized. Before commit the resulting step numbers are checked
//! to be exactly `1..=count`; any other outcome rolls the transaction back.

use sqlx::{PgConnection, PgPool};
use thiserror::Error;

use neat_bundle_core::{BundleId, MAX_STEPS_PER_BUNDLE};

use super::RepositoryError;
use super::steps::{insert_step, load_step};
use crate::models::{StepDraft, StepSummary};

/// Errors from step sequencing.
#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("bundle {0} not found")]
    BundleNotFound(BundleId),

    #[error("step {step_number} not found in bundle {bundle_id}")]
    StepNotFound { bundle_id: BundleId, step_number: i32 },

    /// The bundle already holds the maximum number of steps.
    #[error("a bundle can have at most {max} steps")]
    LimitExceeded { max: i32 },

    /// Step numbers would no longer be `1..=count`; nothing was written.
    #[error("step numbering of bundle {bundle_id} would become {numbers:?}")]
    Inconsistent {
        bundle_id: BundleId,
        numbers: Vec<i32>,
    },

    #[error("transaction failed: {0}")]
    Transaction(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Direction of a bulk renumbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shift {
    /// Open a gap: every later step moves up by one.
    Up,
    /// Close a gap: every later step moves down by one.
    Down,
}

impl Shift {
    const fn delta(self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// Whether sorted step numbers form the dense sequence `1..=len`.
fn is_dense(numbers: &[i32]) -> bool {
    (1_i32..).zip(numbers).all(|(expected, actual)| expected == *actual)
}

/// Position rule for [`StepSequencer::insert_step_after`]: `after` must be an
/// existing step number, or 0 for the front.
const fn valid_insert_position(after: i32, count: i32) -> bool {
    after >= 0 && after <= count
}

/// Owns every change to `step_number` within a bundle.
pub struct StepSequencer<'a> {
    pool: &'a PgPool,
}

impl<'a> StepSequencer<'a> {
    /// Create a new step sequencer.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a step after the current last step.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::BundleNotFound` if the bundle doesn't exist.
    /// Returns `SequencerError::LimitExceeded` if the bundle is full.
    /// Returns `SequencerError::Transaction` for database failures.
    pub async fn append_step(
        &self,
        bundle_id: BundleId,
        draft: &StepDraft,
    ) -> Result<StepSummary, SequencerError> {
        let mut tx = self.pool.begin().await?;

        let count = lock_bundle(&mut tx, bundle_id).await?;
        ensure_capacity(count)?;

        let step = insert_step(&mut tx, bundle_id, count + 1, draft).await?;

        verify_dense(&mut tx, bundle_id).await?;
        tx.commit().await?;

        tracing::info!(bundle_id = %bundle_id, step_number = step.step_number, "Step appended");
        Ok(step)
    }

    /// Insert a step at `after + 1`, shifting every later step up by one.
    ///
    /// `after == 0` inserts at the front.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::StepNotFound` if `after` is neither 0 nor an
    /// existing step number.
    /// Returns `SequencerError::LimitExceeded` if the bundle is full.
    /// Returns `SequencerError::Transaction` for database failures.
    pub async fn insert_step_after(
        &self,
        bundle_id: BundleId,
        after: i32,
        draft: &StepDraft,
    ) -> Result<StepSummary, SequencerError> {
        let mut tx = self.pool.begin().await?;

        let count = lock_bundle(&mut tx, bundle_id).await?;
        if !valid_insert_position(after, count) {
            return Err(SequencerError::StepNotFound {
                bundle_id,
                step_number: after,
            });
        }
        ensure_capacity(count)?;

        shift_steps(&mut tx, bundle_id, after, Shift::Up).await?;
        let step = insert_step(&mut tx, bundle_id, after + 1, draft).await?;

        verify_dense(&mut tx, bundle_id).await?;
        tx.commit().await?;

        tracing::info!(bundle_id = %bundle_id, step_number = step.step_number, "Step inserted");
        Ok(step)
    }

    /// Delete a step and shift every later step down by one.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::StepNotFound` if the step doesn't exist.
    /// Returns `SequencerError::Transaction` for database failures.
    pub async fn delete_step(
        &self,
        bundle_id: BundleId,
        step_number: i32,
    ) -> Result<(), SequencerError> {
        let mut tx = self.pool.begin().await?;

        lock_bundle(&mut tx, bundle_id).await?;

        let deleted = sqlx::query(
            "DELETE FROM builder.bundle_step WHERE bundle_id = $1 AND step_number = $2",
        )
        .bind(bundle_id)
        .bind(step_number)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            return Err(SequencerError::StepNotFound {
                bundle_id,
                step_number,
            });
        }

        shift_steps(&mut tx, bundle_id, step_number, Shift::Down).await?;

        verify_dense(&mut tx, bundle_id).await?;
        tx.commit().await?;

        tracing::info!(bundle_id = %bundle_id, step_number, "Step deleted");
        Ok(())
    }

    /// Copy a step to `step_number + 1`, shifting every later step up by one.
    ///
    /// The copy carries the source's payload and a title suffixed with
    /// " - Copy".
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::LimitExceeded` if the bundle is full; nothing
    /// is changed in that case.
    /// Returns `SequencerError::StepNotFound` if the step doesn't exist.
    /// Returns `SequencerError::Transaction` for database failures.
    pub async fn duplicate_step(
        &self,
        bundle_id: BundleId,
        step_number: i32,
    ) -> Result<StepSummary, SequencerError> {
        let mut tx = self.pool.begin().await?;

        let count = lock_bundle(&mut tx, bundle_id).await?;
        ensure_capacity(count)?;

        let source = load_step(&mut tx, bundle_id, step_number)
            .await?
            .ok_or(SequencerError::StepNotFound {
                bundle_id,
                step_number,
            })?;

        shift_steps(&mut tx, bundle_id, step_number, Shift::Up).await?;
        let copy = insert_step(&mut tx, bundle_id, step_number + 1, &source.copy_draft()).await?;

        verify_dense(&mut tx, bundle_id).await?;
        tx.commit().await?;

        tracing::info!(
            bundle_id = %bundle_id,
            source_step = step_number,
            step_number = copy.step_number,
            "Step duplicated"
        );
        Ok(copy)
    }
}

/// Lock the bundle row for the rest of the transaction and return its step count.
async fn lock_bundle(conn: &mut PgConnection, bundle_id: BundleId) -> Result<i32, SequencerError> {
    sqlx::query_scalar::<_, i32>("SELECT id FROM builder.bundle WHERE id = $1 FOR UPDATE")
        .bind(bundle_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(SequencerError::BundleNotFound(bundle_id))?;

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM builder.bundle_step WHERE bundle_id = $1")
            .bind(bundle_id)
            .fetch_one(&mut *conn)
            .await?;

    i32::try_from(count).map_err(|_| {
        SequencerError::Repository(RepositoryError::DataCorruption(format!(
            "bundle {bundle_id} has {count} steps"
        )))
    })
}

fn ensure_capacity(count: i32) -> Result<(), SequencerError> {
    if count >= MAX_STEPS_PER_BUNDLE {
        return Err(SequencerError::LimitExceeded {
            max: MAX_STEPS_PER_BUNDLE,
        });
    }
    Ok(())
}

/// Move every step numbered above `above` by one in `direction`.
async fn shift_steps(
    conn: &mut PgConnection,
    bundle_id: BundleId,
    above: i32,
    direction: Shift,
) -> Result<u64, SequencerError> {
    let result = sqlx::query(
        "UPDATE builder.bundle_step \
         SET step_number = step_number + $3 \
         WHERE bundle_id = $1 AND step_number > $2",
    )
    .bind(bundle_id)
    .bind(above)
    .bind(direction.delta())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

async fn verify_dense(conn: &mut PgConnection, bundle_id: BundleId) -> Result<(), SequencerError> {
    let numbers: Vec<i32> = sqlx::query_scalar(
        "SELECT step_number FROM builder.bundle_step WHERE bundle_id = $1 ORDER BY step_number",
    )
    .bind(bundle_id)
    .fetch_all(&mut *conn)
    .await?;

    if is_dense(&numbers) {
        Ok(())
    } else {
        tracing::error!(bundle_id = %bundle_id, ?numbers, "Step numbering check failed, rolling back");
        Err(SequencerError::Inconsistent { bundle_id, numbers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_dense() {
        assert!(is_dense(&[]));
        assert!(is_dense(&[1]));
        assert!(is_dense(&[1, 2, 3, 4, 5]));
        assert!(!is_dense(&[2, 3]));
        assert!(!is_dense(&[1, 3]));
        assert!(!is_dense(&[1, 2, 2]));
    }

    #[test]
    fn test_shift_delta() {
        assert_eq!(Shift::Up.delta(), 1);
        assert_eq!(Shift::Down.delta(), -1);
    }

    #[test]
    fn test_valid_insert_position() {
        assert!(valid_insert_position(0, 0));
        assert!(valid_insert_position(0, 3));
        assert!(valid_insert_position(3, 3));
        assert!(!valid_insert_position(4, 3));
        assert!(!valid_insert_position(-1, 3));
    }

    #[test]
    fn test_ensure_capacity() {
        assert!(ensure_capacity(0).is_ok());
        assert!(ensure_capacity(MAX_STEPS_PER_BUNDLE - 1).is_ok());
        assert!(matches!(
            ensure_capacity(MAX_STEPS_PER_BUNDLE),
            Err(SequencerError::LimitExceeded { max: 5 })
        ));
    }

    /// Apply the renumbering rules to an in-memory list of step numbers and
    /// check that density holds after each operation.
    #[test]
    fn test_renumbering_rules_keep_density() {
        fn shift(numbers: &mut [i32], above: i32, direction: Shift) {
            for n in numbers.iter_mut().filter(|n| **n > above) {
                *n += direction.delta();
            }
        }

        let mut numbers = vec![1, 2, 3];

        // duplicate 2
        shift(&mut numbers, 2, Shift::Up);
        numbers.push(3);
        numbers.sort_unstable();
        assert!(is_dense(&numbers));
        assert_eq!(numbers, vec![1, 2, 3, 4]);

        // delete 1
        numbers.retain(|n| *n != 1);
        shift(&mut numbers, 1, Shift::Down);
        numbers.sort_unstable();
        assert_eq!(numbers, vec![1, 2, 3]);

        // insert at the front
        shift(&mut numbers, 0, Shift::Up);
        numbers.push(1);
        numbers.sort_unstable();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }
}
