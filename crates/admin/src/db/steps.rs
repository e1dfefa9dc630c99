//! Database operations for bundle steps and their payloads.
//!
//! Step numbering is owned by [`super::StepSequencer`]; nothing in this
//! module changes a step's number or type.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use neat_bundle_core::{BundleId, ContentInputType, StepId, StepType};

use super::RepositoryError;
use crate::models::{ContentInput, ProductInput, SelectedProduct, Step, StepDraft, StepSummary};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct StepRow {
    id: i32,
    bundle_id: i32,
    step_number: i32,
    title: String,
    description: String,
    step_type: StepType,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct StepSummaryRow {
    id: i32,
    step_number: i32,
    title: String,
    step_type: StepType,
}

impl From<StepSummaryRow> for StepSummary {
    fn from(row: StepSummaryRow) -> Self {
        Self {
            id: StepId::new(row.id),
            step_number: row.step_number,
            title: row.title,
            step_type: row.step_type,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductInputRow {
    min_products_on_step: i32,
    max_products_on_step: i32,
    allow_product_duplicates: bool,
    show_product_price: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct StepProductRow {
    shopify_product_id: String,
    handle: String,
    title: String,
}

impl From<StepProductRow> for SelectedProduct {
    fn from(row: StepProductRow) -> Self {
        Self {
            shopify_product_id: row.shopify_product_id,
            handle: row.handle,
            title: row.title,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContentInputRow {
    input_type: ContentInputType,
    input_label: String,
    max_chars: i32,
    required: bool,
}

impl From<ContentInputRow> for ContentInput {
    fn from(row: ContentInputRow) -> Self {
        Self {
            input_type: row.input_type,
            input_label: row.input_label,
            max_chars: row.max_chars,
            required: row.required,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for reading and editing step content.
pub struct StepRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StepRepository<'a> {
    /// Create a new step repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a step with its full payload.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if the step has no product input row.
    pub async fn get(
        &self,
        bundle_id: BundleId,
        step_number: i32,
    ) -> Result<Option<Step>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        load_step(&mut conn, bundle_id, step_number).await
    }

    /// List step summaries of a bundle ordered by step number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_summaries(
        &self,
        bundle_id: BundleId,
    ) -> Result<Vec<StepSummary>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        list_summaries(&mut conn, bundle_id).await
    }

    /// Replace a step's content: title, description, type, product input
    /// with its product list, and content inputs.
    ///
    /// The step keeps its number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the step doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_content(
        &self,
        bundle_id: BundleId,
        step_number: i32,
        draft: &StepDraft,
    ) -> Result<Step, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let step_id: i32 = sqlx::query_scalar(
            "UPDATE builder.bundle_step \
             SET title = $3, description = $4, step_type = $5 \
             WHERE bundle_id = $1 AND step_number = $2 \
             RETURNING id",
        )
        .bind(bundle_id)
        .bind(step_number)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.step_type)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        let step_id = StepId::new(step_id);

        sqlx::query(
            "UPDATE builder.product_input \
             SET min_products_on_step = $2, max_products_on_step = $3, \
                 allow_product_duplicates = $4, show_product_price = $5 \
             WHERE step_id = $1",
        )
        .bind(step_id)
        .bind(draft.product_input.min_products_on_step)
        .bind(draft.product_input.max_products_on_step)
        .bind(draft.product_input.allow_product_duplicates)
        .bind(draft.product_input.show_product_price)
        .execute(&mut *tx)
        .await?;

        replace_products(&mut tx, step_id, &draft.product_input.products).await?;

        sqlx::query("DELETE FROM builder.content_input WHERE step_id = $1")
            .bind(step_id)
            .execute(&mut *tx)
            .await?;
        insert_content_inputs(&mut tx, step_id, &draft.content_inputs).await?;

        let step = load_step(&mut tx, bundle_id, step_number)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;

        Ok(step)
    }

    /// Replace the selected products of a step, keeping everything else.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the step doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn replace_selected_products(
        &self,
        bundle_id: BundleId,
        step_number: i32,
        products: &[SelectedProduct],
    ) -> Result<Step, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let step_id: i32 = sqlx::query_scalar(
            "SELECT id FROM builder.bundle_step \
             WHERE bundle_id = $1 AND step_number = $2 \
             FOR UPDATE",
        )
        .bind(bundle_id)
        .bind(step_number)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        replace_products(&mut tx, StepId::new(step_id), products).await?;

        let step = load_step(&mut tx, bundle_id, step_number)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;

        Ok(step)
    }
}

// =============================================================================
// Connection-level helpers (shared with the sequencer and bundle creation)
// =============================================================================

/// Insert a step row at `step_number` together with its payload rows.
pub(crate) async fn insert_step(
    conn: &mut PgConnection,
    bundle_id: BundleId,
    step_number: i32,
    draft: &StepDraft,
) -> Result<StepSummary, RepositoryError> {
    let row = sqlx::query_as::<_, StepSummaryRow>(
        "INSERT INTO builder.bundle_step (bundle_id, step_number, title, description, step_type) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, step_number, title, step_type",
    )
    .bind(bundle_id)
    .bind(step_number)
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(draft.step_type)
    .fetch_one(&mut *conn)
    .await?;
    let step_id = StepId::new(row.id);

    let input = &draft.product_input;
    sqlx::query(
        "INSERT INTO builder.product_input \
             (step_id, min_products_on_step, max_products_on_step, \
              allow_product_duplicates, show_product_price) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(step_id)
    .bind(input.min_products_on_step)
    .bind(input.max_products_on_step)
    .bind(input.allow_product_duplicates)
    .bind(input.show_product_price)
    .execute(&mut *conn)
    .await?;

    replace_products(conn, step_id, &input.products).await?;
    insert_content_inputs(conn, step_id, &draft.content_inputs).await?;

    Ok(row.into())
}

/// Load a step and its payload rows.
pub(crate) async fn load_step(
    conn: &mut PgConnection,
    bundle_id: BundleId,
    step_number: i32,
) -> Result<Option<Step>, RepositoryError> {
    let Some(row) = sqlx::query_as::<_, StepRow>(
        "SELECT id, bundle_id, step_number, title, description, step_type, created_at \
         FROM builder.bundle_step \
         WHERE bundle_id = $1 AND step_number = $2",
    )
    .bind(bundle_id)
    .bind(step_number)
    .fetch_optional(&mut *conn)
    .await?
    else {
        return Ok(None);
    };

    let input = sqlx::query_as::<_, ProductInputRow>(
        "SELECT min_products_on_step, max_products_on_step, \
                allow_product_duplicates, show_product_price \
         FROM builder.product_input \
         WHERE step_id = $1",
    )
    .bind(row.id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| RepositoryError::DataCorruption(format!("step {} has no product input", row.id)))?;

    let products = sqlx::query_as::<_, StepProductRow>(
        "SELECT shopify_product_id, handle, title \
         FROM builder.step_product \
         WHERE step_id = $1 \
         ORDER BY position",
    )
    .bind(row.id)
    .fetch_all(&mut *conn)
    .await?;

    let content_inputs = sqlx::query_as::<_, ContentInputRow>(
        "SELECT input_type, input_label, max_chars, required \
         FROM builder.content_input \
         WHERE step_id = $1 \
         ORDER BY position",
    )
    .bind(row.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(Step {
        id: StepId::new(row.id),
        bundle_id: BundleId::new(row.bundle_id),
        step_number: row.step_number,
        title: row.title,
        description: row.description,
        step_type: row.step_type,
        product_input: ProductInput {
            min_products_on_step: input.min_products_on_step,
            max_products_on_step: input.max_products_on_step,
            allow_product_duplicates: input.allow_product_duplicates,
            show_product_price: input.show_product_price,
            products: products.into_iter().map(Into::into).collect(),
        },
        content_inputs: content_inputs.into_iter().map(Into::into).collect(),
        created_at: row.created_at,
    }))
}

/// Step summaries of a bundle, ordered by step number.
pub(crate) async fn list_summaries(
    conn: &mut PgConnection,
    bundle_id: BundleId,
) -> Result<Vec<StepSummary>, RepositoryError> {
    let rows = sqlx::query_as::<_, StepSummaryRow>(
        "SELECT id, step_number, title, step_type \
         FROM builder.bundle_step \
         WHERE bundle_id = $1 \
         ORDER BY step_number",
    )
    .bind(bundle_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

async fn replace_products(
    conn: &mut PgConnection,
    step_id: StepId,
    products: &[SelectedProduct],
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM builder.step_product WHERE step_id = $1")
        .bind(step_id)
        .execute(&mut *conn)
        .await?;

    for (position, product) in (1_i32..).zip(products) {
        sqlx::query(
            "INSERT INTO builder.step_product (step_id, shopify_product_id, handle, title, position) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(step_id)
        .bind(&product.shopify_product_id)
        .bind(&product.handle)
        .bind(&product.title)
        .bind(position)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn insert_content_inputs(
    conn: &mut PgConnection,
    step_id: StepId,
    inputs: &[ContentInput],
) -> Result<(), RepositoryError> {
    for (position, input) in (1_i32..).zip(inputs) {
        sqlx::query(
            "INSERT INTO builder.content_input \
                 (step_id, input_type, input_label, max_chars, required, position) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(step_id)
        .bind(input.input_type)
        .bind(&input.input_label)
        .bind(input.max_chars)
        .bind(input.required)
        .bind(position)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
