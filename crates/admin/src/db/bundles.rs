//! Database operations for bundles.
//!
//! Every query is scoped by shop domain, so one shop can never read or
//! change another shop's bundle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use neat_bundle_core::{BundleId, BundlePricing, DiscountType, ShopDomain};

use super::RepositoryError;
use super::steps::{insert_step, list_summaries};
use crate::models::{Bundle, BundleUpdate, BundleWithSteps, NewBundle, StepDraft};

/// Number of steps a new bundle starts with.
const DEFAULT_STEP_COUNT: i32 = 3;

#[derive(Debug, sqlx::FromRow)]
struct BundleRow {
    id: i32,
    shop_domain: ShopDomain,
    title: String,
    published: bool,
    pricing: BundlePricing,
    discount_type: DiscountType,
    discount_value: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BundleRow> for Bundle {
    fn from(row: BundleRow) -> Self {
        Self {
            id: BundleId::new(row.id),
            shop_domain: row.shop_domain,
            title: row.title,
            published: row.published,
            pricing: row.pricing,
            discount_type: row.discount_type,
            discount_value: row.discount_value,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for bundle database operations.
pub struct BundleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BundleRepository<'a> {
    /// Create a new bundle repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a bundle with default settings, colors, labels and three
    /// default product steps, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// written in that case.
    pub async fn create(
        &self,
        shop: &ShopDomain,
        input: &NewBundle,
    ) -> Result<BundleWithSteps, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BundleRow>(
            "INSERT INTO builder.bundle (shop_domain, title) \
             VALUES ($1, $2) \
             RETURNING id, shop_domain, title, published, pricing, discount_type, \
                       discount_value, created_at, updated_at",
        )
        .bind(shop)
        .bind(input.title.trim())
        .fetch_one(&mut *tx)
        .await?;
        let bundle: Bundle = row.into();

        for statement in [
            "INSERT INTO builder.bundle_settings (bundle_id) VALUES ($1)",
            "INSERT INTO builder.bundle_colors (bundle_id) VALUES ($1)",
            "INSERT INTO builder.bundle_labels (bundle_id) VALUES ($1)",
        ] {
            sqlx::query(statement)
                .bind(bundle.id)
                .execute(&mut *tx)
                .await?;
        }

        let mut steps = Vec::new();
        for step_number in 1..=DEFAULT_STEP_COUNT {
            let draft = StepDraft::default_product(step_number);
            steps.push(insert_step(&mut tx, bundle.id, step_number, &draft).await?);
        }

        tx.commit().await?;

        tracing::info!(bundle_id = %bundle.id, shop = %shop, "Bundle created");
        Ok(BundleWithSteps { bundle, steps })
    }

    /// Get a bundle owned by `shop`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        shop: &ShopDomain,
        id: BundleId,
    ) -> Result<Option<Bundle>, RepositoryError> {
        let row = sqlx::query_as::<_, BundleRow>(
            "SELECT id, shop_domain, title, published, pricing, discount_type, \
                    discount_value, created_at, updated_at \
             FROM builder.bundle \
             WHERE id = $1 AND shop_domain = $2",
        )
        .bind(id)
        .bind(shop)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a bundle owned by `shop` together with its step summaries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_steps(
        &self,
        shop: &ShopDomain,
        id: BundleId,
    ) -> Result<Option<BundleWithSteps>, RepositoryError> {
        let Some(bundle) = self.get(shop, id).await? else {
            return Ok(None);
        };

        let mut conn = self.pool.acquire().await?;
        let steps = list_summaries(&mut conn, id).await?;

        Ok(Some(BundleWithSteps { bundle, steps }))
    }

    /// List all bundles of a shop, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, shop: &ShopDomain) -> Result<Vec<Bundle>, RepositoryError> {
        let rows = sqlx::query_as::<_, BundleRow>(
            "SELECT id, shop_domain, title, published, pricing, discount_type, \
                    discount_value, created_at, updated_at \
             FROM builder.bundle \
             WHERE shop_domain = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(shop)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Apply a partial update to a bundle's own fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the bundle doesn't exist for this shop.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        shop: &ShopDomain,
        id: BundleId,
        input: &BundleUpdate,
    ) -> Result<Bundle, RepositoryError> {
        let row = sqlx::query_as::<_, BundleRow>(
            "UPDATE builder.bundle \
             SET title = COALESCE($3, title), \
                 published = COALESCE($4, published), \
                 pricing = COALESCE($5, pricing), \
                 discount_type = COALESCE($6, discount_type), \
                 discount_value = COALESCE($7, discount_value), \
                 updated_at = NOW() \
             WHERE id = $1 AND shop_domain = $2 \
             RETURNING id, shop_domain, title, published, pricing, discount_type, \
                       discount_value, created_at, updated_at",
        )
        .bind(id)
        .bind(shop)
        .bind(input.title.as_deref().map(str::trim))
        .bind(input.published)
        .bind(input.pricing)
        .bind(input.discount_type)
        .bind(input.discount_value)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a bundle; steps, payloads and settings cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the bundle doesn't exist for this shop.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, shop: &ShopDomain, id: BundleId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM builder.bundle WHERE id = $1 AND shop_domain = $2")
                .bind(id)
                .bind(shop)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::info!(bundle_id = %id, shop = %shop, "Bundle deleted");
        Ok(())
    }
}
