//! Database operations for per-bundle storefront settings.

use sqlx::PgPool;

use neat_bundle_core::BundleId;

use super::RepositoryError;
use crate::models::{BundleColors, BundleLabels, BundleSettings, DisplayOptions, SettingsUpdate};

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    bundle_id: i32,
    display_discount_banner: bool,
    hide_pricing_summary: bool,
    skip_the_cart: bool,
    allow_back_navigation: bool,
    show_out_of_stock_products: bool,
    add_to_bundle_btn: String,
    add_to_bundle_text: String,
    next_step_btn: String,
    next_step_btn_text: String,
    view_product_btn: String,
    view_product_btn_text: String,
    remove_products_btn: String,
    remove_products_btn_text: String,
    prev_step_btn: String,
    prev_step_btn_text: String,
    steps_icon: String,
    title_and_desc: String,
    label_add_to_bundle_btn: String,
    label_next_step_btn: String,
    label_prev_step_btn: String,
    label_view_product_btn: String,
}

impl From<SettingsRow> for BundleSettings {
    fn from(row: SettingsRow) -> Self {
        Self {
            bundle_id: BundleId::new(row.bundle_id),
            options: DisplayOptions {
                display_discount_banner: row.display_discount_banner,
                hide_pricing_summary: row.hide_pricing_summary,
                skip_the_cart: row.skip_the_cart,
                allow_back_navigation: row.allow_back_navigation,
                show_out_of_stock_products: row.show_out_of_stock_products,
            },
            bundle_colors: BundleColors {
                add_to_bundle_btn: row.add_to_bundle_btn,
                add_to_bundle_text: row.add_to_bundle_text,
                next_step_btn: row.next_step_btn,
                next_step_btn_text: row.next_step_btn_text,
                view_product_btn: row.view_product_btn,
                view_product_btn_text: row.view_product_btn_text,
                remove_products_btn: row.remove_products_btn,
                remove_products_btn_text: row.remove_products_btn_text,
                prev_step_btn: row.prev_step_btn,
                prev_step_btn_text: row.prev_step_btn_text,
                steps_icon: row.steps_icon,
                title_and_desc: row.title_and_desc,
            },
            bundle_labels: BundleLabels {
                add_to_bundle_btn: row.label_add_to_bundle_btn,
                next_step_btn: row.label_next_step_btn,
                prev_step_btn: row.label_prev_step_btn,
                view_product_btn: row.label_view_product_btn,
            },
        }
    }
}

/// Repository for bundle settings, colors and labels.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the settings of a bundle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, bundle_id: BundleId) -> Result<Option<BundleSettings>, RepositoryError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT s.bundle_id, s.display_discount_banner, s.hide_pricing_summary, \
                    s.skip_the_cart, s.allow_back_navigation, s.show_out_of_stock_products, \
                    c.add_to_bundle_btn, c.add_to_bundle_text, c.next_step_btn, \
                    c.next_step_btn_text, c.view_product_btn, c.view_product_btn_text, \
                    c.remove_products_btn, c.remove_products_btn_text, c.prev_step_btn, \
                    c.prev_step_btn_text, c.steps_icon, c.title_and_desc, \
                    l.add_to_bundle_btn AS label_add_to_bundle_btn, \
                    l.next_step_btn AS label_next_step_btn, \
                    l.prev_step_btn AS label_prev_step_btn, \
                    l.view_product_btn AS label_view_product_btn \
             FROM builder.bundle_settings s \
             JOIN builder.bundle_colors c ON c.bundle_id = s.bundle_id \
             JOIN builder.bundle_labels l ON l.bundle_id = s.bundle_id \
             WHERE s.bundle_id = $1",
        )
        .bind(bundle_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Overwrite settings, colors and labels of a bundle in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the bundle has no settings row.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        bundle_id: BundleId,
        input: &SettingsUpdate,
    ) -> Result<BundleSettings, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let options = &input.options;
        let updated = sqlx::query(
            "UPDATE builder.bundle_settings \
             SET display_discount_banner = $2, hide_pricing_summary = $3, skip_the_cart = $4, \
                 allow_back_navigation = $5, show_out_of_stock_products = $6 \
             WHERE bundle_id = $1",
        )
        .bind(bundle_id)
        .bind(options.display_discount_banner)
        .bind(options.hide_pricing_summary)
        .bind(options.skip_the_cart)
        .bind(options.allow_back_navigation)
        .bind(options.show_out_of_stock_products)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let colors = &input.bundle_colors;
        sqlx::query(
            "UPDATE builder.bundle_colors \
             SET add_to_bundle_btn = $2, add_to_bundle_text = $3, next_step_btn = $4, \
                 next_step_btn_text = $5, view_product_btn = $6, view_product_btn_text = $7, \
                 remove_products_btn = $8, remove_products_btn_text = $9, prev_step_btn = $10, \
                 prev_step_btn_text = $11, steps_icon = $12, title_and_desc = $13 \
             WHERE bundle_id = $1",
        )
        .bind(bundle_id)
        .bind(&colors.add_to_bundle_btn)
        .bind(&colors.add_to_bundle_text)
        .bind(&colors.next_step_btn)
        .bind(&colors.next_step_btn_text)
        .bind(&colors.view_product_btn)
        .bind(&colors.view_product_btn_text)
        .bind(&colors.remove_products_btn)
        .bind(&colors.remove_products_btn_text)
        .bind(&colors.prev_step_btn)
        .bind(&colors.prev_step_btn_text)
        .bind(&colors.steps_icon)
        .bind(&colors.title_and_desc)
        .execute(&mut *tx)
        .await?;

        let labels = &input.bundle_labels;
        sqlx::query(
            "UPDATE builder.bundle_labels \
             SET add_to_bundle_btn = $2, next_step_btn = $3, prev_step_btn = $4, \
                 view_product_btn = $5 \
             WHERE bundle_id = $1",
        )
        .bind(bundle_id)
        .bind(labels.add_to_bundle_btn.trim())
        .bind(labels.next_step_btn.trim())
        .bind(labels.prev_step_btn.trim())
        .bind(labels.view_product_btn.trim())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get(bundle_id).await?.ok_or(RepositoryError::NotFound)
    }
}
