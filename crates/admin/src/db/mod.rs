//! Database operations for the bundle builder `PostgreSQL` schema.
//!
//! # Schema: `builder`
//!
//! ## Tables
//!
//! - `bundle` - Merchant bundles, scoped by shop domain
//! - `bundle_step` - Ordered steps; `(bundle_id, step_number)` is unique and dense
//! - `product_input` - Product selection rules, one row per step
//! - `step_product` - Products selected for a step
//! - `content_input` - Content input slots of a step
//! - `bundle_settings`, `bundle_colors`, `bundle_labels` - Storefront settings
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p neat-bundle-cli -- migrate
//! ```

pub mod bundles;
pub mod sequencer;
pub mod settings;
pub mod steps;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use bundles::BundleRepository;
pub use sequencer::{SequencerError, StepSequencer};
pub use settings::SettingsRepository;
pub use steps::StepRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
