//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! nb-cli migrate
//! ```
//!
//! Migrations live in `crates/admin/migrations/` and create the `builder`
//! schema.

use neat_bundle_admin::config::BuilderConfig;
use neat_bundle_admin::db;

use super::CliError;

/// Run builder database migrations.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let config = BuilderConfig::from_env()?;

    tracing::info!("Connecting to builder database...");
    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running builder migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Builder migrations complete!");
    Ok(())
}
