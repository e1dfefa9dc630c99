//! Bundle management commands.
//!
//! # Usage
//!
//! ```bash
//! nb-cli bundle create -s demo.myshopify.com -t "Gift Box"
//! ```

use neat_bundle_admin::config::BuilderConfig;
use neat_bundle_admin::db::{self, BundleRepository};
use neat_bundle_admin::models::NewBundle;
use neat_bundle_core::{BundleId, ShopDomain};

use super::CliError;

/// Create a bundle with default settings, colors, labels and three steps.
///
/// # Returns
///
/// The ID of the created bundle.
///
/// # Errors
///
/// Returns an error for a malformed shop or blank title, or if the database
/// transaction fails.
pub async fn create(shop: &str, title: &str) -> Result<BundleId, CliError> {
    let shop = ShopDomain::parse(shop)?;
    if title.trim().is_empty() {
        return Err(CliError::BlankTitle);
    }

    let config = BuilderConfig::from_env()?;

    tracing::info!("Connecting to builder database...");
    let pool = db::create_pool(&config.database_url).await?;

    let created = BundleRepository::new(&pool)
        .create(
            &shop,
            &NewBundle {
                title: title.to_owned(),
            },
        )
        .await?;

    tracing::info!(
        "Bundle created successfully! ID: {}, Shop: {}, Steps: {}",
        created.bundle.id,
        shop,
        created.steps.len()
    );

    Ok(created.bundle.id)
}
