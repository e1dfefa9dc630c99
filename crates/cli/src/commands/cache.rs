//! Cache maintenance commands.
//!
//! # Usage
//!
//! ```bash
//! nb-cli cache flush -s demo.myshopify.com -b 12
//! ```
//!
//! Requires `REDIS_URL`; the in-process cache of a running server cannot be
//! reached from here.

use neat_bundle_admin::cache::{CacheKeys, CacheStore, RedisStore};
use neat_bundle_admin::config::BuilderConfig;
use neat_bundle_core::{BundleId, ShopDomain};

use super::CliError;

/// Delete every cache key a bundle can occupy.
///
/// # Errors
///
/// Returns an error for a malformed shop, a missing `REDIS_URL`, or if Redis
/// is unreachable.
pub async fn flush(shop: &str, bundle_id: i32) -> Result<(), CliError> {
    let shop = ShopDomain::parse(shop)?;
    let bundle_id = BundleId::new(bundle_id);

    let config = BuilderConfig::from_env()?;
    let url = config
        .cache
        .redis_url
        .as_ref()
        .ok_or(CliError::MissingEnvVar("REDIS_URL"))?;

    let store = RedisStore::connect(url, config.cache.ttl, config.cache.op_timeout).await?;
    let keys = CacheKeys::for_shop(&shop).bundle_scope(bundle_id);
    store.delete_many(&keys).await?;

    tracing::info!("Flushed {} cache keys for bundle {} ({})", keys.len(), bundle_id, shop);
    Ok(())
}
