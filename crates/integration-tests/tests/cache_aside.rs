//! Integration tests for the cache-aside service.
//!
//! These run against the in-process and disabled stores. The shared-Redis
//! tests at the end are ignored unless `REDIS_URL` points at a scratch server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::json;

use neat_bundle_admin::cache::{CacheKeys, CacheService, NullStore};
use neat_bundle_admin::config::CacheConfig;
use neat_bundle_core::BundleId;
use neat_bundle_integration_tests::{demo_shop, memory_cache};

// =============================================================================
// Read / Write / Invalidate
// =============================================================================

#[tokio::test]
async fn test_read_after_write_returns_value() {
    let cache = memory_cache();
    let key = CacheKeys::for_shop(&demo_shop()).bundle_data(BundleId::new(1));

    cache.write(&key, &json!({"title": "Gift box"})).await;

    assert_eq!(cache.read(&key).await, Some(json!({"title": "Gift box"})));
}

#[tokio::test]
async fn test_read_after_invalidate_is_absent() {
    let cache = memory_cache();
    let key = CacheKeys::for_shop(&demo_shop()).settings(BundleId::new(1));

    cache.write(&key, &json!({"skipTheCart": true})).await;
    cache.invalidate(&key).await;

    assert_eq!(cache.read(&key).await, None);
}

#[tokio::test]
async fn test_disabled_store_always_misses() {
    let cache = CacheService::new(Arc::new(NullStore));
    let key = CacheKeys::for_shop(&demo_shop()).bundle_data(BundleId::new(1));

    cache.write(&key, &json!(1)).await;

    assert_eq!(cache.read(&key).await, None);
}

// =============================================================================
// Invalidation Sets
// =============================================================================

#[tokio::test]
async fn test_reorder_drops_every_step_slot() {
    let cache = memory_cache();
    let keys = CacheKeys::for_shop(&demo_shop());
    let bundle = BundleId::new(9);

    for n in 1..=5 {
        cache.write(&keys.step(bundle, n), &json!(n)).await;
    }
    cache.write(&keys.settings(bundle), &json!("kept")).await;

    cache.invalidate_many(&keys.after_step_reorder(bundle)).await;

    for n in 1..=5 {
        assert_eq!(cache.read(&keys.step(bundle, n)).await, None);
    }
    assert_eq!(cache.read(&keys.settings(bundle)).await, Some(json!("kept")));
}

#[tokio::test]
async fn test_step_update_leaves_other_steps() {
    let cache = memory_cache();
    let keys = CacheKeys::for_shop(&demo_shop());
    let bundle = BundleId::new(9);

    cache.write(&keys.step(bundle, 1), &json!(1)).await;
    cache.write(&keys.step(bundle, 2), &json!(2)).await;

    cache.invalidate_many(&keys.after_step_update(bundle, 2)).await;

    assert_eq!(cache.read(&keys.step(bundle, 1)).await, Some(json!(1)));
    assert_eq!(cache.read(&keys.step(bundle, 2)).await, None);
}

#[tokio::test]
async fn test_keys_are_scoped_by_shop() {
    let cache = memory_cache();
    let other = neat_bundle_core::ShopDomain::parse("other.myshopify.com").unwrap();
    let bundle = BundleId::new(1);

    cache
        .write(&CacheKeys::for_shop(&demo_shop()).bundle_data(bundle), &json!("mine"))
        .await;

    assert_eq!(
        cache.read(&CacheKeys::for_shop(&other).bundle_data(bundle)).await,
        None
    );
}

// =============================================================================
// Shared Redis
// =============================================================================

async fn redis_instance() -> CacheService {
    let config = CacheConfig {
        redis_url: Some(SecretString::from(std::env::var("REDIS_URL").unwrap())),
        ..CacheConfig::default()
    };
    CacheService::from_config(&config).await
}

#[tokio::test]
#[ignore = "requires REDIS_URL"]
async fn test_invalidation_reaches_other_instances() {
    let writer = redis_instance().await;
    let reader = redis_instance().await;
    let key = CacheKeys::for_shop(&demo_shop()).bundle_data(BundleId::new(900_001));

    reader.write(&key, &json!({"title": "old"})).await;
    assert_eq!(writer.read(&key).await, Some(json!({"title": "old"})));

    writer.invalidate(&key).await;

    assert_eq!(reader.read(&key).await, None);
}
