//! Cache-aside layer for public bundle data.
//!
//! [`CacheService`] wraps a [`CacheStore`] and never lets a store failure
//! reach the caller: reads degrade to a miss and writes and invalidations are
//! dropped with a warning. Stores:
//!
//! - [`RedisStore`] - shared Redis cache (production)
//! - [`MemoryStore`] - in-process `moka` cache, used when `REDIS_URL` is unset
//! - [`NullStore`] - always misses, used when `REDIS_URL` cannot be parsed

mod keys;
mod memory_store;
mod null_store;
mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::CacheConfig;

pub use keys::CacheKeys;
pub use memory_store::MemoryStore;
pub use null_store::NullStore;
pub use redis_store::RedisStore;

/// Errors raised by cache stores.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache operation timed out")]
    Timeout,
}

/// Key-value store holding serialized JSON entries.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the raw entry under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;

    /// Remove every listed key. Missing keys are not an error.
    async fn delete_many(&self, keys: &[String]) -> Result<(), CacheError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Cache-aside front for a [`CacheStore`].
#[derive(Clone)]
pub struct CacheService {
    store: Arc<dyn CacheStore>,
}

impl CacheService {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Select a store from configuration.
    ///
    /// Without `REDIS_URL` the in-process store is used. A Redis that can't
    /// be reached at startup is logged and retried on every operation, so
    /// this instance's invalidations reach the shared cache once it is back.
    pub async fn from_config(config: &CacheConfig) -> Self {
        let store: Arc<dyn CacheStore> = match &config.redis_url {
            Some(url) => match RedisStore::new(url, config.ttl, config.op_timeout) {
                Ok(store) => {
                    if let Err(e) = store.ensure_connected().await {
                        tracing::warn!(error = %e, "Redis unreachable at startup, retrying per operation");
                    }
                    Arc::new(store)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Invalid REDIS_URL, bundle-data caching disabled");
                    Arc::new(NullStore)
                }
            },
            None => {
                tracing::warn!("REDIS_URL not set, using in-process bundle-data cache");
                Arc::new(MemoryStore::new(config.ttl))
            }
        };

        tracing::info!(backend = store.backend(), "Cache store ready");
        Self::new(store)
    }

    /// Cached JSON under `key`, or `None` on miss, store failure, or an
    /// entry that is not valid JSON.
    pub async fn read(&self, key: &str) -> Option<serde_json::Value> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(cache_key = %key, "Cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(cache_key = %key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!(cache_key = %key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(cache_key = %key, error = %e, "Cached entry is not valid JSON, treating as miss");
                None
            }
        }
    }

    /// Store `value` under `key`. Failures are logged and dropped.
    pub async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(cache_key = %key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };

        if let Err(e) = self.store.set(key, raw).await {
            tracing::warn!(cache_key = %key, error = %e, "Cache write failed");
        }
    }

    /// Remove a single entry. Failures are logged and dropped.
    pub async fn invalidate(&self, key: &str) {
        self.invalidate_many(&[key.to_string()]).await;
    }

    /// Remove several entries. Failures are logged and dropped.
    pub async fn invalidate_many(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }

        match self.store.delete_many(keys).await {
            Ok(()) => tracing::debug!(count = keys.len(), "Cache entries invalidated"),
            Err(e) => tracing::warn!(error = %e, ?keys, "Cache invalidation failed"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;

    /// Store whose every operation fails.
    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Timeout)
        }

        async fn set(&self, _key: &str, _value: String) -> Result<(), CacheError> {
            Err(CacheError::Timeout)
        }

        async fn delete_many(&self, _keys: &[String]) -> Result<(), CacheError> {
            Err(CacheError::Timeout)
        }

        fn backend(&self) -> &'static str {
            "broken"
        }
    }

    fn memory_service() -> (CacheService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(None));
        (CacheService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_read_after_write() {
        let (cache, _) = memory_service();
        cache.write("k", &json!({"id": 1, "title": "Gift box"})).await;

        assert_eq!(
            cache.read("k").await,
            Some(json!({"id": 1, "title": "Gift box"}))
        );
    }

    #[tokio::test]
    async fn test_read_after_invalidate_is_miss() {
        let (cache, _) = memory_service();
        cache.write("k", &json!([1, 2, 3])).await;
        cache.invalidate("k").await;

        assert_eq!(cache.read("k").await, None);
    }

    #[tokio::test]
    async fn test_invalidate_many_leaves_other_keys() {
        let (cache, _) = memory_service();
        cache.write("a", &1).await;
        cache.write("b", &2).await;
        cache.write("c", &3).await;

        cache
            .invalidate_many(&["a".to_string(), "b".to_string()])
            .await;

        assert_eq!(cache.read("a").await, None);
        assert_eq!(cache.read("b").await, None);
        assert_eq!(cache.read("c").await, Some(json!(3)));
    }

    #[tokio::test]
    async fn test_invalid_json_is_miss() {
        let (cache, store) = memory_service();
        store.set("k", "{not json".to_string()).await.unwrap();

        assert_eq!(cache.read("k").await, None);
    }

    #[tokio::test]
    async fn test_store_failures_are_swallowed() {
        let cache = CacheService::new(Arc::new(BrokenStore));

        cache.write("k", &json!({"id": 1})).await;
        assert_eq!(cache.read("k").await, None);
        cache.invalidate("k").await;
    }

    #[tokio::test]
    async fn test_null_store_always_misses() {
        let cache = CacheService::new(Arc::new(NullStore));
        cache.write("k", &json!(true)).await;
        assert_eq!(cache.read("k").await, None);
    }

    #[tokio::test]
    async fn test_from_config_keeps_redis_when_unreachable_at_startup() {
        let config = CacheConfig {
            redis_url: Some(SecretString::from("redis://127.0.0.1:1")),
            op_timeout: std::time::Duration::from_millis(200),
            ..CacheConfig::default()
        };
        let cache = CacheService::from_config(&config).await;

        assert_eq!(cache.store.backend(), "redis");
        cache.write("k", &json!(1)).await;
        assert_eq!(cache.read("k").await, None);
        cache.invalidate("k").await;
    }

    #[tokio::test]
    async fn test_from_config_with_invalid_url_disables_caching() {
        let config = CacheConfig {
            redis_url: Some(SecretString::from("not a url")),
            ..CacheConfig::default()
        };
        let cache = CacheService::from_config(&config).await;
        assert_eq!(cache.store.backend(), "disabled");
    }

    #[tokio::test]
    async fn test_from_config_without_redis_uses_memory() {
        let cache = CacheService::from_config(&CacheConfig::default()).await;
        assert_eq!(cache.store.backend(), "memory");

        cache.write("k", &"v").await;
        assert_eq!(cache.read("k").await, Some(json!("v")));
    }
}
