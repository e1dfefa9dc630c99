//! In-process cache store backed by `moka`.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use super::{CacheError, CacheStore};

const MAX_ENTRIES: u64 = 10_000;

/// Per-process store. Entries are not shared between instances, so an
/// invalidation on one instance leaves the others stale until their TTL.
#[derive(Clone)]
pub struct MemoryStore {
    cache: Cache<String, String>,
}

impl MemoryStore {
    /// Create a store whose entries expire after `ttl`, or never.
    #[must_use]
    pub fn new(ttl: Option<Duration>) -> Self {
        let builder = Cache::builder().max_capacity(MAX_ENTRIES);
        let cache = match ttl {
            Some(ttl) => builder.time_to_live(ttl).build(),
            None => builder.build(),
        };
        Self { cache }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.cache.insert(key.to_string(), value).await;
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), CacheError> {
        for key in keys {
            self.cache.invalidate(key).await;
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryStore::new(None);
        store.set("a", "1".to_string()).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some("1".to_string()));

        store.delete_many(&["a".to_string(), "missing".to_string()]).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = MemoryStore::new(Some(Duration::from_millis(50)));
        store.set("a", "1".to_string()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(store.get("a").await.unwrap(), None);
    }
}
