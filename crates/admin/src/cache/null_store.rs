//! Cache store that holds nothing.

use async_trait::async_trait;

use super::{CacheError, CacheStore};

/// Always misses; writes and deletes are no-ops.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

#[async_trait]
impl CacheStore for NullStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete_many(&self, _keys: &[String]) -> Result<(), CacheError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "disabled"
    }
}
