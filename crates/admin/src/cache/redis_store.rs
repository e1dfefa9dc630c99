//! Redis-backed cache store shared by every instance.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::OnceCell;

use super::{CacheError, CacheStore};

/// Store using a multiplexed, auto-reconnecting Redis connection.
///
/// The connection is opened on first use. Until it succeeds, every
/// operation tries again and fails on its own, so an instance that booted
/// while Redis was down starts sharing the cache as soon as Redis is back.
/// Every round-trip is bounded by `op_timeout` so a slow or dead Redis
/// turns into a cache miss instead of a stalled request.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
    conn: Arc<OnceCell<ConnectionManager>>,
    ttl: Option<Duration>,
    op_timeout: Duration,
}

impl RedisStore {
    /// Build a store for `url` without connecting.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Redis` if the URL is invalid.
    pub fn new(
        url: &SecretString,
        ttl: Option<Duration>,
        op_timeout: Duration,
    ) -> Result<Self, CacheError> {
        let client = redis::Client::open(url.expose_secret())?;

        Ok(Self {
            client,
            conn: Arc::new(OnceCell::new()),
            ttl,
            op_timeout,
        })
    }

    /// Build a store and open its connection right away.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Redis` if the URL is invalid or the connection
    /// fails, and `CacheError::Timeout` if it takes longer than `op_timeout`.
    pub async fn connect(
        url: &SecretString,
        ttl: Option<Duration>,
        op_timeout: Duration,
    ) -> Result<Self, CacheError> {
        let store = Self::new(url, ttl, op_timeout)?;
        store.ensure_connected().await?;
        Ok(store)
    }

    /// Open the connection if it isn't open yet.
    ///
    /// # Errors
    ///
    /// Same as [`RedisStore::connect`].
    pub async fn ensure_connected(&self) -> Result<(), CacheError> {
        self.connection().await.map(|_| ())
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let conn = self
            .conn
            .get_or_try_init(|| {
                bounded(self.op_timeout, ConnectionManager::new(self.client.clone()))
            })
            .await?;
        Ok(conn.clone())
    }
}

async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, CacheError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(CacheError::Timeout),
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        bounded(self.op_timeout, conn.get(key)).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        match self.ttl {
            Some(ttl) => bounded(self.op_timeout, conn.set_ex(key, value, ttl.as_secs())).await,
            None => bounded(self.op_timeout, conn.set(key, value)).await,
        }
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), CacheError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        bounded(self.op_timeout, conn.del(keys)).await
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
