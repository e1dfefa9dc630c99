//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::CacheService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// database pool and the bundle-data cache.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    cache: CacheService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(pool: PgPool, cache: CacheService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { pool, cache }),
        }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the bundle-data cache.
    #[must_use]
    pub fn cache(&self) -> &CacheService {
        &self.inner.cache
    }
}
