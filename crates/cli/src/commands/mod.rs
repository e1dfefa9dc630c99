//! Command implementations.
//!
//! Every command reads the same environment as the admin server
//! (`BUILDER_DATABASE_URL`, `REDIS_URL`, ...), including a `.env` file.

pub mod bundle;
pub mod cache;
pub mod migrate;

use neat_bundle_admin::cache::CacheError;
use neat_bundle_admin::config::ConfigError;
use neat_bundle_admin::db::RepositoryError;
use neat_bundle_core::ShopDomainError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Environment is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Cache store operation failed.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Shop domain is malformed.
    #[error("Invalid shop domain: {0}")]
    InvalidShop(#[from] ShopDomainError),

    /// Bundle title is blank.
    #[error("Bundle title cannot be blank")]
    BlankTitle,
}
