//! Pitchside Database Layer
//!
//! Provides the `SQLite` cache-aside store that scraped records are written
//! to and served from. Uses `SQLx` with embedded migrations.
//!
//! # Example
//!
//! ```ignore
//! use pitchside_core::{CacheKey, MatchStatus, StoreConfig};
//! use pitchside_db::Database;
//!
//! let db = Database::new("pitchside.db").await?;
//! db.run_migrations().await?;
//! let store = db.cache_store(&StoreConfig::default());
//! store.put(&CacheKey::Fixtures(MatchStatus::Live), Vec::<String>::new()).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cache;
pub mod connection;
pub mod error;
pub mod migrations;

// Re-export commonly used types
pub use cache::{CacheStore, StoreUpdate};
pub use connection::StorePool;
pub use error::{DatabaseError, Result};

use pitchside_core::StoreConfig;
use std::path::Path;

/// High-level database interface.
///
/// Wraps a [`StorePool`] and hands out [`CacheStore`] handles over it.
#[derive(Debug, Clone)]
pub struct Database {
    pool: StorePool,
}

impl Database {
    /// Open the database at `path` (or `:memory:` for in-memory).
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let pool = StorePool::new(path).await?;
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let pool = StorePool::in_memory().await?;
        Ok(Self { pool })
    }

    /// Run all pending database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(self.pool.pool()).await
    }

    /// Get the current schema version.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(self.pool.pool()).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        self.pool.pool()
    }

    /// Record store over this database.
    #[must_use]
    pub fn cache_store(&self, config: &StoreConfig) -> CacheStore {
        CacheStore::new(self.pool.pool().clone(), config)
    }

    /// Close the database connection gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
