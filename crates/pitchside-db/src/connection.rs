//! `SQLite` connection pool setup.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Connection pool for the store database.
#[derive(Debug, Clone)]
pub struct StorePool {
    pool: Pool<Sqlite>,
}

impl StorePool {
    /// Open (creating if missing) the database file at `path`.
    ///
    /// `:memory:` opens a private in-memory database; see [`Self::in_memory`].
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_str().ok_or_else(|| {
            DatabaseError::Open("invalid database path: not valid UTF-8".to_string())
        })?;

        if path_str == ":memory:" {
            return Self::in_memory().await;
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .map_err(|e| DatabaseError::Open(format!("failed to open {path_str}: {e}")))?;

        tracing::info!("Database pool created at {}", path_str);
        Ok(Self { pool })
    }

    /// Open an in-memory database.
    ///
    /// The pool holds exactly one connection that never expires, since every
    /// `SQLite` in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_options)
            .await
            .map_err(|e| DatabaseError::Open(format!("failed to open in-memory database: {e}")))?;

        Ok(Self { pool })
    }

    /// Get a reference to the underlying `SQLx` pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the connection pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_pool_creates_parent_dirs() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("nested").join("store.db");

        let pool = StorePool::new(&path).await.expect("open pool");
        sqlx::query("SELECT 1")
            .execute(pool.pool())
            .await
            .expect("query");
        assert!(path.exists());
        pool.close().await;
    }

    #[tokio::test]
    async fn test_in_memory_pool_shares_schema() {
        let pool = StorePool::new(":memory:").await.expect("open pool");
        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(pool.pool())
            .await
            .expect("create table");
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM t")
            .fetch_one(pool.pool())
            .await
            .expect("table visible on the pooled connection");
        assert_eq!(count, 0);
    }
}
