//! Cache-aside record store.
//!
//! Records are stored whole under their [`CacheKey`] path with the time they
//! were written. The store never judges freshness; callers compare the
//! record's age with their TTL policy. Every operation runs under the
//! store's retry policy.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use pitchside_core::{CacheKey, CacheRecord, EntityKind, RetryPolicy, StoreConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;

/// Published after every successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreUpdate {
    /// Store path that was written
    pub path: String,
    /// Entity kind of the written record
    pub kind: EntityKind,
    /// Timestamp attached to the record
    pub written_at: DateTime<Utc>,
}

/// Keyed record store over the `cache_records` table.
#[derive(Debug, Clone)]
pub struct CacheStore {
    pool: SqlitePool,
    policy: RetryPolicy,
    updates: broadcast::Sender<StoreUpdate>,
}

impl CacheStore {
    /// Create a store over an already migrated pool.
    #[must_use]
    pub fn new(pool: SqlitePool, config: &StoreConfig) -> Self {
        let (updates, _) = broadcast::channel(config.update_channel_capacity.max(1));
        Self {
            pool,
            policy: RetryPolicy::new(
                config.max_attempts,
                Duration::from_secs(config.retry_delay_secs),
            ),
            updates,
        }
    }

    /// Last record written under `key`, or `None` if there is none.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<CacheRecord<T>>> {
        let path = key.path();
        let (pool, path_ref) = (&self.pool, path.as_str());

        let row: Option<(String, String)> = self
            .policy
            .run(&format!("Store get {path}"), |_| async move {
                sqlx::query_as(
                    r"
                    SELECT payload, written_at
                    FROM cache_records
                    WHERE path = ?
                    ",
                )
                .bind(path_ref)
                .fetch_optional(pool)
                .await
                .map_err(DatabaseError::from)
            })
            .await?;

        let Some((payload, written_at)) = row else {
            debug!("Store miss for {}", path);
            return Ok(None);
        };

        let last_updated = DateTime::parse_from_rfc3339(&written_at)
            .map_err(|e| DatabaseError::Decode(format!("written_at of {path}: {e}")))?
            .with_timezone(&Utc);
        let data = serde_json::from_str(&payload)
            .map_err(|e| DatabaseError::Decode(format!("payload of {path}: {e}")))?;

        Ok(Some(CacheRecord::new(data, last_updated)))
    }

    /// Overwrite the record under `key`, stamped with the current time.
    ///
    /// Returns the record exactly as stored.
    pub async fn put<T: Serialize>(&self, key: &CacheKey, data: T) -> Result<CacheRecord<T>> {
        let record = CacheRecord::stamped_now(data);
        self.put_record(key, &record).await?;
        Ok(record)
    }

    /// Overwrite the record under `key` with an already stamped record.
    pub async fn put_record<T: Serialize>(
        &self,
        key: &CacheKey,
        record: &CacheRecord<T>,
    ) -> Result<()> {
        let payload = serde_json::to_string(&record.data)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
        let written_at = record
            .last_updated
            .to_rfc3339_opts(SecondsFormat::Micros, true);
        let path = key.path();
        let kind = key.kind();

        let (pool, path_ref, payload_ref, written_ref) =
            (&self.pool, path.as_str(), payload.as_str(), written_at.as_str());
        self.policy
            .run(&format!("Store put {path}"), |_| async move {
                sqlx::query(
                    r"
                    INSERT INTO cache_records (path, kind, payload, written_at)
                    VALUES (?, ?, ?, ?)
                    ON CONFLICT(path) DO UPDATE SET
                        kind = excluded.kind,
                        payload = excluded.payload,
                        written_at = excluded.written_at
                    ",
                )
                .bind(path_ref)
                .bind(kind.as_str())
                .bind(payload_ref)
                .bind(written_ref)
                .execute(pool)
                .await
                .map(|_| ())
                .map_err(DatabaseError::from)
            })
            .await?;

        debug!("Stored {} ({} bytes)", path, payload.len());
        // No subscribers is not an error
        let _ = self.updates.send(StoreUpdate {
            path,
            kind,
            written_at: record.last_updated,
        });

        Ok(())
    }

    /// Remove the record under `key`. Returns whether one existed.
    pub async fn delete(&self, key: &CacheKey) -> Result<bool> {
        let path = key.path();
        let (pool, path_ref) = (&self.pool, path.as_str());

        let affected = self
            .policy
            .run(&format!("Store delete {path}"), |_| async move {
                sqlx::query("DELETE FROM cache_records WHERE path = ?")
                    .bind(path_ref)
                    .execute(pool)
                    .await
                    .map(|result| result.rows_affected())
                    .map_err(DatabaseError::from)
            })
            .await?;

        Ok(affected > 0)
    }

    /// Remove every record. Returns how many were removed.
    pub async fn clear(&self) -> Result<u64> {
        let pool = &self.pool;
        self.policy
            .run("Store clear", |_| async move {
                sqlx::query("DELETE FROM cache_records")
                    .execute(pool)
                    .await
                    .map(|result| result.rows_affected())
                    .map_err(DatabaseError::from)
            })
            .await
    }

    /// Receive a [`StoreUpdate`] for every subsequent write.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreUpdate> {
        self.updates.subscribe()
    }
}
