//! # Local Storage
//!
//! A flat string key/value namespace backed by the `local_storage` table.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        set_item(key, value)                             │
//! │                                                                         │
//! │  SELECT value ──► old_value                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT ... ON CONFLICT(key) DO UPDATE   (whole value replaced)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StorageHub ◄── StorageEvent { key, old_value, new_value, origin }     │
//! │                  (other tabs only)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes never fire `localStorageUpdated` on their own. Callers do that with
//! [`TabBus::trigger_update`] once the whole logical write is done.
//!
//! The read and the write are separate statements. Two tabs writing the same
//! key race, and the last write wins.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, trace};

use crate::error::{StoreError, StoreResult};
use crate::events::TabBus;

/// One tab's handle on local storage.
///
/// Cheap to clone: the pool and the bus are both shared handles.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    pool: SqlitePool,
    bus: TabBus,
}

impl LocalStorage {
    pub fn new(pool: SqlitePool, bus: TabBus) -> Self {
        LocalStorage { pool, bus }
    }

    /// The tab this handle writes as.
    pub fn bus(&self) -> &TabBus {
        &self.bus
    }

    // =========================================================================
    // Raw string API
    // =========================================================================

    /// Returns the raw value under `key`, or `None` if the key is absent.
    pub async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM local_storage WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        trace!(key = %key, present = value.is_some(), "get_item");
        Ok(value)
    }

    /// Stores `value` under `key`, replacing whatever was there.
    pub async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let old_value = self.get_item(key).await?;

        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), tab = %self.bus.id(), "Stored value");
        self.bus
            .publish_storage(Some(key), old_value, Some(value.to_string()));
        Ok(())
    }

    /// Removes `key`. Removing an absent key is a no-op and publishes nothing.
    pub async fn remove_item(&self, key: &str) -> StoreResult<()> {
        let old_value = self.get_item(key).await?;
        if old_value.is_none() {
            return Ok(());
        }

        sqlx::query("DELETE FROM local_storage WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, tab = %self.bus.id(), "Removed value");
        self.bus.publish_storage(Some(key), old_value, None);
        Ok(())
    }

    /// Lists every stored key, sorted.
    pub async fn keys(&self) -> StoreResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }

    /// Removes every key. Publishes a single event with no key.
    pub async fn clear(&self) -> StoreResult<()> {
        let removed = sqlx::query("DELETE FROM local_storage")
            .execute(&self.pool)
            .await?
            .rows_affected();

        debug!(removed, tab = %self.bus.id(), "Cleared local storage");
        self.bus.publish_storage(None, None, None);
        Ok(())
    }

    // =========================================================================
    // JSON helpers
    // =========================================================================

    /// Parses the value under `key` as `T`.
    ///
    /// ## Returns
    /// * `Ok(None)` - Key absent
    /// * `Err(StoreError::Malformed)` - Value is not valid JSON for `T`
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get_item(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::malformed(key, e)),
            None => Ok(None),
        }
    }

    pub async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set_item(key, &raw).await
    }

    /// Reads the array under `key`. An absent key reads as empty.
    pub async fn read_array<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Vec<T>> {
        Ok(self.read_json::<Vec<T>>(key).await?.unwrap_or_default())
    }

    /// Rewrites the whole array under `key`.
    pub async fn write_array<T: Serialize>(&self, key: &str, items: &[T]) -> StoreResult<()> {
        self.write_json(key, items).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
