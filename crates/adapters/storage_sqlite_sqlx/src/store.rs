//! `SQLite` implementation of [`GreenhouseStore`].
//!
//! One row per root key; the value column holds the raw JSON document.

use sqlx::SqlitePool;

use greenguard_app::ports::GreenhouseStore;
use greenguard_domain::error::GreenGuardError;
use greenguard_domain::snapshot::{RawRoot, StoreKey};
use greenguard_domain::time::now;

use crate::error::StorageError;
use crate::timestamp;

const SELECT_ALL: &str = "SELECT key, value FROM greenhouse_root";

const UPSERT: &str = r"
    INSERT INTO greenhouse_root (key, value, updated_at) VALUES (?, ?, ?)
    ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
";

/// `SQLite`-backed greenhouse store.
pub struct SqliteGreenhouseStore {
    pool: SqlitePool,
}

impl SqliteGreenhouseStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl GreenhouseStore for SqliteGreenhouseStore {
    async fn read_root(&self) -> Result<RawRoot, GreenGuardError> {
        let rows: Vec<(String, String)> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let mut root = RawRoot::new();
        for (key, value) in rows {
            if StoreKey::parse(&key).is_none() {
                tracing::debug!(%key, "ignoring unknown store key");
                continue;
            }
            match serde_json::from_str(&value) {
                Ok(value) => {
                    root.insert(key, value);
                }
                // A corrupt cell only makes that one key unknown.
                Err(err) => tracing::warn!(%key, error = %err, "skipping undecodable store value"),
            }
        }
        Ok(root)
    }

    async fn write(&self, key: StoreKey, value: serde_json::Value) -> Result<(), GreenGuardError> {
        let encoded = serde_json::to_string(&value).map_err(StorageError::from)?;
        sqlx::query(UPSERT)
            .bind(key.as_str())
            .bind(encoded)
            .bind(timestamp::encode(now()))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
