//! `SQLite` implementation of [`SensorHistoryRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use greenguard_app::ports::SensorHistoryRepository;
use greenguard_domain::error::GreenGuardError;
use greenguard_domain::history::HistoryPoint;
use greenguard_domain::id::HistoryPointId;
use greenguard_domain::sensor::SensorSnapshot;
use greenguard_domain::time::Timestamp;

use crate::error::StorageError;
use crate::timestamp;

/// Wrapper for converting database rows into domain types without polluting
/// domain structs with database concerns.
struct Wrapper(HistoryPoint);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let recorded_at: String = row.try_get("recorded_at")?;

        let id = HistoryPointId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(HistoryPoint {
            id,
            recorded_at: timestamp::decode(&recorded_at)?,
            sensors: SensorSnapshot {
                temperature: row.try_get("temperature")?,
                humidity: row.try_get("humidity")?,
                soil_moisture: row.try_get("soil_moisture")?,
                light_intensity: row.try_get("light_intensity")?,
            },
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO sensor_history (id, recorded_at, temperature, humidity, soil_moisture, light_intensity)
    VALUES (?, ?, ?, ?, ?, ?)
";

const SELECT_IN_RANGE: &str = r"
    SELECT * FROM sensor_history
    WHERE recorded_at >= ? AND recorded_at <= ?
    ORDER BY recorded_at ASC
";

const DELETE_BEFORE: &str = "DELETE FROM sensor_history WHERE recorded_at < ?";

/// `SQLite`-backed sensor history repository.
pub struct SqliteSensorHistoryRepository {
    pool: SqlitePool,
}

impl SqliteSensorHistoryRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SensorHistoryRepository for SqliteSensorHistoryRepository {
    async fn record(&self, point: HistoryPoint) -> Result<HistoryPoint, GreenGuardError> {
        sqlx::query(INSERT)
            .bind(point.id.to_string())
            .bind(timestamp::encode(point.recorded_at))
            .bind(point.sensors.temperature)
            .bind(point.sensors.humidity)
            .bind(point.sensors.soil_moisture)
            .bind(point.sensors.light_intensity)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(point)
    }

    async fn find_in_range(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<HistoryPoint>, GreenGuardError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_IN_RANGE)
            .bind(timestamp::encode(from))
            .bind(timestamp::encode(to))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn purge_before(&self, before: Timestamp) -> Result<u64, GreenGuardError> {
        let result = sqlx::query(DELETE_BEFORE)
            .bind(timestamp::encode(before))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(result.rows_affected())
    }
}
