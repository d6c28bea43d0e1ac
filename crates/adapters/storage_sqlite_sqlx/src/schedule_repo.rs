//! `SQLite` implementation of [`ScheduleRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use greenguard_app::ports::ScheduleRepository;
use greenguard_domain::error::GreenGuardError;
use greenguard_domain::id::ScheduleId;
use greenguard_domain::schedule::{DailySchedule, SavedSchedule, ScheduleSource};

use crate::error::StorageError;
use crate::timestamp;

/// Wrapper for converting database rows into domain [`SavedSchedule`].
struct Wrapper(SavedSchedule);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<SavedSchedule> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let owner: String = row.try_get("owner")?;
        let day: String = row.try_get("day")?;
        let entries: String = row.try_get("entries")?;
        let source: String = row.try_get("source")?;
        let saved_at: String = row.try_get("saved_at")?;

        let id = ScheduleId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let schedule: DailySchedule =
            serde_json::from_str(&entries).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let source =
            ScheduleSource::from_str(&source).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(SavedSchedule {
            id,
            owner,
            day,
            schedule,
            source,
            saved_at: timestamp::decode(&saved_at)?,
        }))
    }
}

const UPSERT: &str = r"
    INSERT INTO schedules (id, owner, day, entries, source, saved_at)
    VALUES (?, ?, ?, ?, ?, ?)
    ON CONFLICT (owner, day) DO UPDATE SET
        entries = excluded.entries,
        source = excluded.source,
        saved_at = excluded.saved_at
    RETURNING id
";
const SELECT_ONE: &str = "SELECT * FROM schedules WHERE owner = ? AND day = ?";
const SELECT_BY_OWNER: &str = "SELECT * FROM schedules WHERE owner = ? ORDER BY day ASC";

/// `SQLite`-backed schedule repository.
pub struct SqliteScheduleRepository {
    pool: SqlitePool,
}

impl SqliteScheduleRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ScheduleRepository for SqliteScheduleRepository {
    async fn upsert(&self, mut schedule: SavedSchedule) -> Result<SavedSchedule, GreenGuardError> {
        let entries = serde_json::to_string(&schedule.schedule).map_err(StorageError::from)?;

        let (id,): (String,) = sqlx::query_as(UPSERT)
            .bind(schedule.id.to_string())
            .bind(&schedule.owner)
            .bind(&schedule.day)
            .bind(entries)
            .bind(schedule.source.as_str())
            .bind(timestamp::encode(schedule.saved_at))
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;

        schedule.id = ScheduleId::from_str(&id)
            .map_err(|err| StorageError::Database(sqlx::Error::Decode(Box::new(err))))?;
        Ok(schedule)
    }

    async fn get(&self, owner: &str, day: &str) -> Result<Option<SavedSchedule>, GreenGuardError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_ONE)
            .bind(owner)
            .bind(day)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<SavedSchedule>, GreenGuardError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_OWNER)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
