//! SQLite-backed timetable storage.
//!
//! The store is the system's cache: every timetable entry fetched from
//! TransportAPI is persisted here, and journey planning reads from here
//! first. Writes are idempotent on `service_id`, so re-fetching a window
//! that was already stored changes nothing.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::warn;

use crate::domain::{Crs, TimetableEntry, truncate_to_minute};

/// Error returned by timetable store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt timetable row: {0}")]
    Corrupt(String),
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS timetable_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    service_id TEXT NOT NULL UNIQUE,
    station_from TEXT NOT NULL,
    station_to TEXT NOT NULL,
    aimed_departure_time TEXT NOT NULL,
    aimed_arrival_time TEXT NOT NULL
)";

/// SQLite-backed store of timetable entries.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct TimetableStore {
    pool: SqlitePool,
}

impl TimetableStore {
    /// Open the database at `url`, creating the file and the schema if
    /// they do not exist yet.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// Open a private in-memory database.
    ///
    /// SQLite gives each connection its own in-memory database, so the
    /// pool is capped at a single connection. Used by tests and ephemeral
    /// runs.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Insert a timetable entry, ignoring it if the service is already
    /// recorded.
    ///
    /// Both timestamps are truncated to the minute before writing.
    /// Returns the stored entry and whether this call created it; on a
    /// `service_id` conflict the row already in the table wins and is
    /// returned unchanged.
    pub async fn insert(
        &self,
        entry: TimetableEntry,
    ) -> Result<(TimetableEntry, bool), StoreError> {
        let departure = truncate_to_minute(entry.aimed_departure_time);
        let arrival = truncate_to_minute(entry.aimed_arrival_time);

        let result = sqlx::query(
            "INSERT INTO timetable_entries \
             (service_id, station_from, station_to, aimed_departure_time, aimed_arrival_time) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(service_id) DO NOTHING",
        )
        .bind(&entry.service_id)
        .bind(entry.station_from.as_str())
        .bind(entry.station_to.as_str())
        .bind(departure)
        .bind(arrival)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok((
                TimetableEntry {
                    aimed_departure_time: departure,
                    aimed_arrival_time: arrival,
                    ..entry
                },
                true,
            ));
        }

        // Conflict: the service is already stored. Nothing ever deletes
        // entries, so the existing row must be readable.
        let row = sqlx::query(
            "SELECT service_id, station_from, station_to, \
                    aimed_departure_time, aimed_arrival_time \
             FROM timetable_entries WHERE service_id = ?",
        )
        .bind(&entry.service_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((entry_from_row(&row)?, false))
    }

    /// Earliest stored departure for the station pair at or after `after`.
    ///
    /// The cutoff is truncated to the minute, and the comparison is
    /// inclusive. Read failures are logged and reported as a miss, so a
    /// broken read degrades into a provider fetch rather than a failed
    /// journey.
    pub async fn earliest_after(
        &self,
        from: &Crs,
        to: &Crs,
        after: DateTime<Utc>,
    ) -> Option<TimetableEntry> {
        let after = truncate_to_minute(after);

        // Stored timestamps are uniform zero-subsecond UTC text, which
        // keeps the string comparison chronological.
        let result = sqlx::query(
            "SELECT service_id, station_from, station_to, \
                    aimed_departure_time, aimed_arrival_time \
             FROM timetable_entries \
             WHERE station_from = ? AND station_to = ? AND aimed_departure_time >= ? \
             ORDER BY aimed_departure_time ASC \
             LIMIT 1",
        )
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(after)
        .fetch_optional(&self.pool)
        .await;

        let row = match result {
            Ok(row) => row?,
            Err(e) => {
                warn!(%from, %to, error = %e, "timetable lookup failed, treating as a miss");
                return None;
            }
        };

        match entry_from_row(&row) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(%from, %to, error = %e, "skipping unreadable timetable row");
                None
            }
        }
    }

    /// Number of stored entries.
    pub async fn entry_count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM timetable_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

fn entry_from_row(row: &SqliteRow) -> Result<TimetableEntry, StoreError> {
    let service_id: String = row.try_get("service_id")?;
    let from: String = row.try_get("station_from")?;
    let to: String = row.try_get("station_to")?;

    let station_from =
        Crs::parse(&from).map_err(|e| StoreError::Corrupt(format!("station_from {from:?}: {e}")))?;
    let station_to =
        Crs::parse(&to).map_err(|e| StoreError::Corrupt(format!("station_to {to:?}: {e}")))?;

    Ok(TimetableEntry {
        service_id,
        station_from,
        station_to,
        aimed_departure_time: row.try_get("aimed_departure_time")?,
        aimed_arrival_time: row.try_get("aimed_arrival_time")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn crs(code: &str) -> Crs {
        Crs::parse(code).unwrap()
    }

    fn utc(h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 16, h, mi, s).unwrap()
    }

    fn entry(service_id: &str, from: &str, to: &str, dep: DateTime<Utc>) -> TimetableEntry {
        TimetableEntry {
            service_id: service_id.to_string(),
            station_from: crs(from),
            station_to: crs(to),
            aimed_departure_time: dep,
            aimed_arrival_time: dep + chrono::Duration::minutes(25),
        }
    }

    #[tokio::test]
    async fn insert_stores_and_reports_new() {
        let store = TimetableStore::in_memory().await.unwrap();

        let (stored, is_new) = store.insert(entry("svc-1", "AAA", "BBB", utc(10, 0, 0))).await.unwrap();

        assert!(is_new);
        assert_eq!(stored.service_id, "svc-1");
        assert_eq!(store.entry_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_truncates_timestamps() {
        let store = TimetableStore::in_memory().await.unwrap();

        let mut e = entry("svc-1", "AAA", "BBB", utc(10, 0, 42));
        e.aimed_arrival_time = utc(10, 25, 59);
        let (stored, _) = store.insert(e).await.unwrap();

        assert_eq!(stored.aimed_departure_time, utc(10, 0, 0));
        assert_eq!(stored.aimed_arrival_time, utc(10, 25, 0));

        // The truncated values are what went to disk
        let read = store.earliest_after(&crs("AAA"), &crs("BBB"), utc(9, 0, 0)).await.unwrap();
        assert_eq!(read.aimed_departure_time, utc(10, 0, 0));
        assert_eq!(read.aimed_arrival_time, utc(10, 25, 0));
    }

    #[tokio::test]
    async fn duplicate_service_keeps_first_row() {
        let store = TimetableStore::in_memory().await.unwrap();

        let (first, is_new) = store.insert(entry("svc-1", "AAA", "BBB", utc(10, 0, 0))).await.unwrap();
        assert!(is_new);

        // Same service again, with conflicting details
        let (second, is_new) = store.insert(entry("svc-1", "CCC", "DDD", utc(12, 30, 0))).await.unwrap();

        assert!(!is_new);
        assert_eq!(second, first);
        assert_eq!(store.entry_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn earliest_after_picks_first_departure() {
        let store = TimetableStore::in_memory().await.unwrap();

        // Inserted out of order
        store.insert(entry("svc-late", "AAA", "BBB", utc(14, 0, 0))).await.unwrap();
        store.insert(entry("svc-early", "AAA", "BBB", utc(10, 15, 0))).await.unwrap();
        store.insert(entry("svc-mid", "AAA", "BBB", utc(11, 45, 0))).await.unwrap();

        let found = store.earliest_after(&crs("AAA"), &crs("BBB"), utc(10, 0, 0)).await.unwrap();
        assert_eq!(found.service_id, "svc-early");

        let found = store.earliest_after(&crs("AAA"), &crs("BBB"), utc(11, 0, 0)).await.unwrap();
        assert_eq!(found.service_id, "svc-mid");
    }

    #[tokio::test]
    async fn earliest_after_is_inclusive() {
        let store = TimetableStore::in_memory().await.unwrap();
        store.insert(entry("svc-1", "AAA", "BBB", utc(10, 0, 0))).await.unwrap();

        let found = store.earliest_after(&crs("AAA"), &crs("BBB"), utc(10, 0, 0)).await;
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn earliest_after_truncates_the_cutoff() {
        let store = TimetableStore::in_memory().await.unwrap();
        store.insert(entry("svc-1", "AAA", "BBB", utc(10, 0, 0))).await.unwrap();

        // 10:00:42 truncates to 10:00, which still matches the 10:00 departure
        let found = store.earliest_after(&crs("AAA"), &crs("BBB"), utc(10, 0, 42)).await;
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn earliest_after_respects_station_pair() {
        let store = TimetableStore::in_memory().await.unwrap();
        store.insert(entry("svc-1", "AAA", "BBB", utc(10, 0, 0))).await.unwrap();

        // Reversed pair and unrelated pair both miss
        assert!(store.earliest_after(&crs("BBB"), &crs("AAA"), utc(9, 0, 0)).await.is_none());
        assert!(store.earliest_after(&crs("AAA"), &crs("CCC"), utc(9, 0, 0)).await.is_none());
    }

    #[tokio::test]
    async fn earliest_after_misses_when_everything_is_earlier() {
        let store = TimetableStore::in_memory().await.unwrap();
        store.insert(entry("svc-1", "AAA", "BBB", utc(10, 0, 0))).await.unwrap();

        assert!(store.earliest_after(&crs("AAA"), &crs("BBB"), utc(10, 1, 0)).await.is_none());
    }

    #[tokio::test]
    async fn earliest_after_on_empty_store() {
        let store = TimetableStore::in_memory().await.unwrap();
        assert!(store.earliest_after(&crs("AAA"), &crs("BBB"), utc(10, 0, 0)).await.is_none());
    }

    #[tokio::test]
    async fn undecodable_row_reads_as_miss() {
        let store = TimetableStore::in_memory().await.unwrap();

        // A row whose stations match but whose arrival cannot be decoded
        sqlx::query(
            "INSERT INTO timetable_entries \
             (service_id, station_from, station_to, aimed_departure_time, aimed_arrival_time) \
             VALUES ('svc-bad', 'AAA', 'BBB', ?, 'not a timestamp')",
        )
        .bind(utc(10, 0, 0))
        .execute(&store.pool)
        .await
        .unwrap();

        assert!(store.earliest_after(&crs("AAA"), &crs("BBB"), utc(9, 0, 0)).await.is_none());
    }

    #[tokio::test]
    async fn file_backed_store_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("timetable.db").display());

        let store = TimetableStore::connect(&url).await.unwrap();
        store.insert(entry("svc-1", "AAA", "BBB", utc(10, 0, 0))).await.unwrap();
        store.pool.close().await;

        let reopened = TimetableStore::connect(&url).await.unwrap();
        assert_eq!(reopened.entry_count().await.unwrap(), 1);
        let found = reopened.earliest_after(&crs("AAA"), &crs("BBB"), utc(9, 0, 0)).await.unwrap();
        assert_eq!(found.service_id, "svc-1");
    }
}
