//! Timetable entries.

use chrono::{DateTime, Utc};

use super::Crs;

/// One scheduled train movement between two stations.
///
/// An entry says that the service identified by `service_id` leaves
/// `station_from` at `aimed_departure_time` and reaches `station_to` at
/// `aimed_arrival_time`. Both timestamps are UTC and are truncated to
/// the minute before the entry is persisted, so entries read back from
/// the store always carry zero seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableEntry {
    /// Upstream identifier for the service, unique per entry.
    pub service_id: String,
    pub station_from: Crs,
    pub station_to: Crs,
    pub aimed_departure_time: DateTime<Utc>,
    pub aimed_arrival_time: DateTime<Utc>,
}
