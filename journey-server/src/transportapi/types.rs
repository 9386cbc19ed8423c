//! TransportAPI response DTOs.
//!
//! These map the station timetables JSON payload, keeping only the
//! fields the resolver reads. `Option` is used liberally: TransportAPI
//! sends null (or omits fields entirely) for anything it has no data
//! for, and one half-empty departure must not fail the whole payload.

use serde::Deserialize;

/// Response from the station timetables endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StationTimetable {
    /// Date the timetable applies to ("YYYY-MM-DD").
    pub date: Option<String>,

    /// Departure board for the queried station.
    pub departures: Option<Departures>,
}

impl StationTimetable {
    /// The departure list, if the payload carried one.
    pub fn departure_list(&self) -> Option<&[Departure]> {
        self.departures.as_ref()?.all.as_deref()
    }
}

/// Departure board wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Departures {
    pub all: Option<Vec<Departure>>,
}

/// One departure row on the timetable.
#[derive(Debug, Clone, Deserialize)]
pub struct Departure {
    /// Upstream service identifier.
    pub service: Option<String>,

    /// Aimed departure time from the queried station ("HH:MM").
    pub aimed_departure_time: Option<String>,

    /// Per-departure detail, present when requested with
    /// `station_detail=calling_at`.
    pub station_detail: Option<StationDetail>,
}

/// Calling pattern detail for a departure.
#[derive(Debug, Clone, Deserialize)]
pub struct StationDetail {
    /// Stations this service calls at after the queried one.
    #[serde(default)]
    pub calling_at: Vec<CallingPoint>,
}

/// A downstream stop of a departure.
#[derive(Debug, Clone, Deserialize)]
pub struct CallingPoint {
    /// CRS code of the stop.
    pub station_code: Option<String>,

    /// Aimed arrival time at this stop ("HH:MM").
    pub aimed_arrival_time: Option<String>,
}
