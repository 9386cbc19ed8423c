//! TransportAPI station timetables client.
//!
//! HTTP client for the TransportAPI UK train endpoint this server
//! fetches timetables from. A single request covers everything the
//! resolver needs: scheduled departures from one station that call at
//! another, from a given time onwards, with per-departure calling
//! points inline (`station_detail=calling_at`).
//!
//! Times in the payload are "HH:MM" strings scoped by a payload-level
//! "YYYY-MM-DD" date.

mod client;
mod error;
mod types;

pub use client::{TransportApiClient, TransportApiConfig};
pub use error::TransportApiError;
pub use types::{CallingPoint, Departure, Departures, StationDetail, StationTimetable};
