//! Domain types for the journey planner.
//!
//! This module contains the validated core types shared by every layer:
//! station codes, timetable entries, and the time conventions (UTC
//! everywhere, minute precision) that the store and planner rely on.

mod entry;
mod station;
mod time;

pub use entry::TimetableEntry;
pub use station::{Crs, InvalidCrs};
pub use time::{
    TimeError, format_iso8601, parse_date_hhmm, parse_hhmm, parse_start_time, truncate_to_minute,
};
