//! Leg-by-leg journey planning.
//!
//! A journey is an ordered list of station codes; each consecutive pair
//! is one leg. The planner resolves legs strictly in order, carrying the
//! current time forward: it starts at the requested start time and after
//! every leg becomes that leg's aimed arrival time. Legs cannot be
//! resolved in parallel because each window depends on the previous
//! arrival.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::cache::{CachedTimetable, TimetableSource};
use crate::domain::{Crs, truncate_to_minute};
use crate::transportapi::TransportApiError;

/// Error from journey planning. Terminal for the whole plan; a failed
/// leg is never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// No departure exists for a leg at or after the current time.
    #[error("No trains found from {from} to {to} after {}", .after.naive_utc())]
    NoTrainsFound {
        from: Crs,
        to: Crs,
        after: DateTime<Utc>,
    },

    /// The wait for a leg's departure exceeds the caller's cap.
    #[error("Wait time at {station} exceeds max_wait ({wait_mins} > {max_wait_mins})")]
    ExcessiveWait {
        station: Crs,
        wait_mins: i64,
        max_wait_mins: i64,
    },

    /// The upstream timetable provider failed.
    #[error(transparent)]
    Provider(#[from] TransportApiError),
}

impl PlanError {
    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            PlanError::NoTrainsFound { .. } => 404,
            PlanError::ExcessiveWait { .. } => 400,
            PlanError::Provider(e) => e.status(),
        }
    }
}

/// Journey planner over a resolved timetable.
pub struct JourneyPlanner<'a, P: TimetableSource> {
    timetable: &'a CachedTimetable<P>,
}

impl<'a, P: TimetableSource> JourneyPlanner<'a, P> {
    /// Create a new planner.
    pub fn new(timetable: &'a CachedTimetable<P>) -> Self {
        Self { timetable }
    }

    /// Plan a journey along `codes`, returning the final arrival time.
    ///
    /// The start time is truncated to the minute before the first leg.
    /// A wait equal to `max_wait` is allowed; only a strictly longer
    /// wait fails. With fewer than two codes there are no legs and the
    /// truncated start time comes straight back.
    pub async fn plan(
        &self,
        codes: &[Crs],
        start: DateTime<Utc>,
        max_wait: i64,
    ) -> Result<DateTime<Utc>, PlanError> {
        let mut current = truncate_to_minute(start);

        debug!(stations = codes.len(), max_wait, start = %current, "planning journey");

        for pair in codes.windows(2) {
            let (from, to) = (pair[0], pair[1]);

            let entry = self
                .timetable
                .resolve(&from, &to, current, max_wait)
                .await?
                .ok_or_else(|| {
                    warn!(%from, %to, after = %current, "no trains found for leg");
                    PlanError::NoTrainsFound {
                        from,
                        to,
                        after: current,
                    }
                })?;

            let wait_mins = (entry.aimed_departure_time - current).num_minutes();
            if wait_mins > max_wait {
                warn!(station = %from, wait_mins, max_wait, "wait exceeds the cap");
                return Err(PlanError::ExcessiveWait {
                    station: from,
                    wait_mins,
                    max_wait_mins: max_wait,
                });
            }

            current = entry.aimed_arrival_time;
        }

        debug!(arrival = %current, "journey planned");
        Ok(current)
    }
}
