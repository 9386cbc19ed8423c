//! Cache-or-fetch timetable resolution.
//!
//! TransportAPI serves aimed (scheduled) times, which do not change once
//! published, so the SQLite store doubles as a permanent cache. A lookup
//! goes to the provider only when the store has no departure inside the
//! caller's waiting window, and every decodable departure in a response
//! is persisted, not just the one that answers the lookup.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, warn};

use crate::domain::{Crs, TimeError, TimetableEntry, parse_date_hhmm, truncate_to_minute};
use crate::store::TimetableStore;
use crate::transportapi::{Departure, StationTimetable, TransportApiClient, TransportApiError};

/// Source of raw station timetables.
///
/// This abstraction allows the resolver to be tested with canned
/// responses in place of live TransportAPI calls.
pub trait TimetableSource {
    /// Fetch departures from `from` that call at `to`, starting at
    /// `window_start`.
    fn fetch_departures(
        &self,
        from: &Crs,
        to: &Crs,
        window_start: DateTime<Utc>,
    ) -> impl Future<Output = Result<StationTimetable, TransportApiError>> + Send;
}

impl TimetableSource for TransportApiClient {
    async fn fetch_departures(
        &self,
        from: &Crs,
        to: &Crs,
        window_start: DateTime<Utc>,
    ) -> Result<StationTimetable, TransportApiError> {
        self.station_timetable(from, to, window_start).await
    }
}

/// Error converting a TransportAPI departure into timetable entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Failed to parse a date or time string
    #[error(transparent)]
    Time(#[from] TimeError),
}

/// Convert one departure into timetable entries for a station pair.
///
/// The departure yields one entry per calling point at `to`, so a
/// service that visits `to` twice is recorded for each visit. Aimed
/// times are "HH:MM" strings scoped by the payload-level `date`.
pub fn entries_from_departure(
    departure: &Departure,
    date: &str,
    from: Crs,
    to: Crs,
) -> Result<Vec<TimetableEntry>, ConversionError> {
    let service_id = departure
        .service
        .as_ref()
        .ok_or(ConversionError::MissingField("service"))?;

    let departs = departure
        .aimed_departure_time
        .as_deref()
        .ok_or(ConversionError::MissingField("aimed_departure_time"))?;
    let aimed_departure_time = parse_date_hhmm(date, departs)?;

    let calling_at = departure
        .station_detail
        .as_ref()
        .map(|detail| detail.calling_at.as_slice())
        .unwrap_or(&[]);

    let mut entries = Vec::new();
    for stop in calling_at {
        if stop.station_code.as_deref() != Some(to.as_str()) {
            continue;
        }

        let arrives = stop
            .aimed_arrival_time
            .as_deref()
            .ok_or(ConversionError::MissingField("aimed_arrival_time"))?;

        entries.push(TimetableEntry {
            service_id: service_id.clone(),
            station_from: from,
            station_to: to,
            aimed_departure_time,
            aimed_arrival_time: parse_date_hhmm(date, arrives)?,
        });
    }

    Ok(entries)
}

/// Store-backed timetable resolution with fetch-on-miss.
pub struct CachedTimetable<P> {
    source: P,
    store: TimetableStore,
}

impl<P: TimetableSource> CachedTimetable<P> {
    /// Create a resolver over a timetable source and a store.
    pub fn new(source: P, store: TimetableStore) -> Self {
        Self { source, store }
    }

    /// Earliest departure from `from` to `to` at or after `window_start`.
    ///
    /// The store is consulted first; a stored departure counts as a hit
    /// only if it leaves strictly within `max_wait` minutes of
    /// `window_start`. On a miss the provider is queried, the response
    /// is persisted, and the store is read again without the window
    /// cap, so the result may depart later than the caller is willing
    /// to wait. Deciding whether that wait is acceptable is the
    /// caller's job.
    pub async fn resolve(
        &self,
        from: &Crs,
        to: &Crs,
        window_start: DateTime<Utc>,
        max_wait: i64,
    ) -> Result<Option<TimetableEntry>, TransportApiError> {
        let window_start = truncate_to_minute(window_start);
        // A start near the edge of chrono's range has no representable
        // window end; clamp it there instead of overflowing.
        let window_end = window_start
            .checked_add_signed(Duration::minutes(max_wait))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        // Try the store first
        if let Some(entry) = self.store.earliest_after(from, to, window_start).await
            && entry.aimed_departure_time < window_end
        {
            debug!(%from, %to, service = %entry.service_id, "stored departure within window, skipping fetch");
            return Ok(Some(entry));
        }

        // Fetch and persist whatever the provider has for this window
        debug!(%from, %to, %window_start, max_wait, "no stored departure in window, fetching");
        let timetable = self.source.fetch_departures(from, to, window_start).await?;
        self.store_departures(&timetable, *from, *to).await;

        Ok(self.store.earliest_after(from, to, window_start).await)
    }

    /// Persist every decodable departure in a provider response.
    ///
    /// Storage failures are logged and skipped: a half-stored response
    /// still leaves more in the cache than giving up would.
    async fn store_departures(&self, timetable: &StationTimetable, from: Crs, to: Crs) {
        let Some(date) = timetable.date.as_deref() else {
            error!(%from, %to, "timetable response has no date, nothing stored");
            return;
        };

        for departure in timetable.departure_list().unwrap_or(&[]) {
            let entries = match entries_from_departure(departure, date, from, to) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(%from, %to, error = %e, "skipping undecodable departure");
                    continue;
                }
            };

            for entry in entries {
                let service_id = entry.service_id.clone();
                if let Err(e) = self.store.insert(entry).await {
                    warn!(%from, %to, service = %service_id, error = %e, "failed to store timetable entry");
                }
            }
        }
    }
}
