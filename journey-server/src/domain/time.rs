//! Time handling for the journey planner.
//!
//! Everything below the web layer works in UTC at minute precision:
//! request start times, stored timetable rows, and the departure
//! comparisons the planner makes. TransportAPI supplies times as
//! "HH:MM" strings alongside a "YYYY-MM-DD" date, and requests carry
//! ISO 8601 datetimes, so this module owns both the parsing and the
//! truncation rule.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Error returned when parsing an invalid time or datetime string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Drop seconds and sub-second precision from a timestamp.
///
/// Applied to every timestamp before it is stored or compared, so that
/// "departs at or after" never turns on stray seconds.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use journey_server::domain::truncate_to_minute;
///
/// let t = Utc.with_ymd_and_hms(2025, 6, 16, 10, 0, 42).unwrap();
/// let expected = Utc.with_ymd_and_hms(2025, 6, 16, 10, 0, 0).unwrap();
/// assert_eq!(truncate_to_minute(t), expected);
/// ```
pub fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    let secs = t.timestamp().div_euclid(60) * 60;
    // Flooring a representable timestamp stays representable except at
    // the very edge of chrono's range; fall back to the input there.
    DateTime::from_timestamp(secs, 0).unwrap_or(t)
}

/// Parse an "HH:MM" string into a time of day.
///
/// The format is strict: two digits, a colon, two digits, and the
/// values must be a real time of day. Seconds are zero by construction.
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, TimeError> {
    let bytes = s.as_bytes();

    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(TimeError::new("expected HH:MM"));
    }

    let hour = parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour"))?;
    let minute = parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new("invalid minute"))?;

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeError::new("time out of range"))
}

/// Combine a "YYYY-MM-DD" date and an "HH:MM" time into a UTC timestamp.
///
/// This is how TransportAPI timetable payloads are interpreted: the
/// payload-level date plus a per-departure aimed time.
pub fn parse_date_hhmm(date: &str, time: &str) -> Result<DateTime<Utc>, TimeError> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| TimeError::new("expected YYYY-MM-DD"))?;
    let time = parse_hhmm(time)?;
    Ok(date.and_time(time).and_utc())
}

/// Parse a journey start time from a request.
///
/// Accepts RFC 3339 as well as naive ISO 8601 forms with or without
/// seconds and with either a `T` or a space separator. Naive values are
/// taken to already be in UTC.
pub fn parse_start_time(s: &str) -> Result<DateTime<Utc>, TimeError> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(t.and_utc());
        }
    }

    Err(TimeError::new("expected an ISO 8601 datetime"))
}

/// Format a timestamp in the naive ISO 8601 form responses use.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use journey_server::domain::format_iso8601;
///
/// let t = Utc.with_ymd_and_hms(2025, 6, 16, 10, 15, 0).unwrap();
/// assert_eq!(format_iso8601(t), "2025-06-16T10:15:00");
/// ```
pub fn format_iso8601(t: DateTime<Utc>) -> String {
    t.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Parse exactly two ASCII digit bytes.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    match bytes {
        &[d1 @ b'0'..=b'9', d2 @ b'0'..=b'9'] => {
            Some((d1 - b'0') as u32 * 10 + (d2 - b'0') as u32)
        }
        _ => None,
    }
}
