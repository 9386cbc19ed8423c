//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Crs, format_iso8601, parse_start_time};

/// Request to plan a journey.
#[derive(Debug, Deserialize)]
pub struct JourneyRequest {
    /// Three-letter station codes in journey order
    pub station_codes: Vec<String>,

    /// Journey start time in ISO 8601 format (defaults to now)
    pub start_time: Option<String>,

    /// Maximum wait time at any station in minutes
    pub max_wait: i64,
}

/// A journey request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedJourney {
    /// Parsed station codes in journey order
    pub codes: Vec<Crs>,

    /// Resolved start time
    pub start_time: DateTime<Utc>,

    /// Maximum wait in minutes, in `1..=600`
    pub max_wait: i64,
}

/// Error describing the first validation failure in a journey request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct InvalidRequest(pub String);

/// Response for a planned journey.
#[derive(Debug, Serialize)]
pub struct JourneyResponse {
    /// Final arrival time at the destination station (ISO 8601 format)
    pub arrival_time: String,
}

/// Response for the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" when the server is answering at all
    pub status: String,

    /// Current server time, UTC, second precision
    pub time: String,

    /// API version prefix
    pub api_version: String,

    /// Application name
    pub app_name: String,

    /// What this endpoint is for
    pub description: String,

    /// Server build version
    pub version: String,

    /// Deployment environment label
    pub env: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error description
    pub detail: String,
}

// Validation and conversion implementations

impl JourneyRequest {
    /// Validate the request into planner inputs.
    ///
    /// Checks fields in declaration order and reports the first failure.
    /// A missing or empty `start_time` resolves to `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<ValidatedJourney, InvalidRequest> {
        if self.station_codes.len() < 2 {
            return Err(InvalidRequest(
                "At least two station codes are required.".to_string(),
            ));
        }

        let mut codes = Vec::with_capacity(self.station_codes.len());
        for code in &self.station_codes {
            let crs = Crs::parse(code).map_err(|_| {
                InvalidRequest(format!(
                    "Invalid station code: {code}. Must be three uppercase letters."
                ))
            })?;
            codes.push(crs);
        }

        let start_time = match self.start_time.as_deref() {
            None | Some("") => now,
            Some(s) => parse_start_time(s).map_err(|_| {
                InvalidRequest("start_time must be a valid ISO 8601 datetime string.".to_string())
            })?,
        };

        if self.max_wait <= 0 || self.max_wait > 600 {
            return Err(InvalidRequest(
                "max_wait must be between 1 and 600 minutes.".to_string(),
            ));
        }

        Ok(ValidatedJourney {
            codes,
            start_time,
            max_wait: self.max_wait,
        })
    }
}

impl JourneyResponse {
    /// Create from a final arrival time.
    pub fn from_arrival(arrival: DateTime<Utc>) -> Self {
        Self {
            arrival_time: format_iso8601(arrival),
        }
    }
}

impl HealthResponse {
    /// Snapshot the server's health right now.
    pub fn current(env: &str) -> Self {
        Self::at(Utc::now(), env)
    }

    fn at(now: DateTime<Utc>, env: &str) -> Self {
        Self {
            status: "ok".to_string(),
            time: format!("{}Z", format_iso8601(now)),
            api_version: "v1".to_string(),
            app_name: "UK Train Timetable".to_string(),
            description: "Health check endpoint for the UK Train Timetable API.".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            env: env.to_string(),
        }
    }
}
