//! TransportAPI HTTP client.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::Crs;

use super::error::TransportApiError;
use super::types::StationTimetable;

/// Default base URL for the station timetables endpoint.
const DEFAULT_BASE_URL: &str = "https://transportapi.com/v3/uk/train/station_timetables";

/// Number of departures requested per timetable fetch.
const DEPARTURE_LIMIT: u32 = 1000;

/// Configuration for the TransportAPI client.
#[derive(Debug, Clone)]
pub struct TransportApiConfig {
    /// Application ID credential
    pub app_id: String,
    /// Application key credential
    pub app_key: String,
    /// Base URL for the API (defaults to production TransportAPI)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl TransportApiConfig {
    /// Create a new config with the given credentials.
    pub fn new(app_id: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_key: app_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// TransportAPI station timetables client.
///
/// Credentials ride along as query parameters on every request, which is
/// how TransportAPI authenticates.
#[derive(Debug, Clone)]
pub struct TransportApiClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    app_key: String,
}

impl TransportApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TransportApiConfig) -> Result<Self, TransportApiError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportApiError::Unexpected(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url,
            app_id: config.app_id,
            app_key: config.app_key,
        })
    }

    /// Fetch scheduled departures from `from` that call at `to`, from
    /// `window_start` onwards.
    ///
    /// Makes a single request with no retries; the caller decides what a
    /// failure means.
    pub async fn station_timetable(
        &self,
        from: &Crs,
        to: &Crs,
        window_start: DateTime<Utc>,
    ) -> Result<StationTimetable, TransportApiError> {
        let url = format!("{}/{}.json", self.base_url, from.as_str());
        let datetime = format_query_datetime(window_start);
        let limit = DEPARTURE_LIMIT.to_string();

        debug!(%from, %to, %datetime, "requesting station timetable");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("app_id", self.app_id.as_str()),
                ("app_key", self.app_key.as_str()),
                ("live", "false"),
                ("station_detail", "calling_at"),
                ("train_status", "passenger"),
                ("datetime", datetime.as_str()),
                ("limit", limit.as_str()),
                ("calling_at", to.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportApiError::UpstreamStatus {
                status: status.as_u16(),
                detail: extract_error_detail(&body),
            });
        }

        let body = response.text().await?;
        parse_timetable(&body)
    }
}

/// Decode a timetable body. A response without a `departures.all` list
/// is malformed, not empty.
fn parse_timetable(body: &str) -> Result<StationTimetable, TransportApiError> {
    let timetable: StationTimetable = serde_json::from_str(body).map_err(|e| {
        TransportApiError::Malformed(format!(
            "{e} (body: {})",
            body.chars().take(500).collect::<String>()
        ))
    })?;

    if timetable.departure_list().is_none() {
        return Err(TransportApiError::Malformed(
            "missing departures list".to_string(),
        ));
    }

    Ok(timetable)
}

/// Format the window start the way the timetable endpoint expects.
///
/// Seconds are pinned to zero to match the minute precision used
/// everywhere else.
fn format_query_datetime(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:00Z").to_string()
}

/// Pull a useful detail string out of an upstream error body.
///
/// TransportAPI error bodies usually carry a JSON "error" field; fall
/// back to a trimmed snippet of the raw body.
fn extract_error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(error) = value.get("error").and_then(|e| e.as_str())
    {
        return error.to_string();
    }

    body.chars().take(500).collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn config_builder() {
        let config = TransportApiConfig::new("my-id", "my-key")
            .with_base_url("http://localhost:9090")
            .with_timeout(5);

        assert_eq!(config.app_id, "my-id");
        assert_eq!(config.app_key, "my-key");
        assert_eq!(config.base_url, "http://localhost:9090");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn config_defaults() {
        let config = TransportApiConfig::new("my-id", "my-key");

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn client_creation() {
        let client = TransportApiClient::new(TransportApiConfig::new("my-id", "my-key"));
        assert!(client.is_ok());
    }

    #[test]
    fn query_datetime_pins_seconds_to_zero() {
        let t = Utc.with_ymd_and_hms(2025, 6, 16, 10, 0, 42).unwrap();
        assert_eq!(format_query_datetime(t), "2025-06-16T10:00:00Z");

        let t = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 0).unwrap();
        assert_eq!(format_query_datetime(t), "2025-01-02T03:04:00Z");
    }

    #[test]
    fn error_detail_prefers_json_error_field() {
        let detail = extract_error_detail(r#"{"error": "permission denied"}"#);
        assert_eq!(detail, "permission denied");
    }

    #[test]
    fn error_detail_falls_back_to_body_snippet() {
        assert_eq!(extract_error_detail("  upstream exploded  "), "upstream exploded");
        assert_eq!(extract_error_detail(""), "");

        let long = "x".repeat(600);
        assert_eq!(extract_error_detail(&long).len(), 500);
    }

    #[test]
    fn error_detail_ignores_non_string_error_field() {
        assert_eq!(extract_error_detail(r#"{"error": 42}"#), r#"{"error": 42}"#);
    }

    #[test]
    fn parse_timetable_accepts_a_departures_list() {
        let body = r#"{"date": "2025-06-16", "departures": {"all": []}}"#;

        let timetable = parse_timetable(body).unwrap();

        assert_eq!(timetable.date.as_deref(), Some("2025-06-16"));
        assert!(timetable.departure_list().unwrap().is_empty());
    }

    #[test]
    fn parse_timetable_rejects_missing_departures() {
        assert!(matches!(
            parse_timetable(r#"{"date": "2025-06-16"}"#),
            Err(TransportApiError::Malformed(_))
        ));
        assert!(matches!(
            parse_timetable(r#"{"date": "2025-06-16", "departures": {}}"#),
            Err(TransportApiError::Malformed(_))
        ));
    }

    #[test]
    fn parse_timetable_rejects_undecodable_bodies() {
        match parse_timetable("<html>gateway error</html>") {
            Err(TransportApiError::Malformed(detail)) => {
                assert!(detail.contains("gateway error"));
            }
            other => panic!("expected a malformed error, got {other:?}"),
        }
    }

    // Tests against the live API would need real credentials and network
    // access; request shaping is covered via the mock source in cache.rs.
}
