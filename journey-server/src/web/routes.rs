//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use crate::planner::{JourneyPlanner, PlanError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/journey", post(plan_journey))
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::current(&state.settings.env))
}

/// Plan a journey through an ordered list of stations.
///
/// Validates the request, then resolves each leg in order and returns
/// the final arrival time.
async fn plan_journey(
    State(state): State<AppState>,
    Json(req): Json<JourneyRequest>,
) -> Result<Json<JourneyResponse>, AppError> {
    let journey = req.validate(Utc::now())?;

    let planner = JourneyPlanner::new(state.timetable.as_ref());
    let arrival = planner
        .plan(&journey.codes, journey.start_time, journey.max_wait)
        .await?;

    Ok(Json(JourneyResponse::from_arrival(arrival)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Upstream { status: StatusCode, message: String },
}

impl From<InvalidRequest> for AppError {
    fn from(e: InvalidRequest) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::NoTrainsFound { .. } => AppError::NotFound {
                message: e.to_string(),
            },
            PlanError::ExcessiveWait { .. } => AppError::BadRequest {
                message: e.to_string(),
            },
            PlanError::Provider(ref provider) => AppError::Upstream {
                status: StatusCode::from_u16(provider.status())
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Upstream { status, message } => (status, message),
        };

        // Log errors to stderr for debugging
        eprintln!("[{status}] {message}");

        let body = Json(ErrorResponse { detail: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, TimeZone};

    use crate::cache::CachedTimetable;
    use crate::config::Settings;
    use crate::domain::Crs;
    use crate::store::TimetableStore;
    use crate::transportapi::{TransportApiClient, TransportApiConfig, TransportApiError};

    fn crs(code: &str) -> Crs {
        Crs::parse(code).unwrap()
    }

    fn utc(h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 16, h, mi, 0).unwrap()
    }

    fn response_status(e: PlanError) -> StatusCode {
        AppError::from(e).into_response().status()
    }

    #[test]
    fn no_trains_found_responds_404() {
        let e = PlanError::NoTrainsFound {
            from: crs("PNZ"),
            to: crs("BHM"),
            after: utc(10, 0),
        };
        assert_eq!(response_status(e), StatusCode::NOT_FOUND);
    }

    #[test]
    fn excessive_wait_responds_400() {
        let e = PlanError::ExcessiveWait {
            station: crs("PNZ"),
            wait_mins: 45,
            max_wait_mins: 30,
        };
        assert_eq!(response_status(e), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn provider_errors_keep_their_status() {
        let cases = [
            (TransportApiError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (
                TransportApiError::Transport("connection refused".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                TransportApiError::UpstreamStatus {
                    status: 429,
                    detail: "rate limited".to_string(),
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                TransportApiError::Malformed("truncated body".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                TransportApiError::Unexpected("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (provider_error, expected) in cases {
            assert_eq!(response_status(PlanError::Provider(provider_error)), expected);
        }
    }

    #[test]
    fn validation_failures_respond_400() {
        let e = InvalidRequest("At least two station codes are required.".to_string());
        let response = AppError::from(e).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn error_body_is_a_detail_object() {
        let response = AppError::NotFound {
            message: "No trains found from PNZ to BHM after 2025-06-16 10:00:00".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "detail": "No trains found from PNZ to BHM after 2025-06-16 10:00:00"
            })
        );
    }

    #[tokio::test]
    async fn router_builds_with_live_wiring() {
        let store = TimetableStore::in_memory().await.unwrap();
        let client = TransportApiClient::new(TransportApiConfig::new("id", "key")).unwrap();
        let state = AppState::new(CachedTimetable::new(client, store), Settings::default());

        let _router = create_router(state);
    }
}
