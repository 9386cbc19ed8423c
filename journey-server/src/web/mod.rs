//! Web layer for the timetable API.
//!
//! Provides the HTTP endpoints for planning journeys and checking
//! server health.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
