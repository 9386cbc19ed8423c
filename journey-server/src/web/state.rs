//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedTimetable;
use crate::config::Settings;
use crate::transportapi::TransportApiClient;

/// Shared application state.
///
/// Contains the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Cache-backed timetable resolver
    pub timetable: Arc<CachedTimetable<TransportApiClient>>,

    /// Runtime settings
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(timetable: CachedTimetable<TransportApiClient>, settings: Settings) -> Self {
        Self {
            timetable: Arc::new(timetable),
            settings: Arc::new(settings),
        }
    }
}
