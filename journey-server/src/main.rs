use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use journey_server::cache::CachedTimetable;
use journey_server::config::Settings;
use journey_server::store::TimetableStore;
use journey_server::transportapi::{TransportApiClient, TransportApiConfig};
use journey_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();

    // Open the timetable database, creating it on first run
    let store = TimetableStore::connect(&settings.database_url)
        .await
        .expect("Failed to open timetable database");

    // Create the TransportAPI client
    let api_config = TransportApiConfig::new(settings.app_id.clone(), settings.app_key.clone());
    let client =
        TransportApiClient::new(api_config).expect("Failed to create TransportAPI client");

    // Build app state
    let timetable = CachedTimetable::new(client, store);
    let state = AppState::new(timetable, settings);

    // Create router
    let app = create_router(state);

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], 8000));
    println!("UK Train Timetable API listening on http://{addr}");
    println!();
    println!("API Endpoints:");
    println!("  GET  /v1/health   - Health check");
    println!("  POST /v1/journey  - Plan a journey");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
