//! Runtime configuration.
//!
//! Settings come from environment variables, read once at startup.
//! Missing TransportAPI credentials are a warning rather than an abort:
//! the server still comes up and can answer journeys the store already
//! covers, while fetches fail with an authentication error.

const DEFAULT_DATABASE_URL: &str = "sqlite://train_schedule.db";
const DEFAULT_ENV: &str = "DEV";

/// Settings for the server.
#[derive(Debug, Clone)]
pub struct Settings {
    /// TransportAPI application ID
    pub app_id: String,

    /// TransportAPI application key
    pub app_key: String,

    /// SQLite database URL
    pub database_url: String,

    /// Deployment environment label, reported by the health endpoint
    pub env: String,
}

impl Settings {
    /// Read settings from the environment.
    pub fn from_env() -> Self {
        let app_id = std::env::var("TRANSPORTAPI_APP_ID").unwrap_or_else(|_| {
            eprintln!("Warning: TRANSPORTAPI_APP_ID not set. TransportAPI calls will fail.");
            String::new()
        });
        let app_key = std::env::var("TRANSPORTAPI_APP_KEY").unwrap_or_else(|_| {
            eprintln!("Warning: TRANSPORTAPI_APP_KEY not set. TransportAPI calls will fail.");
            String::new()
        });
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

        Self {
            app_id,
            app_key,
            database_url,
            env,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_key: String::new(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            env: DEFAULT_ENV.to_string(),
        }
    }
}
