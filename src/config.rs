// Process configuration, loaded once from the environment at startup: one
// flat struct, env-driven, with defaults for everything except the
// database URL.

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,

    pub http_host: String,
    pub http_port: u16,

    pub log_level: String,

    pub subscription_max_delivery_attempts: i32,
    pub subscription_backoff_min_seconds: i32,
    pub subscription_backoff_max_seconds: i32,

    pub janitor_lock_timeout_seconds: i64,
    pub janitor_retention_seconds: i64,
    pub janitor_interval_seconds: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        // Loading a .env file is best-effort; absence is not an error.
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| "DATABASE_URL must be set".to_string())?,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,

            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: parse_env("HTTP_PORT", 8080)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            subscription_max_delivery_attempts: parse_env(
                "SUBSCRIPTION_MAX_DELIVERY_ATTEMPTS",
                5,
            )?,
            subscription_backoff_min_seconds: parse_env("SUBSCRIPTION_BACKOFF_MIN_SECONDS", 5)?,
            subscription_backoff_max_seconds: parse_env(
                "SUBSCRIPTION_BACKOFF_MAX_SECONDS",
                300,
            )?,

            janitor_lock_timeout_seconds: parse_env("JANITOR_LOCK_TIMEOUT_SECONDS", 300)?,
            janitor_retention_seconds: parse_env("JANITOR_RETENTION_SECONDS", 604_800)?,
            janitor_interval_seconds: parse_env("JANITOR_INTERVAL_SECONDS", 60)?,
        })
    }

    pub fn janitor_interval(&self) -> Duration {
        Duration::from_secs(self.janitor_interval_seconds)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| format!("{key} is set but not a valid value")),
        Err(_) => Ok(default),
    }
}
