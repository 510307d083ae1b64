//! Build [`AppConfig`] from the process environment.
//!
//! The loader is total: missing variables become empty strings and semantic
//! validation is left to the components that consume them.

use crate::config::types::*;

pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_GRACEFUL_SHUTDOWN_SEC: u64 = 5;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const POLAR_SANDBOX_URL: &str = "https://sandbox-api.polar.sh";

/// Read configuration from `std::env`. Call after the `.env` file has been loaded.
pub fn load_config() -> AppConfig {
    load_config_from(|key| std::env::var(key).ok())
}

/// Read configuration through an arbitrary lookup (used by tests and embedders).
pub fn load_config_from<F>(lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).unwrap_or_default();

    let db_port = lookup("DB_PORT")
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(DEFAULT_DB_PORT);

    let api_url = lookup("POLAR_API_URL")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| POLAR_SANDBOX_URL.to_string());

    AppConfig {
        db: DbConfig {
            driver: var("DB_DRIVER"),
            host: var("DB_HOST"),
            port: db_port,
            user: var("DB_USERNAME"),
            password: var("DB_PASSWORD"),
            name: var("DB_DATABASE"),
        },
        server: ServerConfig {
            port: DEFAULT_SERVER_PORT,
            graceful_shutdown_sec: DEFAULT_GRACEFUL_SHUTDOWN_SEC,
        },
        auth: AuthConfig {
            jwks_url: var("JWKS_URL"),
        },
        billing: BillingConfig {
            access_token: var("POLAR_ACCESS_TOKEN"),
            api_url,
            subscription_required: lookup("SUBSCRIPTION_REQUIRED")
                .map(|s| parse_flag(&s))
                .unwrap_or(false),
        },
        log_level: DEFAULT_LOG_LEVEL.to_string(),
        env: var("APP_ENV"),
    }
}

fn parse_flag(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}
