//! Typed configuration records. Built once at startup, immutable afterwards.

use std::fmt;

/// PostgreSQL endpoint settings (`DB_*`).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DbConfig {
    pub driver: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listener port. Not configurable from the environment.
    pub port: u16,
    /// Upper bound on in-flight request draining at shutdown.
    pub graceful_shutdown_sec: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub jwks_url: String,
}

/// Billing provider (Polar) access.
#[derive(Clone, PartialEq, Eq)]
pub struct BillingConfig {
    pub access_token: String,
    pub api_url: String,
    /// Mount the subscription gate on the protected group.
    pub subscription_required: bool,
}

impl fmt::Debug for BillingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BillingConfig")
            .field("access_token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("subscription_required", &self.subscription_required)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub db: DbConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub billing: BillingConfig,
    pub log_level: String,
    pub env: String,
}
