//! converSense API service: configuration, database gateway, bearer-token admission,
//! subscription gate, routing and graceful shutdown.

pub mod app;
pub mod auth;
pub mod billing;
pub mod config;
pub mod database;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod service;

pub use app::App;
pub use auth::{load_keys, user_from_token, KeySet};
pub use billing::{CustomerState, PolarClient, SubscriptionChecker};
pub use config::{load_config, load_config_from, AppConfig};
pub use database::{Database, PostgresDatabase};
pub use error::{AdmissionError, BootstrapError, DatabaseError, KeyFetchError, TokenError};
pub use extractors::UserId;
pub use routes::{api_routes, build_router, common_routes};
pub use server::{shutdown_signal, Server};
pub use service::ServiceRegistry;
