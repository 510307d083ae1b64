//! Application container: configuration, database gateway and services, wired top-down.

use crate::config::AppConfig;
use crate::database::{Database, PostgresDatabase};
use crate::error::BootstrapError;
use crate::service::ServiceRegistry;
use std::sync::Arc;

pub struct App {
    pub config: Arc<AppConfig>,
    pub db: Arc<dyn Database>,
    pub services: ServiceRegistry,
}

impl App {
    /// Connect PostgreSQL from `config.db` and build the service registry.
    pub async fn new(config: AppConfig) -> Result<Self, BootstrapError> {
        let db = Arc::new(PostgresDatabase::new(config.db.clone()));
        Self::with_database(config, db).await
    }

    /// Same as [`App::new`] with a caller-supplied gateway.
    pub async fn with_database(config: AppConfig, db: Arc<dyn Database>) -> Result<Self, BootstrapError> {
        db.connect().await?;
        let pool = db.pool().ok_or(BootstrapError::DatabaseNotInitialized)?;
        let services = ServiceRegistry::new(pool);
        Ok(App {
            config: Arc::new(config),
            db,
            services,
        })
    }
}
