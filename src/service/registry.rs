//! Registry of domain services. Business services attach here and share the pool.

use sqlx::PgPool;

#[derive(Clone)]
pub struct ServiceRegistry {
    pool: PgPool,
}

impl ServiceRegistry {
    pub fn new(pool: PgPool) -> Self {
        ServiceRegistry { pool }
    }

    /// Pool handle for services. Connections borrowed from it return on drop.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
