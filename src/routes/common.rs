//! Unauthenticated routes: liveness probe.

use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

/// GET /health.
pub fn common_routes() -> Router {
    Router::new().route("/health", get(health))
}
