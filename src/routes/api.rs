//! Protected `/api` group. Business endpoints register here; the group is empty for now.

use crate::error::ErrorBody;
use axum::{http::StatusCode, response::IntoResponse, Json, Router};

/// Endpoints mounted under `/api`. Everything here sits behind the admission gates.
pub fn api_routes() -> Router {
    Router::new()
}

/// Reached only after the admission gates pass.
pub(crate) async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not Found")))
}
