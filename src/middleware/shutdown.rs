//! Forced-shutdown cutoff for in-flight requests.

use crate::error::ErrorBody;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tokio_util::sync::CancellationToken;

/// Run the request unless `cancel` fires first. On cancellation the handler future is
/// dropped, which releases anything it holds (pooled connections included), and the
/// client gets 503.
pub async fn cancel_on_shutdown(
    State(cancel): State<CancellationToken>,
    req: Request,
    next: Next,
) -> Response {
    if cancel.is_cancelled() {
        return shutting_down();
    }
    tokio::select! {
        resp = next.run(req) => resp,
        _ = cancel.cancelled() => {
            tracing::warn!("in-flight request cancelled by forced shutdown");
            shutting_down()
        }
    }
}

fn shutting_down() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorBody::new("Server is shutting down")),
    )
        .into_response()
}
