//! Authentication gate for the protected group.

use crate::auth::{user_from_token, KeySet};
use crate::error::AdmissionError;
use crate::extractors::UserId;
use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use std::sync::Arc;

/// Verify the bearer token and store the subject as [`UserId`]; 401 on any failure.
pub async fn require_auth(
    State(keys): State<Arc<KeySet>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AdmissionError> {
    let subject = user_from_token(req.headers(), &keys).map_err(|e| {
        tracing::debug!(error = %e, path = %req.uri().path(), "rejected bearer token");
        AdmissionError::Unauthorized
    })?;
    req.extensions_mut().insert(UserId(subject));
    Ok(next.run(req).await)
}
