//! Subscription gate: the authenticated user must hold an active subscription.

use crate::billing::SubscriptionChecker;
use crate::error::AdmissionError;
use crate::extractors::UserId;
use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use std::sync::Arc;

/// Must run inside [`require_auth`](crate::middleware::require_auth). Not cached; one provider call per request.
pub async fn require_subscription(
    State(billing): State<Arc<dyn SubscriptionChecker>>,
    req: Request,
    next: Next,
) -> Result<Response, AdmissionError> {
    let user_id = req
        .extensions()
        .get::<UserId>()
        .cloned()
        .ok_or(AdmissionError::Unauthorized)?;

    let state = billing.customer_state(user_id.as_str()).await.map_err(|e| {
        tracing::error!(error = %e, user_id = %user_id.as_str(), "billing provider lookup failed");
        AdmissionError::BillingProvider(e.to_string())
    })?;

    match state {
        Some(state) if state.has_active_subscription() => Ok(next.run(req).await),
        _ => {
            tracing::info!(user_id = %user_id.as_str(), "no active subscription");
            Err(AdmissionError::NoActiveSubscription)
        }
    }
}
