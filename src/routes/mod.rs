pub mod api;
pub mod common;

pub use api::api_routes;
pub use common::common_routes;

use crate::auth::KeySet;
use crate::billing::SubscriptionChecker;
use crate::middleware::{
    cancel_on_shutdown, catch_panic_layer, cors_layer, require_auth, require_subscription, trace_layer,
};
use axum::{middleware::from_fn_with_state, Router};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;

/// Full HTTP surface: `/health`, the protected `/api` group, and the global layers
/// (logger, then CORS, then recovery, outermost first). Panic responses pass back
/// through CORS, so the browser client can read them.
///
/// Unmatched `/api/**` paths answer 404 only after authentication has passed.
/// Cancelling `shutdown` drops every in-flight handler and answers 503.
pub fn build_router(
    keys: Arc<KeySet>,
    billing: Option<Arc<dyn SubscriptionChecker>>,
    api: Router,
    shutdown: CancellationToken,
) -> Router {
    let mut protected = api.fallback(api::not_found);
    if let Some(billing) = billing {
        protected = protected.layer(from_fn_with_state(billing, require_subscription));
    }
    let protected = protected.layer(from_fn_with_state(keys, require_auth));

    Router::new()
        .merge(common_routes())
        .nest("/api", protected)
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer())
                .layer(cors_layer())
                .layer(catch_panic_layer())
                .layer(from_fn_with_state(shutdown, cancel_on_shutdown)),
        )
}
