//! Admission chain: request logging, CORS, panic recovery, authentication, subscription.

pub mod auth;
pub mod layers;
pub mod shutdown;
pub mod subscription;

pub use auth::require_auth;
pub use layers::{catch_panic_layer, cors_layer, trace_layer, ALLOWED_ORIGIN};
pub use shutdown::cancel_on_shutdown;
pub use subscription::require_subscription;
