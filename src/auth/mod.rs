//! Bearer-token authentication: JWKS key set and token verification.

pub mod keys;
pub mod token;

pub use keys::{load_keys, KeySet, VerificationKey};
pub use token::{bearer_token, user_from_token, verify_token};
