//! Request identity placed in request extensions by the authentication gate.

use crate::error::AdmissionError;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Verified token subject. The single identity key shared by every gate and handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AdmissionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserId>()
            .filter(|u| !u.0.is_empty())
            .cloned()
            .ok_or(AdmissionError::Unauthorized)
    }
}
