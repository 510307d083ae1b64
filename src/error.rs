//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("invalid database config: {0}")]
    InvalidConfig(String),
    #[error("connect: {0}")]
    Connect(#[from] sqlx::Error),
    #[error("database already connected")]
    AlreadyConnected,
    #[error("database gateway is closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum KeyFetchError {
    #[error("JWKS_URL is empty")]
    MissingUrl,
    #[error("fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetch {url}: unexpected status {status}")]
    Status { url: String, status: u16 },
    #[error("decode key set from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("key set at {0} contains no usable keys")]
    NoUsableKeys(String),
}

/// Reasons a bearer token is rejected. All map to 401 at the admission layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("no key for kid {0:?}")]
    UnknownKey(Option<String>),
    #[error("unsupported signing algorithm {0}")]
    UnsupportedAlgorithm(String),
    #[error("signature invalid")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("token has no subject")]
    NoSubject,
}

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("billing client init: {0}")]
    Init(String),
    #[error("billing request {endpoint}: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("billing request {endpoint}: status {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("billing response {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Fatal startup failures. Any of these aborts the process with a non-zero exit.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("database: {0}")]
    Database(#[from] DatabaseError),
    #[error("database not initialized")]
    DatabaseNotInitialized,
    #[error("load auth keys: {0}")]
    KeyFetch(#[from] KeyFetchError),
    #[error(transparent)]
    Billing(#[from] BillingError),
    #[error("bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("serve: {0}")]
    Serve(#[source] std::io::Error),
}

/// Per-request admission failures, rendered as `{"error": "..."}`.
#[derive(Error, Debug)]
pub enum AdmissionError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("No active subscription found. Please upgrade to a pro plan")]
    NoActiveSubscription,
    #[error("{0}")]
    BillingProvider(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorBody {
            error: message.into(),
        }
    }
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdmissionError::Unauthorized => StatusCode::UNAUTHORIZED,
            AdmissionError::NoActiveSubscription => StatusCode::FORBIDDEN,
            AdmissionError::BillingProvider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
