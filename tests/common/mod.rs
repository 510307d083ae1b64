//! Shared fixtures: an Ed25519 token issuer served over a mock JWKS endpoint and an
//! in-memory database gateway.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use conversense::{load_config_from, AppConfig, Database, DatabaseError};
use ed25519_dalek::pkcs8::EncodePrivateKey;
use ed25519_dalek::SigningKey;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const KID: &str = "issuer-key";

pub struct Issuer {
    encoding: EncodingKey,
    public_x: String,
}

impl Issuer {
    pub fn new() -> Self {
        let signing = SigningKey::from_bytes(&[3u8; 32]);
        let der = signing.to_pkcs8_der().unwrap();
        Issuer {
            encoding: EncodingKey::from_ed_der(der.as_bytes()),
            public_x: URL_SAFE_NO_PAD.encode(signing.verifying_key().to_bytes()),
        }
    }

    pub fn jwks(&self) -> serde_json::Value {
        serde_json::json!({
            "keys": [{ "kty": "OKP", "crv": "Ed25519", "x": self.public_x, "kid": KID, "alg": "EdDSA" }]
        })
    }

    pub fn token_for(&self, sub: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        let mut header = Header::new(Algorithm::EdDSA);
        header.kid = Some(KID.to_string());
        jsonwebtoken::encode(
            &header,
            &serde_json::json!({ "sub": sub, "iat": now, "exp": now + 600 }),
            &self.encoding,
        )
        .unwrap()
    }

    /// Serve this issuer's JWKS at `/api/auth/jwks`.
    pub async fn serve_jwks(&self) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(self.jwks()))
            .mount(&server)
            .await;
        server
    }
}

/// Configuration pointing at `jwks_url`, listening on an ephemeral port.
pub fn test_config(jwks_url: &str) -> AppConfig {
    let mut env = HashMap::new();
    env.insert("DB_HOST", "127.0.0.1".to_string());
    env.insert("JWKS_URL", jwks_url.to_string());
    env.insert("APP_ENV", "test".to_string());
    let mut config = load_config_from(|key| env.get(key).cloned());
    config.server.port = 0;
    config
}

/// Gateway backed by a lazy pool; records lifecycle calls.
pub struct RecordingDatabase {
    pool: PgPool,
    connected: AtomicBool,
    pub closes: AtomicUsize,
}

impl RecordingDatabase {
    pub fn new() -> Self {
        RecordingDatabase {
            pool: PgPoolOptions::new()
                .connect_lazy("postgres://postgres@127.0.0.1:5432/conversense_test")
                .unwrap(),
            connected: AtomicBool::new(false),
            closes: AtomicUsize::new(0),
        }
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Database for RecordingDatabase {
    async fn connect(&self) -> Result<(), DatabaseError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pool(&self) -> Option<PgPool> {
        if self.connected.load(Ordering::SeqCst) && self.close_count() == 0 {
            Some(self.pool.clone())
        } else {
            None
        }
    }

    async fn close(&self) -> Result<(), DatabaseError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.pool.close().await;
        Ok(())
    }
}

/// In-memory log sink for asserting on emitted messages.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Subscriber writing plain-text events into this capture. Install it with
    /// `tracing::subscriber::set_default` on a current-thread runtime.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        let sink = self.clone();
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || sink.clone())
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
