//! JWKS retrieval. The key set is fetched once at startup and never mutated.

use crate::error::KeyFetchError;
use jsonwebtoken::jwk::{Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use std::collections::HashMap;
use std::time::Duration;

pub const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A verification key resolved from one JWK.
#[derive(Clone)]
pub struct VerificationKey {
    pub key: DecodingKey,
    /// Algorithm pinned by the JWK `alg` member, if any.
    pub algorithm: Option<Algorithm>,
}

/// Read-only public keys indexed by key id.
#[derive(Clone, Default)]
pub struct KeySet {
    by_kid: HashMap<String, VerificationKey>,
}

impl KeySet {
    /// Build from a parsed JWKS document. Keys without `kid` or with unusable parameters are skipped.
    pub fn from_jwks(jwks: &JwkSet) -> Self {
        let mut by_kid = HashMap::new();
        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                tracing::warn!("skipping JWK without kid");
                continue;
            };
            match verification_key(jwk) {
                Ok(key) => {
                    by_kid.insert(kid, key);
                }
                Err(e) => tracing::warn!(kid = %kid, error = %e, "skipping unusable JWK"),
            }
        }
        KeySet { by_kid }
    }

    pub fn get(&self, kid: &str) -> Option<&VerificationKey> {
        self.by_kid.get(kid)
    }

    pub fn len(&self) -> usize {
        self.by_kid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kid.is_empty()
    }
}

fn verification_key(jwk: &Jwk) -> Result<VerificationKey, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_jwk(jwk)?;
    let algorithm = jwk.common.key_algorithm.as_ref().and_then(signing_algorithm);
    Ok(VerificationKey { key, algorithm })
}

/// Map a JWK `alg` to a JWS signing algorithm. Encryption algorithms have no mapping.
fn signing_algorithm(alg: &KeyAlgorithm) -> Option<Algorithm> {
    match alg {
        KeyAlgorithm::HS256 => Some(Algorithm::HS256),
        KeyAlgorithm::HS384 => Some(Algorithm::HS384),
        KeyAlgorithm::HS512 => Some(Algorithm::HS512),
        KeyAlgorithm::ES256 => Some(Algorithm::ES256),
        KeyAlgorithm::ES384 => Some(Algorithm::ES384),
        KeyAlgorithm::RS256 => Some(Algorithm::RS256),
        KeyAlgorithm::RS384 => Some(Algorithm::RS384),
        KeyAlgorithm::RS512 => Some(Algorithm::RS512),
        KeyAlgorithm::PS256 => Some(Algorithm::PS256),
        KeyAlgorithm::PS384 => Some(Algorithm::PS384),
        KeyAlgorithm::PS512 => Some(Algorithm::PS512),
        KeyAlgorithm::EdDSA => Some(Algorithm::EdDSA),
        _ => None,
    }
}

/// Fetch the JWKS document at `jwks_url` and index its keys.
pub async fn load_keys(jwks_url: &str) -> Result<KeySet, KeyFetchError> {
    if jwks_url.trim().is_empty() {
        return Err(KeyFetchError::MissingUrl);
    }
    let http = reqwest::Client::builder()
        .timeout(JWKS_FETCH_TIMEOUT)
        .build()
        .map_err(|e| KeyFetchError::Http {
            url: jwks_url.to_string(),
            source: e,
        })?;

    let resp = http
        .get(jwks_url)
        .send()
        .await
        .map_err(|e| KeyFetchError::Http {
            url: jwks_url.to_string(),
            source: e,
        })?;
    if !resp.status().is_success() {
        return Err(KeyFetchError::Status {
            url: jwks_url.to_string(),
            status: resp.status().as_u16(),
        });
    }
    let jwks: JwkSet = resp.json().await.map_err(|e| KeyFetchError::Decode {
        url: jwks_url.to_string(),
        source: e,
    })?;

    let keys = KeySet::from_jwks(&jwks);
    if keys.is_empty() {
        return Err(KeyFetchError::NoUsableKeys(jwks_url.to_string()));
    }
    tracing::info!(url = %jwks_url, keys = keys.len(), "loaded auth keys");
    Ok(keys)
}
