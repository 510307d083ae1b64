//! Bearer token verification against the loaded key set.

use crate::auth::keys::KeySet;
use crate::error::TokenError;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    iat: Option<i64>,
}

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, TokenError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(TokenError::MissingToken)?
        .to_str()
        .map_err(|_| TokenError::MalformedToken("authorization header is not ASCII".into()))?
        .trim();
    if value.is_empty() {
        return Err(TokenError::MissingToken);
    }
    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenError::MalformedToken(format!("unsupported scheme {}", scheme)));
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::MissingToken);
    }
    Ok(token)
}

/// Verify the bearer token on a request and return its subject.
pub fn user_from_token(headers: &HeaderMap, keys: &KeySet) -> Result<String, TokenError> {
    let token = bearer_token(headers)?;
    verify_token(token, keys)
}

/// Verify signature and temporal claims of `token`; returns the non-empty `sub` claim.
pub fn verify_token(token: &str, keys: &KeySet) -> Result<String, TokenError> {
    let header = decode_header(token).map_err(|e| TokenError::MalformedToken(e.to_string()))?;
    if matches!(header.alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
        return Err(TokenError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
    }
    let entry = header
        .kid
        .as_deref()
        .and_then(|kid| keys.get(kid))
        .ok_or_else(|| TokenError::UnknownKey(header.kid.clone()))?;
    if let Some(pinned) = entry.algorithm {
        if pinned != header.alg {
            return Err(TokenError::SignatureInvalid);
        }
    }

    let mut validation = Validation::new(header.alg);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    let data = decode::<Claims>(token, &entry.key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::ImmatureSignature => TokenError::NotYetValid,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::SignatureInvalid,
        _ => TokenError::MalformedToken(e.to_string()),
    })?;

    if let Some(iat) = data.claims.iat {
        if iat > chrono::Utc::now().timestamp() {
            return Err(TokenError::NotYetValid);
        }
    }

    match data.claims.sub {
        Some(sub) if !sub.is_empty() => Ok(sub),
        _ => Err(TokenError::NoSubject),
    }
}
