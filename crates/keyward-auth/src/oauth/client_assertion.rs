//! JWT client assertion validation.
//!
//! Implements the RFC 7523 profile used for `client_secret_jwt`
//! authentication at the token endpoint: the client presents a JWT whose
//! `iss` and `sub` both name the client, whose `exp` lies in the future,
//! and whose HMAC signature verifies with the client secret. When the
//! registration pins an expected JWS algorithm, the assertion's `alg`
//! header must match it.
//!
//! Expiry is checked against the caller-supplied clock, not the system
//! clock, so the whole path stays deterministic under test.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::oauth::token::TokenError;
use crate::types::Client;

/// Claims carried by a client assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAssertionClaims {
    /// Issuer - must be the client_id.
    pub iss: String,

    /// Subject - must be the client_id.
    pub sub: String,

    /// Expiration time as a Unix timestamp; must be in the future.
    pub exp: i64,

    /// Issued-at time (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// JWT ID (optional, not tracked).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Verifies a `client_secret_jwt` assertion against the client secret.
///
/// # Errors
///
/// Returns `invalid_client` if the assertion does not parse, the algorithm
/// is not an HMAC variant (or differs from the pinned
/// `token_endpoint_auth_alg`), the signature does not verify, the `iss` or
/// `sub` claims disagree with the client id, or `exp` is not in the future
/// at `now`.
pub fn verify_with_secret(
    assertion: &str,
    client: &Client,
    now: OffsetDateTime,
) -> Result<ClientAssertionClaims, TokenError> {
    let secret = client
        .secret
        .as_deref()
        .ok_or_else(|| TokenError::invalid_client("Client authentication failed"))?;

    let algorithm = extract_algorithm(assertion)?;
    if !matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    ) {
        return Err(TokenError::invalid_client("Client authentication failed"));
    }
    if let Some(expected) = client.token_endpoint_auth_alg {
        if algorithm != expected {
            return Err(TokenError::invalid_client("Client authentication failed"));
        }
    }

    let mut validation = Validation::new(algorithm);
    // Expiry is checked below against the caller's clock.
    validation.validate_exp = false;
    validation.validate_aud = false;

    let token_data = jsonwebtoken::decode::<ClientAssertionClaims>(
        assertion,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(client_id = %client.id, "client assertion rejected: {e}");
        TokenError::invalid_client("Client authentication failed")
    })?;

    let claims = token_data.claims;
    if claims.iss != client.id || claims.sub != client.id {
        return Err(TokenError::invalid_client("Client authentication failed"));
    }
    if claims.exp <= now.unix_timestamp() {
        return Err(TokenError::invalid_client("Client authentication failed"));
    }

    Ok(claims)
}

/// Extracts the asserted client id from an unverified JWT.
///
/// Used to look the client up before the signature can be checked. The
/// result is only trusted after [`verify_with_secret`] succeeds.
pub fn extract_client_id_unverified(assertion: &str) -> Result<String, TokenError> {
    let payload = jwt_part(assertion, 1)?;

    #[derive(Deserialize)]
    struct MinimalClaims {
        #[serde(default)]
        iss: Option<String>,
        #[serde(default)]
        sub: Option<String>,
    }

    let claims: MinimalClaims = serde_json::from_slice(&payload)
        .map_err(|_| TokenError::invalid_client("Client authentication failed"))?;

    claims
        .iss
        .or(claims.sub)
        .ok_or_else(|| TokenError::invalid_client("Client authentication failed"))
}

/// Extracts the signing algorithm from a JWT header.
pub fn extract_algorithm(assertion: &str) -> Result<Algorithm, TokenError> {
    let header = jwt_part(assertion, 0)?;

    #[derive(Deserialize)]
    struct JwtHeader {
        alg: String,
    }

    let header: JwtHeader = serde_json::from_slice(&header)
        .map_err(|_| TokenError::invalid_client("Client authentication failed"))?;

    header
        .alg
        .parse()
        .map_err(|_| TokenError::invalid_client("Client authentication failed"))
}

fn jwt_part(assertion: &str, index: usize) -> Result<Vec<u8>, TokenError> {
    let mut parts = assertion.split('.');
    let part = parts
        .clone()
        .nth(index)
        .ok_or_else(|| TokenError::invalid_client("Client authentication failed"))?;
    if parts.count() != 3 {
        return Err(TokenError::invalid_client("Client authentication failed"));
    }
    URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| TokenError::invalid_client("Client authentication failed"))
}
