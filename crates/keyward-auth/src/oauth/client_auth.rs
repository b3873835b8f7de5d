//! Client authentication for the token endpoint.
//!
//! Exactly one credential source must be present on a token request:
//!
//! - `Authorization: Basic` header (`client_secret_basic`)
//! - `client_secret` form parameter (`client_secret_post`)
//! - `client_assertion` / `client_assertion_type` form parameters
//!   (`client_secret_jwt`)
//! - nothing at all (`none`, public clients identified by `client_id`)
//!
//! Supplying more than one source is `invalid_request`. The presented
//! source must be the method the client registered. Every authentication
//! failure collapses to `invalid_client` so callers cannot probe whether
//! the id, the secret, or the method was wrong; Basic-header failures
//! additionally carry the HTTP 401 / `WWW-Authenticate: Basic` marker.
//!
//! Secret comparison is constant-time.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use subtle::ConstantTimeEq;
use time::OffsetDateTime;

use crate::oauth::client_assertion;
use crate::oauth::token::{TokenEndpointError, TokenError};
use crate::params::RequestParams;
use crate::storage::ClientStore;
use crate::types::{Client, TokenEndpointAuthMethod};

/// The assertion type for JWT bearer client assertions (RFC 7523).
pub const JWT_BEARER_ASSERTION_TYPE: &str =
    "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Result of successful client authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    /// The authenticated client.
    pub client: Client,

    /// The authentication method used.
    pub auth_method: TokenEndpointAuthMethod,
}

/// Authenticates the client behind a token request.
///
/// # Errors
///
/// Returns `invalid_request` for malformed or ambiguous credential
/// combinations and `invalid_client` for every authentication failure.
pub async fn authenticate_client(
    params: &RequestParams,
    authorization_header: Option<&str>,
    client_store: &dyn ClientStore,
    now: OffsetDateTime,
) -> Result<AuthenticatedClient, TokenEndpointError> {
    let post_secret = params
        .maybe("client_secret")
        .map_err(|e| TokenError::invalid_request(e.to_string()))?;
    let assertion = params
        .maybe("client_assertion")
        .map_err(|e| TokenError::invalid_request(e.to_string()))?;
    let assertion_type = params
        .maybe("client_assertion_type")
        .map_err(|e| TokenError::invalid_request(e.to_string()))?;
    let form_client_id = params
        .maybe("client_id")
        .map_err(|e| TokenError::invalid_request(e.to_string()))?;

    let sources = [
        authorization_header.is_some(),
        post_secret.is_some(),
        assertion.is_some() || assertion_type.is_some(),
    ];
    if sources.iter().filter(|present| **present).count() > 1 {
        return Err(
            TokenError::invalid_request("Multiple client authentication methods supplied").into(),
        );
    }

    let authenticated = if let Some(header) = authorization_header {
        authenticate_basic(header, client_store).await?
    } else if let Some(secret) = post_secret {
        let client_id = form_client_id.ok_or_else(|| {
            TokenError::invalid_request("Missing client_id for client_secret_post authentication")
        })?;
        authenticate_secret_post(client_id, secret, client_store).await?
    } else if assertion.is_some() || assertion_type.is_some() {
        authenticate_assertion(assertion_type, assertion, client_store, now).await?
    } else {
        let client_id = form_client_id
            .ok_or_else(|| TokenError::invalid_client("No client credentials provided"))?;
        authenticate_public(client_id, client_store).await?
    };

    // An asserted form client_id must name the client that authenticated.
    if let Some(form_id) = form_client_id {
        if form_id != authenticated.client.id {
            return Err(TokenError::invalid_request(
                "client_id does not match the authenticated client",
            )
            .into());
        }
    }

    Ok(authenticated)
}

/// Parses an HTTP Basic `Authorization` header value.
///
/// Returns `Some((client_id, client_secret))` if the value is well-formed.
/// The secret may contain colons; only the first colon splits.
#[must_use]
pub fn parse_basic_auth(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.trim().strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (client_id, client_secret) = credentials.split_once(':')?;
    Some((client_id.to_string(), client_secret.to_string()))
}

async fn authenticate_basic(
    header: &str,
    client_store: &dyn ClientStore,
) -> Result<AuthenticatedClient, TokenEndpointError> {
    let (client_id, client_secret) = parse_basic_auth(header)
        .ok_or_else(|| TokenError::invalid_client_basic("Client authentication failed"))?;

    let client = client_store
        .find_by_client_id(&client_id)
        .await?
        .ok_or_else(|| TokenError::invalid_client_basic("Client authentication failed"))?;

    let method_ok =
        client.token_endpoint_auth_method == TokenEndpointAuthMethod::ClientSecretBasic;
    let secret_ok = secret_matches(&client, &client_secret);
    if !(method_ok && secret_ok) {
        tracing::debug!(client_id = %client.id, "rejected Basic client authentication");
        return Err(TokenError::invalid_client_basic("Client authentication failed").into());
    }

    Ok(AuthenticatedClient {
        client,
        auth_method: TokenEndpointAuthMethod::ClientSecretBasic,
    })
}

async fn authenticate_secret_post(
    client_id: &str,
    client_secret: &str,
    client_store: &dyn ClientStore,
) -> Result<AuthenticatedClient, TokenEndpointError> {
    let client = client_store
        .find_by_client_id(client_id)
        .await?
        .ok_or_else(|| TokenError::invalid_client("Client authentication failed"))?;

    let method_ok = client.token_endpoint_auth_method == TokenEndpointAuthMethod::ClientSecretPost;
    let secret_ok = secret_matches(&client, client_secret);
    if !(method_ok && secret_ok) {
        tracing::debug!(client_id = %client.id, "rejected client_secret_post authentication");
        return Err(TokenError::invalid_client("Client authentication failed").into());
    }

    Ok(AuthenticatedClient {
        client,
        auth_method: TokenEndpointAuthMethod::ClientSecretPost,
    })
}

async fn authenticate_assertion(
    assertion_type: Option<&str>,
    assertion: Option<&str>,
    client_store: &dyn ClientStore,
    now: OffsetDateTime,
) -> Result<AuthenticatedClient, TokenEndpointError> {
    let assertion_type = assertion_type
        .ok_or_else(|| TokenError::invalid_request("Missing client_assertion_type"))?;
    if assertion_type != JWT_BEARER_ASSERTION_TYPE {
        return Err(TokenError::invalid_request(format!(
            "Unsupported client_assertion_type: {assertion_type}"
        ))
        .into());
    }
    let assertion =
        assertion.ok_or_else(|| TokenError::invalid_request("Missing client_assertion"))?;

    let client_id = client_assertion::extract_client_id_unverified(assertion)?;
    let client = client_store
        .find_by_client_id(&client_id)
        .await?
        .ok_or_else(|| TokenError::invalid_client("Client authentication failed"))?;

    match client.token_endpoint_auth_method {
        TokenEndpointAuthMethod::ClientSecretJwt => {
            client_assertion::verify_with_secret(assertion, &client, now)?;
        }
        TokenEndpointAuthMethod::PrivateKeyJwt => {
            return Err(
                TokenError::invalid_client("private_key_jwt authentication is not supported")
                    .into(),
            );
        }
        _ => {
            return Err(TokenError::invalid_client("Client authentication failed").into());
        }
    }

    let auth_method = client.token_endpoint_auth_method;
    Ok(AuthenticatedClient {
        client,
        auth_method,
    })
}

async fn authenticate_public(
    client_id: &str,
    client_store: &dyn ClientStore,
) -> Result<AuthenticatedClient, TokenEndpointError> {
    let client = client_store
        .find_by_client_id(client_id)
        .await?
        .ok_or_else(|| TokenError::invalid_client("Client authentication failed"))?;

    if client.token_endpoint_auth_method != TokenEndpointAuthMethod::None {
        tracing::debug!(client_id = %client.id, "confidential client sent no credentials");
        return Err(TokenError::invalid_client("Client authentication failed").into());
    }

    Ok(AuthenticatedClient {
        client,
        auth_method: TokenEndpointAuthMethod::None,
    })
}

fn secret_matches(client: &Client, presented: &str) -> bool {
    match client.secret.as_deref() {
        Some(registered) => presented
            .as_bytes()
            .ct_eq(registered.as_bytes())
            .into(),
        None => false,
    }
}
