//! Token endpoint wire types.
//!
//! Success and error bodies for `POST /token`, serialized as JSON by the
//! transport adapter (with `Cache-Control: no-store` / `Pragma: no-cache`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::scope::{Scope, join_scopes};

/// Successful token response.
///
/// # Example
///
/// ```json
/// {
///   "access_token": "2YotnFZFEjr1zCsicMWpAA",
///   "token_type": "bearer",
///   "expires_in": 3600,
///   "scope": "openid email"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenResponse {
    /// The access token.
    pub access_token: String,

    /// Token type, always the lowercase `bearer`.
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// Refresh token, when the issuer granted one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token, when the `openid` scope was granted on a code exchange.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Granted scopes (space-separated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl AccessTokenResponse {
    /// Creates a new token response with the required fields.
    #[must_use]
    pub fn new(access_token: String, expires_in: u64) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
            refresh_token: None,
            id_token: None,
            scope: None,
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: String) -> Self {
        self.refresh_token = Some(token);
        self
    }

    /// Sets the ID token.
    #[must_use]
    pub fn with_id_token(mut self, token: String) -> Self {
        self.id_token = Some(token);
        self
    }

    /// Sets the granted scope.
    #[must_use]
    pub fn with_scope(mut self, scope: &[Scope]) -> Self {
        self.scope = Some(join_scopes(scope));
        self
    }
}

/// Token error response body per RFC 6749 Section 5.2.
#[derive(Debug, Clone, Serialize)]
pub struct TokenError {
    /// OAuth 2.0 error code.
    pub error: TokenErrorCode,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    #[serde(skip)]
    challenge_basic: bool,
}

impl TokenError {
    /// Creates a new token error.
    #[must_use]
    pub fn new(error: TokenErrorCode) -> Self {
        Self {
            error,
            error_description: None,
            challenge_basic: false,
        }
    }

    /// Creates a new token error with a description.
    #[must_use]
    pub fn with_description(error: TokenErrorCode, description: impl Into<String>) -> Self {
        Self {
            error,
            error_description: Some(description.into()),
            challenge_basic: false,
        }
    }

    /// Creates an `invalid_request` error.
    #[must_use]
    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidRequest, description)
    }

    /// Creates an `invalid_client` error (HTTP 400).
    #[must_use]
    pub fn invalid_client(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidClient, description)
    }

    /// Creates an `invalid_client` error for credentials that arrived in the
    /// `Authorization` header (HTTP 401 with a `WWW-Authenticate: Basic`
    /// challenge).
    #[must_use]
    pub fn invalid_client_basic(description: impl Into<String>) -> Self {
        let mut error = Self::with_description(TokenErrorCode::InvalidClient, description);
        error.challenge_basic = true;
        error
    }

    /// Creates an `invalid_grant` error.
    #[must_use]
    pub fn invalid_grant(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidGrant, description)
    }

    /// Creates an `unauthorized_client` error.
    #[must_use]
    pub fn unauthorized_client(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::UnauthorizedClient, description)
    }

    /// Creates an `unsupported_grant_type` error.
    #[must_use]
    pub fn unsupported_grant_type(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::UnsupportedGrantType, description)
    }

    /// Creates an `invalid_scope` error.
    #[must_use]
    pub fn invalid_scope(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidScope, description)
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        if self.challenge_basic { 401 } else { 400 }
    }

    /// Returns the `WWW-Authenticate` challenge to emit, if any.
    #[must_use]
    pub fn www_authenticate(&self) -> Option<&'static str> {
        self.challenge_basic.then_some("Basic")
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error_description {
            Some(ref description) => write!(f, "{}: {}", self.error.as_str(), description),
            None => write!(f, "{}", self.error.as_str()),
        }
    }
}

/// OAuth 2.0 token error codes.
///
/// Defined in RFC 6749 Section 5.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenErrorCode {
    /// The request is missing a required parameter, includes a parameter
    /// more than once, or is otherwise malformed.
    InvalidRequest,

    /// Client authentication failed.
    InvalidClient,

    /// The provided authorization grant or refresh token is invalid,
    /// expired, revoked, or was issued to another client.
    InvalidGrant,

    /// The authenticated client is not authorized to use this grant type.
    UnauthorizedClient,

    /// The grant type is not supported by the authorization server.
    UnsupportedGrantType,

    /// The requested scope is invalid, unknown, malformed, or exceeds the
    /// scope of the underlying grant.
    InvalidScope,
}

impl TokenErrorCode {
    /// Returns the wire representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidScope => "invalid_scope",
        }
    }
}

impl fmt::Display for TokenErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything a token request can fail with.
///
/// Protocol failures carry an RFC 6749 error body; capability failures are
/// infrastructure problems the transport adapter answers with its own 5xx
/// response, never with an OAuth error code.
#[derive(Debug, thiserror::Error)]
pub enum TokenEndpointError {
    /// A protocol error to serialize as the JSON error body.
    #[error("{0}")]
    OAuth(TokenError),

    /// A capability failure to surface as an infrastructure error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TokenError> for TokenEndpointError {
    fn from(error: TokenError) -> Self {
        Self::OAuth(error)
    }
}

impl TokenEndpointError {
    /// Returns the protocol error, if this is one.
    #[must_use]
    pub fn as_oauth(&self) -> Option<&TokenError> {
        match self {
            Self::OAuth(error) => Some(error),
            Self::Store(_) => None,
        }
    }
}
