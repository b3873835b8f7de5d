//! Authorization endpoint wire types.
//!
//! Success and error payloads for the authorization endpoint, plus the
//! redirect URL builders that encode them. Both builders take a
//! `use_fragment` flag: the code flow encodes into the query string, while
//! fragment encoding is reserved for implicit-style response types whose
//! artifacts must not reach the server hosting the redirect URI.
//!
//! Errors that arise before a trustworthy redirect URI exists are a
//! different type entirely ([`crate::error::UntrustedClientError`]) and
//! never pass through these builders.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::scope::{Scope, join_scopes};

/// Successful authorization response parameters.
///
/// Encoded onto the validated redirect URI, e.g.
/// `http://app?code=5a1f9c8e2b447d03&state=xyz`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationResponse {
    /// The authorization code to be exchanged at the token endpoint.
    pub code: String,

    /// Echoed state parameter, byte-for-byte as the client sent it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Granted scopes (space-joined), present when the grant differs from
    /// the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl AuthorizationResponse {
    /// Creates a new authorization response.
    #[must_use]
    pub fn new(code: String, state: Option<String>) -> Self {
        Self {
            code,
            state,
            scope: None,
        }
    }

    /// Attaches the granted scope set.
    #[must_use]
    pub fn with_scope(mut self, scope: &[Scope]) -> Self {
        self.scope = Some(join_scopes(scope));
        self
    }

    /// Builds the redirect URL carrying this response.
    #[must_use]
    pub fn to_redirect_url(&self, redirect_uri: &Url, use_fragment: bool) -> Url {
        let mut pairs: Vec<(&str, &str)> = vec![("code", &self.code)];
        if let Some(ref state) = self.state {
            pairs.push(("state", state));
        }
        if let Some(ref scope) = self.scope {
            pairs.push(("scope", scope));
        }
        encode_redirect(redirect_uri, &pairs, use_fragment)
    }
}

/// Authorization error response parameters.
///
/// Redirected back to the client's validated redirect URI, e.g.
/// `http://app?error=access_denied&state=xyz`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationError {
    /// OAuth 2.0 error code.
    pub error: AuthorizationErrorCode,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    /// Echoed state parameter, when the request carried a usable one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl AuthorizationError {
    /// Creates a new authorization error.
    #[must_use]
    pub fn new(error: AuthorizationErrorCode, state: Option<String>) -> Self {
        Self {
            error,
            error_description: None,
            state,
        }
    }

    /// Creates a new authorization error with a description.
    #[must_use]
    pub fn with_description(
        error: AuthorizationErrorCode,
        description: impl Into<String>,
        state: Option<String>,
    ) -> Self {
        Self {
            error,
            error_description: Some(description.into()),
            state,
        }
    }

    /// Creates an `invalid_request` error.
    #[must_use]
    pub fn invalid_request(description: impl Into<String>, state: Option<String>) -> Self {
        Self::with_description(AuthorizationErrorCode::InvalidRequest, description, state)
    }

    /// Creates an `unauthorized_client` error.
    #[must_use]
    pub fn unauthorized_client(description: impl Into<String>, state: Option<String>) -> Self {
        Self::with_description(
            AuthorizationErrorCode::UnauthorizedClient,
            description,
            state,
        )
    }

    /// Creates an `access_denied` error.
    #[must_use]
    pub fn access_denied(state: Option<String>) -> Self {
        Self::new(AuthorizationErrorCode::AccessDenied, state)
    }

    /// Creates an `unsupported_response_type` error.
    #[must_use]
    pub fn unsupported_response_type(description: impl Into<String>, state: Option<String>) -> Self {
        Self::with_description(
            AuthorizationErrorCode::UnsupportedResponseType,
            description,
            state,
        )
    }

    /// Creates an `invalid_scope` error.
    #[must_use]
    pub fn invalid_scope(description: impl Into<String>, state: Option<String>) -> Self {
        Self::with_description(AuthorizationErrorCode::InvalidScope, description, state)
    }

    /// Creates a `server_error` error.
    #[must_use]
    pub fn server_error(state: Option<String>) -> Self {
        Self::new(AuthorizationErrorCode::ServerError, state)
    }

    /// Builds the redirect URL carrying this error.
    #[must_use]
    pub fn to_redirect_url(&self, redirect_uri: &Url, use_fragment: bool) -> Url {
        let mut pairs: Vec<(&str, &str)> = vec![("error", self.error.as_str())];
        if let Some(ref description) = self.error_description {
            pairs.push(("error_description", description));
        }
        if let Some(ref state) = self.state {
            pairs.push(("state", state));
        }
        encode_redirect(redirect_uri, &pairs, use_fragment)
    }
}

/// OAuth 2.0 authorization error codes.
///
/// Defined in RFC 6749 Section 4.1.2.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationErrorCode {
    /// The request is missing a required parameter, includes a parameter
    /// more than once, or is otherwise malformed.
    InvalidRequest,

    /// The client is not authorized to request an authorization code using
    /// this method.
    UnauthorizedClient,

    /// The resource owner or authorization server denied the request.
    AccessDenied,

    /// The authorization server does not support obtaining an authorization
    /// code using this method.
    UnsupportedResponseType,

    /// The requested scope is invalid, unknown, or malformed.
    InvalidScope,

    /// The authorization server encountered an unexpected condition.
    ServerError,

    /// The authorization server is temporarily unable to handle the request.
    TemporarilyUnavailable,
}

impl AuthorizationErrorCode {
    /// Returns the wire representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::AccessDenied => "access_denied",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::InvalidScope => "invalid_scope",
            Self::ServerError => "server_error",
            Self::TemporarilyUnavailable => "temporarily_unavailable",
        }
    }
}

impl fmt::Display for AuthorizationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Appends parameters to a redirect URI, in the query or the fragment.
fn encode_redirect(redirect_uri: &Url, pairs: &[(&str, &str)], use_fragment: bool) -> Url {
    let mut url = redirect_uri.clone();
    if use_fragment {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in pairs {
            serializer.append_pair(name, value);
        }
        url.set_fragment(Some(&serializer.finish()));
    } else {
        let mut query = url.query_pairs_mut();
        for (name, value) in pairs {
            query.append_pair(name, value);
        }
    }
    url
}
