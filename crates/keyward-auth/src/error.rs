//! Core error types shared across both endpoints.
//!
//! The protocol-level error payloads (redirect error parameters, token-error
//! JSON bodies) live next to their endpoints in [`crate::oauth::authorize`]
//! and [`crate::oauth::token`]. This module holds the two error types that
//! are *not* part of the OAuth wire protocol:
//!
//! - [`UntrustedClientError`] - authorization requests rejected before a
//!   trustworthy redirect URI exists. These must be rendered to the resource
//!   owner directly; redirecting would hand control to an unverified URI.
//! - [`StoreError`] - failures raised by the injected capabilities (client
//!   registry, code store, token issuer). The core never inspects these; it
//!   either converts them to `server_error` redirects (authorization
//!   endpoint) or propagates them for the transport adapter to turn into an
//!   infrastructure response (token endpoint).

/// Authorization-request rejections that must not be redirected.
///
/// Everything here means the client identity or the redirect URI could not
/// be established, so the browser stays on the authorization server and the
/// resource owner sees a local error page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UntrustedClientError {
    /// The client_id parameter is missing, repeated, or names no registered
    /// client.
    #[error("Invalid client: {message}")]
    InvalidClient {
        /// Description of why the client could not be established.
        message: String,
    },

    /// The redirect_uri parameter is repeated, unparseable, or does not
    /// exactly match a registered URI.
    #[error("Invalid redirect URI")]
    InvalidRedirectUri,

    /// The redirect_uri parameter contains a fragment component.
    #[error("Redirect URI must not contain a fragment")]
    FragmentInUri,
}

impl UntrustedClientError {
    /// Creates a new `InvalidClient` error.
    #[must_use]
    pub fn invalid_client(message: impl Into<String>) -> Self {
        Self::InvalidClient {
            message: message.into(),
        }
    }
}

/// Opaque failure raised by a capability implementation.
///
/// Carries a human-readable message for logging only; nothing in it reaches
/// the wire.
#[derive(Debug, thiserror::Error)]
#[error("storage error: {message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    /// Creates a new storage error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
