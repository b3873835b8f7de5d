//! Persisted grant records.
//!
//! [`Authorization`] is the record written when the authorization endpoint
//! issues a code and read back (exactly once) when the token endpoint
//! exchanges it. [`AccessGrant`] is the payload a refresh token decodes to.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::scope::Scope;
use crate::types::GrantType;

/// The record behind one authorization code.
///
/// Created on a successful `response_type=code` request; consumed by the
/// token endpoint. Stores should delete it on first lookup so a code can
/// never be exchanged twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authorization {
    /// The resource owner who approved the request.
    pub subject: String,

    /// The client the code was issued to.
    pub client_id: String,

    /// When the code was issued.
    #[serde(with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,

    /// The granted scopes (may be empty).
    #[serde(default)]
    pub scope: Vec<Scope>,

    /// OpenID Connect nonce from the authorization request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// The redirect_uri parameter exactly as supplied on the authorization
    /// request, absent when the request relied on the registered default.
    /// The token request must echo it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

impl Authorization {
    /// Returns the age of the code in whole seconds at `now`.
    #[must_use]
    pub fn age_seconds(&self, now: OffsetDateTime) -> i64 {
        (now - self.issued_at).whole_seconds()
    }
}

/// The grant embedded in a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGrant {
    /// The resource owner, absent for client-credentials grants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// The client the refresh token was issued to.
    pub client_id: String,

    /// The grant type that originally produced the token.
    pub grant_type: GrantType,

    /// The scopes of the original grant.
    #[serde(default)]
    pub scope: Vec<Scope>,

    /// When the refresh token stops being exchangeable.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl AccessGrant {
    /// Returns `true` once the grant's expiry lies strictly in the past.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at < now
    }
}
