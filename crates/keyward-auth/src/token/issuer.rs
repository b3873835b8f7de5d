//! Token issuing capability.
//!
//! Minting is a capability rather than part of the core: the signing keys,
//! token format (JWT or opaque), and refresh-token encoding all belong to
//! the implementation. The core only routes validated grant data in and
//! response fields out.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::StoreError;
use crate::scope::Scope;
use crate::types::{AccessGrant, Client, GrantType};

/// The product of one access-token mint.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    /// The opaque access token.
    pub access_token: String,

    /// A refresh token, when the issuer's policy grants one.
    pub refresh_token: Option<String>,

    /// Access token lifetime in seconds; echoed as `expires_in`.
    pub expires_in: u64,
}

/// Mints access and ID tokens and decodes refresh tokens.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Mints an access token for a validated grant.
    ///
    /// `subject` is absent for client-credentials grants.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be minted.
    async fn create_access_token(
        &self,
        subject: Option<&str>,
        client: &Client,
        grant_type: GrantType,
        scope: &[Scope],
        now: OffsetDateTime,
    ) -> Result<IssuedAccessToken, StoreError>;

    /// Mints an OpenID Connect ID token.
    ///
    /// `access_token` and `code` are handed through so implementations can
    /// add the `at_hash` / `c_hash` claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be minted.
    async fn create_id_token(
        &self,
        subject: &str,
        client: &Client,
        nonce: Option<&str>,
        now: OffsetDateTime,
        access_token: Option<&str>,
        code: Option<&str>,
    ) -> Result<String, StoreError>;

    /// Decodes a presented refresh token into the grant it carries.
    ///
    /// Returns `None` for tokens that do not decode or verify; the endpoint
    /// reports those as `invalid_grant` without further detail.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoding backend fails.
    async fn decode_refresh_token(
        &self,
        client: &Client,
        token: &str,
    ) -> Result<Option<AccessGrant>, StoreError>;
}
