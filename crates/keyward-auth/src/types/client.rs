//! OAuth 2.0 client registrations.
//!
//! A [`Client`] is the immutable snapshot of one registered application as
//! loaded from the client registry capability. The core only reads it;
//! registration management is out of scope.

use std::fmt;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

use crate::scope::Scope;

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types.
///
/// Defines the flows a client is allowed to use. `Implicit` is enumerated
/// because registrations may carry it, but neither endpoint currently
/// services it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow.
    AuthorizationCode,
    /// Implicit flow (recognized, not serviced).
    Implicit,
    /// Resource Owner Password Credentials flow.
    #[serde(rename = "password")]
    ResourceOwner,
    /// Client Credentials flow.
    ClientCredentials,
    /// Refresh Token flow.
    RefreshToken,
}

impl GrantType {
    /// Returns the OAuth 2.0 `grant_type` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Implicit => "implicit",
            Self::ResourceOwner => "password",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Parses a `grant_type` parameter value.
    ///
    /// Returns `None` for values outside the recognized set.
    #[must_use]
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "authorization_code" => Some(Self::AuthorizationCode),
            "implicit" => Some(Self::Implicit),
            "password" => Some(Self::ResourceOwner),
            "client_credentials" => Some(Self::ClientCredentials),
            "refresh_token" => Some(Self::RefreshToken),
            _ => None,
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Token Endpoint Authentication Method
// =============================================================================

/// Token endpoint authentication methods.
///
/// Defined in OpenID Connect Core Section 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEndpointAuthMethod {
    /// No client authentication (public clients).
    None,

    /// Client secret via HTTP Basic Auth.
    ClientSecretBasic,

    /// Client secret in the request body.
    ClientSecretPost,

    /// Client assertion JWT signed with the client secret (HMAC).
    ClientSecretJwt,

    /// Client assertion JWT signed with a registered private key.
    PrivateKeyJwt,
}

impl TokenEndpointAuthMethod {
    /// Returns the string representation of the auth method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ClientSecretBasic => "client_secret_basic",
            Self::ClientSecretPost => "client_secret_post",
            Self::ClientSecretJwt => "client_secret_jwt",
            Self::PrivateKeyJwt => "private_key_jwt",
        }
    }
}

impl fmt::Display for TokenEndpointAuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Client
// =============================================================================

/// One registered OAuth 2.0 client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub id: String,

    /// Shared secret, absent for public clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Grant types this client is allowed to use.
    pub authorized_grant_types: Vec<GrantType>,

    /// Registered redirect URIs, compared by exact match.
    /// The first entry is the default when the request omits one.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Scopes this client may ever be granted, in registration order.
    /// The upper bound for every grant issued to this client.
    #[serde(default)]
    pub allowed_scopes: Vec<Scope>,

    /// Access token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_ttl: Option<i64>,

    /// Refresh token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_ttl: Option<i64>,

    /// How this client authenticates at the token endpoint.
    pub token_endpoint_auth_method: TokenEndpointAuthMethod,

    /// Expected JWS algorithm for assertion authentication, when pinned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint_auth_alg: Option<Algorithm>,
}

impl Client {
    /// Validates the registration invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration is internally inconsistent.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }

        if self.authorized_grant_types.is_empty() {
            return Err(ClientValidationError::NoGrantTypes);
        }

        // A client without a secret cannot authenticate with one.
        if self.secret.is_none() && self.token_endpoint_auth_method != TokenEndpointAuthMethod::None
        {
            return Err(ClientValidationError::MissingSecret);
        }

        // Refresh tokens are only ever minted from a primary grant.
        if self.is_grant_type_allowed(GrantType::RefreshToken)
            && !self.is_grant_type_allowed(GrantType::AuthorizationCode)
            && !self.is_grant_type_allowed(GrantType::ResourceOwner)
        {
            return Err(ClientValidationError::RefreshWithoutPrimaryGrant);
        }

        if self.is_grant_type_allowed(GrantType::AuthorizationCode) && self.redirect_uris.is_empty()
        {
            return Err(ClientValidationError::NoRedirectUris);
        }

        if self.access_token_ttl.is_some_and(|ttl| ttl <= 0)
            || self.refresh_token_ttl.is_some_and(|ttl| ttl <= 0)
        {
            return Err(ClientValidationError::NonPositiveTtl);
        }

        Ok(())
    }

    /// Checks if the given redirect URI exactly matches a registered one.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }

    /// Returns the default redirect URI (the first registered one).
    #[must_use]
    pub fn default_redirect_uri(&self) -> Option<&str> {
        self.redirect_uris.first().map(String::as_str)
    }

    /// Checks if the given grant type is allowed for this client.
    #[must_use]
    pub fn is_grant_type_allowed(&self, grant_type: GrantType) -> bool {
        self.authorized_grant_types.contains(&grant_type)
    }

    /// Checks if the given scope is within this client's allowed set.
    #[must_use]
    pub fn is_scope_allowed(&self, scope: &Scope) -> bool {
        self.allowed_scopes.contains(scope)
    }

    /// Returns the access token lifetime in seconds.
    ///
    /// Defaults to 3600 (1 hour) if not specified.
    #[must_use]
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_ttl.unwrap_or(3600)
    }

    /// Returns the refresh token lifetime in seconds.
    ///
    /// Defaults to 2592000 (30 days) if not specified.
    #[must_use]
    pub fn refresh_token_ttl_secs(&self) -> i64 {
        self.refresh_token_ttl.unwrap_or(2_592_000)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Errors that can occur during client validation.
#[derive(Debug, thiserror::Error)]
pub enum ClientValidationError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty")]
    EmptyClientId,

    /// At least one grant type is required.
    #[error("At least one grant type is required")]
    NoGrantTypes,

    /// A client without a secret must use the `none` authentication method.
    #[error("A client without a secret must use the none authentication method")]
    MissingSecret,

    /// The refresh token grant requires the authorization code or password grant.
    #[error("The refresh token grant requires the authorization code or password grant")]
    RefreshWithoutPrimaryGrant,

    /// Authorization code flow requires redirect URIs.
    #[error("Authorization code flow requires redirect URIs")]
    NoRedirectUris,

    /// Token lifetimes must be positive.
    #[error("Token lifetimes must be positive")]
    NonPositiveTtl,
}
