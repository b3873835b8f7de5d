//! # keyward-auth
//!
//! Protocol core of the Keyward OAuth 2.0 / OpenID Connect authorization
//! server: the two endpoints that mint credentials.
//!
//! - The **authorization endpoint** ([`AuthorizationService`]) turns a
//!   resource-owner-approved request into an authorization code and a
//!   redirect URL.
//! - The **token endpoint** ([`TokenService`]) authenticates the client and
//!   exchanges grants for access tokens, refresh tokens, and ID tokens.
//!
//! ## Architecture
//!
//! Both services are pure coordinators. Every side effect - loading a
//! client, persisting an authorization, approving scopes, minting a token,
//! generating a code - flows through an injected capability trait, so the
//! protocol state machine is deterministic and testable against in-memory
//! fakes. The HTTP transport, session handling, login/consent UI, and all
//! persistence live outside this crate behind those traits.
//!
//! ## Error routing
//!
//! The authorization endpoint distinguishes errors the *resource owner*
//! must see ([`UntrustedClientError`], when the client or redirect URI
//! cannot be trusted) from errors the *client* receives as an error
//! redirect. The token endpoint returns RFC 6749 JSON error bodies;
//! `invalid_client` failures for header credentials carry the HTTP 401 /
//! `WWW-Authenticate: Basic` marker.
//!
//! ## Modules
//!
//! - [`oauth`] - authorization endpoint, client authentication, wire types
//! - [`token`] - token endpoint and the token issuing capability
//! - [`storage`] - capability traits for clients, codes, and users
//! - [`consent`] - resource owner approval capability
//! - [`scope`] - scope model and scope policy
//! - [`params`] - request parameter access
//! - [`types`] - client registrations and persisted grants
//! - [`config`] - endpoint configuration
//! - [`error`] - owner-facing and infrastructure error types

pub mod config;
pub mod consent;
pub mod error;
pub mod oauth;
pub mod params;
pub mod scope;
pub mod storage;
pub mod token;
pub mod types;

pub use config::EndpointConfig;
pub use consent::{ApprovalDecision, ScopeApproval};
pub use error::{StoreError, UntrustedClientError};
pub use oauth::authorize::{AuthorizationError, AuthorizationErrorCode, AuthorizationResponse};
pub use oauth::client_auth::{
    AuthenticatedClient, JWT_BEARER_ASSERTION_TYPE, authenticate_client, parse_basic_auth,
};
pub use oauth::code::{CodeGenerator, HexCodeGenerator};
pub use oauth::service::AuthorizationService;
pub use oauth::token::{AccessTokenResponse, TokenEndpointError, TokenError, TokenErrorCode};
pub use params::{ParamError, RequestParams};
pub use scope::{Scope, check_client_scope, check_requested_scope};
pub use storage::{AuthorizationStore, ClientStore, UserStore};
pub use token::issuer::{IssuedAccessToken, TokenIssuer};
pub use token::service::TokenService;
pub use types::{
    AccessGrant, Authorization, Client, ClientValidationError, GrantType, TokenEndpointAuthMethod,
};
