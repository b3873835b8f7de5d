//! OAuth 2.0 protocol surface.
//!
//! The authorization endpoint is implemented across [`authorize`] (wire
//! types and redirect URL builders) and [`service`] (the request
//! processor). The token endpoint's wire types live in [`token`]; its
//! processor is [`crate::token::service`]. Client authentication for the
//! token endpoint is split into [`client_auth`] (credential sources) and
//! [`client_assertion`] (JWT bearer assertions).

pub mod authorize;
pub mod client_assertion;
pub mod client_auth;
pub mod code;
pub mod service;
pub mod token;

pub use authorize::{
    AuthorizationError, AuthorizationErrorCode, AuthorizationResponse,
};
pub use client_auth::{AuthenticatedClient, JWT_BEARER_ASSERTION_TYPE, authenticate_client};
pub use code::{CodeGenerator, HexCodeGenerator};
pub use service::AuthorizationService;
pub use token::{AccessTokenResponse, TokenEndpointError, TokenError, TokenErrorCode};
