//! Token endpoint service and the token issuing capability.
//!
//! - [`issuer`] - the [`TokenIssuer`](issuer::TokenIssuer) capability that
//!   mints access/ID tokens and decodes refresh tokens
//! - [`service`] - the [`TokenService`](service::TokenService) processor
//!   driving client authentication, grant dispatch, and response assembly

pub mod issuer;
pub mod service;

pub use issuer::{IssuedAccessToken, TokenIssuer};
pub use service::TokenService;
