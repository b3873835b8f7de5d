//! Domain types: client registrations and persisted grants.

pub mod authorization;
pub mod client;

pub use authorization::{AccessGrant, Authorization};
pub use client::{Client, ClientValidationError, GrantType, TokenEndpointAuthMethod};
