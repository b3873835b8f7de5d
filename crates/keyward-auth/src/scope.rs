//! OAuth scope model and scope policy.
//!
//! Scopes travel on the wire as a space-delimited string. The set is
//! unordered for comparison purposes, but responses echo scopes in the
//! order they were requested, so scope lists are kept as `Vec<Scope>`
//! rather than hash sets.
//!
//! The `openid` scope is distinguished from custom scopes because its
//! presence switches on ID-token issuance.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::Client;

/// A single named scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The OpenID Connect marker scope (`openid`).
    OpenId,
    /// Any other scope name.
    Custom(String),
}

impl Scope {
    /// Parses one scope token.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        if token == "openid" {
            Self::OpenId
        } else {
            Self::Custom(token.to_string())
        }
    }

    /// Returns the wire representation of the scope.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::OpenId => "openid",
            Self::Custom(name) => name,
        }
    }

    /// Returns `true` for the `openid` marker scope.
    #[must_use]
    pub fn is_openid(&self) -> bool {
        matches!(self, Self::OpenId)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Scope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        Ok(Self::parse(&token))
    }
}

/// Splits a space-delimited scope string, preserving request order.
#[must_use]
pub fn parse_scope_list(wire: &str) -> Vec<Scope> {
    wire.split_whitespace().map(Scope::parse).collect()
}

/// Joins scopes back into their space-delimited wire form.
#[must_use]
pub fn join_scopes(scopes: &[Scope]) -> String {
    scopes
        .iter()
        .map(Scope::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns `true` if the list contains the `openid` marker.
#[must_use]
pub fn contains_openid(scopes: &[Scope]) -> bool {
    scopes.iter().any(Scope::is_openid)
}

/// A requested scope that the policy check refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Scope '{scope}' is not available")]
pub struct ForbiddenScope {
    /// The offending scope name.
    pub scope: String,
}

/// Resolves the scope of a new grant against the client registration.
///
/// With no requested scope the client's full allowed set is granted.
/// Otherwise every requested scope must appear in `client.allowed_scopes`;
/// the result preserves the request order.
///
/// # Errors
///
/// Returns [`ForbiddenScope`] naming the first scope outside the client's
/// allowed set.
pub fn check_client_scope(
    client: &Client,
    requested: Option<&[Scope]>,
) -> Result<Vec<Scope>, ForbiddenScope> {
    match requested {
        None => Ok(client.allowed_scopes.clone()),
        Some(requested) => narrow(requested, &client.allowed_scopes),
    }
}

/// Resolves a re-requested scope against a previously granted set.
///
/// Used by the refresh-token grant: the client may narrow the scope of the
/// original grant but never widen it.
///
/// # Errors
///
/// Returns [`ForbiddenScope`] naming the first scope outside the existing
/// grant.
pub fn check_requested_scope(
    existing: &[Scope],
    requested: Option<&[Scope]>,
) -> Result<Vec<Scope>, ForbiddenScope> {
    match requested {
        None => Ok(existing.to_vec()),
        Some(requested) => narrow(requested, existing),
    }
}

fn narrow(requested: &[Scope], bound: &[Scope]) -> Result<Vec<Scope>, ForbiddenScope> {
    for scope in requested {
        if !bound.contains(scope) {
            return Err(ForbiddenScope {
                scope: scope.as_str().to_string(),
            });
        }
    }
    Ok(requested.to_vec())
}
