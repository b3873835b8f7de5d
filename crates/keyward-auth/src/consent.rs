//! Resource owner approval capability.
//!
//! The authorization endpoint never decides on its own what a user agreed
//! to; it hands the requested scopes to this capability and works with
//! whatever comes back. The login/consent UI that produces the decision is
//! out of scope.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::StoreError;
use crate::scope::Scope;
use crate::types::Client;

/// The resource owner's decision for one authorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalDecision {
    /// The user approved, possibly narrowing the requested scopes.
    /// The granted set must stay within the client's allowed scopes.
    Granted(Vec<Scope>),

    /// The user refused the request.
    Denied,
}

/// Obtains the resource owner's approval for a set of requested scopes.
#[async_trait]
pub trait ScopeApproval: Send + Sync {
    /// Asks the resource owner to approve `requested` for `client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the decision cannot be obtained; the endpoint
    /// reports that as a `server_error` redirect.
    async fn approve(
        &self,
        subject: &str,
        client: &Client,
        requested: &[Scope],
        now: OffsetDateTime,
    ) -> Result<ApprovalDecision, StoreError>;
}
