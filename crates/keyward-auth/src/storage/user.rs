//! Resource owner authentication capability.

use async_trait::async_trait;

use crate::error::StoreError;

/// Verifies resource owner credentials for the password grant.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Authenticates a resource owner.
    ///
    /// Returns the stable subject identifier on success and `None` when the
    /// credentials do not match.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory lookup fails.
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<String>, StoreError>;
}
