//! Authorization code store capability.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::Authorization;

/// Persistence for authorization-code records.
///
/// Codes are single-use: [`take`](Self::take) must atomically remove the
/// record it returns, so a second presentation of the same code yields
/// `None` even under concurrent exchange attempts.
#[async_trait]
pub trait AuthorizationStore: Send + Sync {
    /// Persists the record behind a freshly issued code.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored.
    async fn create(&self, code: &str, authorization: &Authorization) -> Result<(), StoreError>;

    /// Looks up and consumes the record for `code`.
    ///
    /// Returns `None` if the code is unknown or was already consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    async fn take(&self, code: &str) -> Result<Option<Authorization>, StoreError>;
}
