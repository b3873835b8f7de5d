//! Client registry capability.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::Client;

/// Read access to the client registry.
///
/// The registry is read-only for the core; a loaded [`Client`] is an
/// immutable snapshot valid for the duration of one request.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Finds a client by its OAuth client_id.
    ///
    /// Returns `None` if no such client is registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    async fn find_by_client_id(&self, client_id: &str) -> Result<Option<Client>, StoreError>;
}
