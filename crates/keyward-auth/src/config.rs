//! Endpoint configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration shared by the two protocol endpoints.
///
/// # Example (TOML)
///
/// ```toml
/// [endpoints]
/// code_lifetime = "300s"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Authorization code lifetime. The age check at the token endpoint is
    /// inclusive: a code exactly this old is still accepted.
    #[serde(with = "humantime_serde")]
    pub code_lifetime: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            code_lifetime: Duration::from_secs(300),
        }
    }
}

impl EndpointConfig {
    /// Sets the authorization code lifetime.
    #[must_use]
    pub fn with_code_lifetime(mut self, lifetime: Duration) -> Self {
        self.code_lifetime = lifetime;
        self
    }

    /// The code lifetime in whole seconds.
    #[must_use]
    pub fn code_lifetime_secs(&self) -> i64 {
        self.code_lifetime.as_secs() as i64
    }
}
