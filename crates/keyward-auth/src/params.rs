//! Request parameter access.
//!
//! Both endpoints receive their input as the raw key/value pairs of a query
//! string or `application/x-www-form-urlencoded` body. OAuth 2.0 forbids
//! repeating a parameter, so lookups distinguish absent, single-valued, and
//! repeated keys instead of silently taking the first value.

use std::collections::HashMap;

/// Errors produced by parameter lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    /// A required parameter is absent.
    #[error("Missing required parameter: {0}")]
    Missing(String),

    /// A parameter appears more than once.
    #[error("Repeated parameter: {0}")]
    Repeated(String),
}

/// The decoded parameters of one authorization or token request.
///
/// A multimap from parameter name to every value it was sent with. Lookups
/// are read-only, so calling [`require`](Self::require) or
/// [`maybe`](Self::maybe) twice for the same name yields the same result.
#[derive(Debug, Clone, Default)]
pub struct RequestParams(HashMap<String, Vec<String>>);

impl RequestParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a parameter set from decoded key/value pairs.
    ///
    /// Repeated keys are preserved as multiple values so that lookups can
    /// reject them.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in pairs {
            map.entry(name.into()).or_default().push(value.into());
        }
        Self(map)
    }

    /// Adds one value for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    /// Returns the single value of a required parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Missing`] if the parameter is absent or has no
    /// values, and [`ParamError::Repeated`] if it was sent more than once.
    pub fn require(&self, name: &str) -> Result<&str, ParamError> {
        match self.0.get(name).map(Vec::as_slice) {
            None | Some([]) => Err(ParamError::Missing(name.to_string())),
            Some([value]) => Ok(value),
            Some(_) => Err(ParamError::Repeated(name.to_string())),
        }
    }

    /// Returns the single value of an optional parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Repeated`] if the parameter was sent more than
    /// once. Absence is not an error.
    pub fn maybe(&self, name: &str) -> Result<Option<&str>, ParamError> {
        match self.0.get(name).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([value]) => Ok(Some(value)),
            Some(_) => Err(ParamError::Repeated(name.to_string())),
        }
    }
}
