//! Credential value object

/// An API key accepted by the agent service (Value Object)
///
/// Redacts its value in Debug output so keys cannot leak into logs or
/// error messages. The raw value is only reachable through [`expose`],
/// which transport adapters call when attaching auth material.
///
/// [`expose`]: Credential::expose
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap an API key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Access the raw key (only for auth headers)
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential([REDACTED])")
    }
}

impl From<String> for Credential {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for Credential {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}
