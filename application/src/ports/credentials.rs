//! Credential ports
//!
//! How the system reads the API key to attach to requests, and how the
//! composition root stores the key a successful login produced.
//!
//! Transport adapters hold a [`CredentialsProvider`] and call
//! [`current`](CredentialsProvider::current) when they build a request or
//! open a connection, never earlier. Write access stays behind
//! [`CredentialStore`], which only the composition root and the login flow
//! hold.

use std::sync::RwLock;

use desk_domain::Credential;

/// Read side: the credential to use for the next call, if any.
pub trait CredentialsProvider: Send + Sync {
    /// The currently stored credential.
    ///
    /// Must reflect updates immediately; callers read this at call time and
    /// never cache the result across operations.
    fn current(&self) -> Option<Credential>;
}

/// Write side: replace the stored credential after a successful login.
pub trait CredentialStore: CredentialsProvider {
    /// Store a credential, overwriting any previous one.
    fn store(&self, credential: Credential);
}

/// Process-wide in-memory credential store.
///
/// Starts empty. A re-login overwrites the previous key. Nothing is ever
/// written to disk; a new process starts logged out.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    current: RwLock<Option<Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialsProvider for InMemoryCredentialStore {
    fn current(&self) -> Option<Credential> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn store(&self, credential: Credential) {
        let mut slot = self.current.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(credential);
    }
}

/// Fixed credential source.
///
/// Used when the key comes from a flag or the environment rather than a
/// login flow, and as a test double.
#[derive(Debug, Clone)]
pub struct StaticCredentials(Option<Credential>);

impl StaticCredentials {
    pub fn new(credential: Option<Credential>) -> Self {
        Self(credential)
    }

    pub fn of(key: impl Into<Credential>) -> Self {
        Self(Some(key.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl CredentialsProvider for StaticCredentials {
    fn current(&self) -> Option<Credential> {
        self.0.clone()
    }
}
