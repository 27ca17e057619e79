//! Session identity.
//!
//! Cached repository documents are scoped to a session. The core never looks
//! inside a [`SessionKey`]; it only compares and hashes it.

use std::fmt;

/// Opaque identity of a user session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SessionKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Provides the key of the session the current request belongs to.
pub trait SessionIdentity: Send + Sync {
    fn current_session_key(&self) -> SessionKey;
}

/// A session identity that always reports the same key.
///
/// Used by the command-line front end, where one process is one session.
#[derive(Debug, Clone)]
pub struct StaticSessionIdentity {
    key: SessionKey,
}

impl StaticSessionIdentity {
    pub fn new(key: impl Into<SessionKey>) -> Self {
        Self { key: key.into() }
    }
}

impl SessionIdentity for StaticSessionIdentity {
    fn current_session_key(&self) -> SessionKey {
        self.key.clone()
    }
}
