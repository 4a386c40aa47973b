//! Secret token wrapper for remote source credentials.
//!
//! `SecretToken` holds an API token that must never appear in logs, error
//! messages or serialized output. `Display`, `Debug` and `Serialize` all
//! produce [`MASK`]; the wrapped string is only reachable through
//! [`SecretToken::expose_secret`].

use serde::{Serialize, Serializer};

/// Marker printed in place of a secret value.
pub const MASK: &str = "**********";

#[derive(Clone, PartialEq, Eq)]
pub struct SecretToken(String);

impl SecretToken {
    /// Wrap a raw token.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw token. Callers take responsibility for not leaking it.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Check if the wrapped token is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SecretToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(MASK)
    }
}

impl std::fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(MASK)
    }
}

impl Serialize for SecretToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(MASK)
    }
}
