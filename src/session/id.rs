//! Session identifier type.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionStoreError};

/// Number of random bytes behind every generated identifier.
pub const ID_BYTES: usize = 20;

/// Length of a generated identifier once encoded.
pub const ID_LEN: usize = 27;

/// Opaque, unguessable identifier for a session record.
///
/// Generated identifiers carry 160 bits from the operating system RNG and
/// are rendered as URL-safe base64 without padding, so they can travel in
/// cookies and URLs untouched. Identifiers supplied by clients are only
/// checked against the same alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh identifier.
    ///
    /// A failing random source is reported as
    /// [`SessionStoreError::Randomness`]; there is no weaker fallback.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; ID_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| SessionStoreError::Randomness(e.to_string()))?;
        Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Validate a client-supplied identifier.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if is_url_safe(&value) {
            Ok(Self(value))
        } else {
            Err(SessionStoreError::InvalidSessionId(value))
        }
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the identifier text.
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Whether `value` is non-empty and drawn only from the URL-safe base64 alphabet.
pub fn is_url_safe(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = SessionStoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = SessionStoreError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}
