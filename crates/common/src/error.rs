//! Common error types shared across crates.

use thiserror::Error;

use crate::protocol::CardField;

/// Top-level client-side encryption error.
///
/// Every variant carries a stable machine-readable code (see [`CseError::code`]):
/// - [`CseError::KeyFormat`] → `key_format`
/// - [`CseError::Encryption`] → `encryption_failed`
/// - [`CseError::Serialization`] → `serialization_failed`
/// - [`CseError::InvalidConfiguration`] → `invalid_configuration`
/// - [`CseError::InvalidField`] → `invalid_field`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CseError {
    /// The public key descriptor is malformed: wrong arity, non-hex digits, or an empty half.
    #[error("invalid public key format: {0}")]
    KeyFormat(String),

    /// Encapsulation or content encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The card payload could not be encoded or decoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// An envelope or cipher setting was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A field value is empty or not made of ASCII digits.
    #[error("invalid {0}: expected one or more ASCII digits")]
    InvalidField(CardField),
}

impl CseError {
    /// Returns the short code that identifies this error kind to callers.
    pub fn code(&self) -> &'static str {
        match self {
            CseError::KeyFormat(_) => "key_format",
            CseError::Encryption(_) => "encryption_failed",
            CseError::Serialization(_) => "serialization_failed",
            CseError::InvalidConfiguration(_) => "invalid_configuration",
            CseError::InvalidField(_) => "invalid_field",
        }
    }
}

impl From<serde_json::Error> for CseError {
    fn from(e: serde_json::Error) -> Self {
        CseError::Serialization(e.to_string())
    }
}
