//! Common types, the card payload model, and errors shared across `card-cse` crates.

pub mod error;
pub mod protocol;

pub use error::CseError;
pub use protocol::{CardDetails, CardField, CardPayload, EncryptedCard, FieldFailure};
