//! Public-key handling: descriptor parsing and session-key encapsulation.
//!
//! # Security invariants
//!
//! - Parsing is pure: no key is fetched, cached, or persisted.
//! - Exponent and modulus bytes are taken verbatim from the descriptor; a key
//!   that does not fit is rejected, never truncated or padded.

pub mod encapsulator;
pub mod parser;

#[cfg(test)]
pub(crate) mod fixtures;

pub use encapsulator::RsaEncapsulator;
pub use parser::PublicKeyMaterial;
