//! Client-side encryption of payment-card fields.
//!
//! A [`Tokenizer`] turns card fields into envelopes that only the backend
//! holding the matching RSA private key can open:
//!
//! ```text
//! prefix SEP base64(RSA(session key)) SEP base64(iv || ciphertext [|| tag])
//! ```
//!
//! Each envelope uses a fresh session key. Content is sealed with AES-CCM
//! (default), AES-CBC or AES-CBC with an HMAC-SHA-512 tag, and the session
//! key is wrapped with RSAES-PKCS1-v1_5.

pub mod config;
pub mod crypto;
pub mod entropy;
pub mod envelope;
pub mod keys;
pub mod telemetry;
pub mod tokenizer;

pub use config::CseConfig;
pub use crypto::ContentMode;
pub use cse_common::{CardDetails, CardField, CardPayload, CseError, EncryptedCard, FieldFailure};
pub use entropy::{EntropySource, OsEntropy};
pub use envelope::{EnvelopeCodec, EnvelopeFormat};
pub use tokenizer::Tokenizer;
