//! Symmetric content encryption for card payloads.
//!
//! This module is intentionally free of RSA and envelope concerns. It provides
//! the session-key generation and the two interchangeable content strategies
//! used by the tokenizer.
//!
//! # Layout
//!
//! - [`block`]: AES block primitive (key-size dispatch, single-block ECB).
//! - [`ccm`]: AES-CCM constructed from the block primitive, behind
//!   `encrypt(key, nonce, plaintext, associated_data, tag_len)`.
//! - [`cbc`]: AES-CBC with PKCS#7 padding.
//! - [`cbc_hmac`]: AES-256-CBC with an HMAC-SHA-512 tag (`A256CBC-HS512`).
//! - [`cipher`]: [`SessionKey`] and [`SessionCipher`], which pick a strategy
//!   and emit `iv || ciphertext [|| tag]`.

pub mod block;
pub mod cbc;
pub mod cbc_hmac;
pub mod ccm;
pub mod cipher;

pub use cipher::{CipherError, ContentMode, SessionCipher, SessionKey, KEY_LEN};
