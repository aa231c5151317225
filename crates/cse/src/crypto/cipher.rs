//! Per-envelope session keys and the two content-encryption strategies.
//!
//! Every call to [`SessionKey::generate`] draws a fresh key and IV from the
//! entropy source; a key is used for exactly one payload and then zeroized on
//! drop.
//!
//! Sealed content is always `iv || ciphertext [|| tag]`:
//! - [`ContentMode::Ccm`]: 12-byte nonce, ciphertext the length of the
//!   plaintext, followed by the configured tag.
//! - [`ContentMode::Cbc`]: 16-byte IV, PKCS#7-padded ciphertext.
//! - [`ContentMode::CbcHs512`]: 16-byte IV, PKCS#7-padded ciphertext, 32-byte
//!   HMAC-SHA-512 tag. The session key is 64 bytes.

use std::fmt;

use cse_common::CseError;
use serde::Deserialize;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{cbc, cbc_hmac, ccm};
use crate::entropy::EntropySource;

/// Byte length of an AES-256 session key.
pub const KEY_LEN: usize = 32;

/// Nonce length used for CCM content. Must match the decrypting backend.
pub const CCM_NONCE_LEN: usize = 12;

/// Default CCM tag length.
pub const DEFAULT_TAG_LEN: usize = 8;

/// Errors produced by the cipher layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("invalid AES key length: {0} bytes")]
    InvalidKeyLength(usize),

    #[error("invalid IV/nonce length: expected {expected} bytes, got {got}")]
    InvalidNonceLength { expected: &'static str, got: usize },

    #[error("invalid tag length: {0} bytes (must be even, 4..=16)")]
    InvalidTagLength(usize),

    #[error("message of {len} bytes exceeds the CCM length field (max {max})")]
    MessageTooLong { len: usize, max: u64 },

    #[error("associated data of {0} bytes exceeds the CCM length encoding")]
    AssociatedDataTooLong(usize),
}

impl From<CipherError> for CseError {
    fn from(e: CipherError) -> Self {
        CseError::Encryption(e.to_string())
    }
}

/// Content-encryption strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// AES-CCM built on the raw block cipher.
    #[default]
    Ccm,
    /// AES-CBC with PKCS#7 padding.
    Cbc,
    /// JWA `A256CBC-HS512`: AES-256-CBC authenticated with HMAC-SHA-512.
    #[serde(rename = "cbc-hs512")]
    CbcHs512,
}

impl ContentMode {
    /// Session key length this mode draws per session.
    pub fn key_len(self) -> usize {
        match self {
            ContentMode::Ccm | ContentMode::Cbc => KEY_LEN,
            ContentMode::CbcHs512 => cbc_hmac::KEY_LEN,
        }
    }

    /// IV/nonce length this mode draws per session.
    pub fn iv_len(self) -> usize {
        match self {
            ContentMode::Ccm => CCM_NONCE_LEN,
            ContentMode::Cbc | ContentMode::CbcHs512 => cbc::IV_LEN,
        }
    }
}

/// One-time symmetric key material: the content key and its IV/nonce.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    key: Vec<u8>,
    iv: Vec<u8>,
}

impl SessionKey {
    /// Draw a fresh key and an IV sized for `mode`.
    pub fn generate(mode: ContentMode, entropy: &dyn EntropySource) -> Self {
        let mut key = vec![0u8; mode.key_len()];
        entropy.fill(&mut key);
        let mut iv = vec![0u8; mode.iv_len()];
        entropy.fill(&mut iv);
        Self { key, iv }
    }

    /// Build a session key from known parts (known-answer tests, backends).
    pub fn from_parts(key: Vec<u8>, iv: Vec<u8>) -> Self {
        Self { key, iv }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key material never reaches logs.
        f.write_str("SessionKey([REDACTED])")
    }
}

/// Encrypts payloads under a [`SessionKey`] with the configured strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCipher {
    mode: ContentMode,
    tag_len: usize,
}

impl SessionCipher {
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidTagLength`] if `mode` is CCM and
    /// `tag_len` is not a valid CCM tag length. The CBC modes ignore `tag_len`.
    pub fn new(mode: ContentMode, tag_len: usize) -> Result<Self, CipherError> {
        if mode == ContentMode::Ccm {
            ccm::check_tag_len(tag_len)?;
        }
        Ok(Self { mode, tag_len })
    }

    pub fn mode(&self) -> ContentMode {
        self.mode
    }

    /// Tag bytes appended to the ciphertext (zero for CBC).
    pub fn tag_len(&self) -> usize {
        match self.mode {
            ContentMode::Ccm => self.tag_len,
            ContentMode::Cbc => 0,
            ContentMode::CbcHs512 => cbc_hmac::TAG_LEN,
        }
    }

    /// Encrypt `plaintext`, returning `iv || ciphertext [|| tag]`.
    ///
    /// # Errors
    ///
    /// Returns a [`CipherError`] if the session IV does not fit the mode or the
    /// plaintext exceeds the mode's limits.
    pub fn seal(&self, session: &SessionKey, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let body = match self.mode {
            ContentMode::Ccm => ccm::encrypt(session.key(), session.iv(), plaintext, &[], self.tag_len)?,
            ContentMode::Cbc => cbc::encrypt(session.key(), session.iv(), plaintext)?,
            ContentMode::CbcHs512 => cbc_hmac::encrypt(session.key(), session.iv(), plaintext, &[])?,
        };
        let mut sealed = Vec::with_capacity(session.iv().len() + body.len());
        sealed.extend_from_slice(session.iv());
        sealed.extend_from_slice(&body);
        Ok(sealed)
    }

    /// Length of [`SessionCipher::seal`] output for `plaintext_len` bytes of input.
    pub fn sealed_len(&self, plaintext_len: usize) -> usize {
        match self.mode {
            ContentMode::Ccm => CCM_NONCE_LEN + plaintext_len + self.tag_len,
            ContentMode::Cbc => cbc::IV_LEN + cbc::ciphertext_len(plaintext_len),
            ContentMode::CbcHs512 => {
                cbc::IV_LEN + cbc::ciphertext_len(plaintext_len) + cbc_hmac::TAG_LEN
            }
        }
    }
}

impl Default for SessionCipher {
    fn default() -> Self {
        Self {
            mode: ContentMode::Ccm,
            tag_len: DEFAULT_TAG_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::{MockEntropySource, OsEntropy};

    fn fixed_session(mode: ContentMode) -> SessionKey {
        let key = (0u8..mode.key_len() as u8).collect();
        let iv = match mode {
            ContentMode::Ccm => (0xa0u8..0xac).collect(),
            ContentMode::Cbc | ContentMode::CbcHs512 => (0x10u8..0x20).collect(),
        };
        SessionKey::from_parts(key, iv)
    }

    #[test]
    fn ccm_seal_prefixes_nonce() {
        let cipher = SessionCipher::new(ContentMode::Ccm, 8).unwrap();
        let session = fixed_session(ContentMode::Ccm);
        let sealed = cipher.seal(&session, b"").unwrap();
        assert_eq!(&sealed[..CCM_NONCE_LEN], session.iv());
        assert_eq!(hex::encode(&sealed[CCM_NONCE_LEN..]), "3eaffe8a91eaa186");
        assert_eq!(sealed.len(), cipher.sealed_len(0));
    }

    #[test]
    fn cbc_seal_prefixes_iv() {
        let cipher = SessionCipher::new(ContentMode::Cbc, 0).unwrap();
        let session = fixed_session(ContentMode::Cbc);
        let sealed = cipher.seal(&session, b"hello world").unwrap();
        assert_eq!(&sealed[..16], session.iv());
        assert_eq!(hex::encode(&sealed[16..]), "eddf7dbf09859850e23890f192a44f93");
        assert_eq!(sealed.len(), cipher.sealed_len(11));
        assert_eq!(cipher.tag_len(), 0);
    }

    #[test]
    fn cbc_hs512_seal_appends_tag() {
        let cipher = SessionCipher::new(ContentMode::CbcHs512, 0).unwrap();
        let session = fixed_session(ContentMode::CbcHs512);
        assert_eq!(session.key().len(), 64);
        let sealed = cipher.seal(&session, b"hello world").unwrap();
        assert_eq!(&sealed[..16], session.iv());
        assert_eq!(
            hex::encode(&sealed[16..]),
            "b28bb31f68c7f272b85e718abd94063d\
             e8518e636a07eb36af37eab838ff748dd37e7e5e30501472b3556ffb2e23f958"
        );
        assert_eq!(sealed.len(), cipher.sealed_len(11));
        assert_eq!(cipher.tag_len(), 32);
    }

    #[test]
    fn generate_sizes_key_for_mode() {
        let session = SessionKey::generate(ContentMode::CbcHs512, &OsEntropy);
        assert_eq!(session.key().len(), 64);
        assert_eq!(session.iv().len(), 16);
        let session = SessionKey::generate(ContentMode::Cbc, &OsEntropy);
        assert_eq!(session.key().len(), KEY_LEN);
    }

    #[test]
    fn mode_names_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: ContentMode,
        }
        let parse = |s: &str| {
            serde_json::from_str::<Wrapper>(&format!(r#"{{"mode":"{s}"}}"#)).map(|w| w.mode)
        };
        assert_eq!(parse("ccm").unwrap(), ContentMode::Ccm);
        assert_eq!(parse("cbc").unwrap(), ContentMode::Cbc);
        assert_eq!(parse("cbc-hs512").unwrap(), ContentMode::CbcHs512);
        assert!(parse("gcm").is_err());
    }

    #[test]
    fn ccm_rejects_bad_tag_len_up_front() {
        assert!(SessionCipher::new(ContentMode::Ccm, 7).is_err());
        assert!(SessionCipher::new(ContentMode::Cbc, 7).is_ok());
    }

    #[test]
    fn mismatched_iv_is_encryption_error() {
        let cipher = SessionCipher::new(ContentMode::Cbc, 0).unwrap();
        let session = fixed_session(ContentMode::Ccm);
        let err: CseError = cipher.seal(&session, b"x").unwrap_err().into();
        assert_eq!(err.code(), "encryption_failed");
    }

    #[test]
    fn generate_draws_key_then_iv() {
        let mut mock = MockEntropySource::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_fill()
            .withf(|dest| dest.len() == KEY_LEN)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|dest: &mut [u8]| dest.fill(0x01));
        mock.expect_fill()
            .withf(|dest| dest.len() == CCM_NONCE_LEN)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|dest: &mut [u8]| dest.fill(0x02));

        let session = SessionKey::generate(ContentMode::Ccm, &mock);
        assert_eq!(session.key(), &[0x01; KEY_LEN]);
        assert_eq!(session.iv(), &[0x02; CCM_NONCE_LEN]);
    }

    #[test]
    fn fresh_keys_differ() {
        let a = SessionKey::generate(ContentMode::Ccm, &OsEntropy);
        let b = SessionKey::generate(ContentMode::Ccm, &OsEntropy);
        assert_ne!(a.key(), b.key());
        assert_ne!(a.iv(), b.iv());
    }

    #[test]
    fn session_key_redacted_in_debug() {
        let session = fixed_session(ContentMode::Ccm);
        assert_eq!(format!("{session:?}"), "SessionKey([REDACTED])");
    }
}
