//! [`RsaEncapsulator`]: wraps session keys under the backend's RSA public key.
//!
//! Padding is PKCS#1 v1.5 (RSAES-PKCS1-v1_5). The decrypting backend expects
//! exactly this scheme; it is not a tunable.

use cse_common::CseError;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Encrypt, RsaPublicKey};
use tracing::debug;

use super::parser::PublicKeyMaterial;
use crate::entropy::{EntropyRng, EntropySource};

/// Minimum padding bytes PKCS#1 v1.5 adds around a message.
pub const PKCS1_V15_OVERHEAD: usize = 11;

/// Encrypts session keys with one RSA public key.
#[derive(Debug, Clone)]
pub struct RsaEncapsulator {
    key: RsaPublicKey,
}

impl RsaEncapsulator {
    /// Build the RSA public key from parsed material.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::Encryption`] if the exponent or modulus is
    /// structurally unusable (exponent below 2, modulus above 4096 bits, ...).
    pub fn new(material: &PublicKeyMaterial) -> Result<Self, CseError> {
        let n = BigUint::from_bytes_be(material.modulus());
        let e = BigUint::from_bytes_be(material.exponent());
        let key = RsaPublicKey::new(n, e)
            .map_err(|e| CseError::Encryption(format!("invalid RSA public key: {e}")))?;
        debug!(modulus_bits = key.n().bits(), "RSA public key loaded");
        Ok(Self { key })
    }

    /// Byte length of the modulus, and of every encapsulated key.
    pub fn modulus_len(&self) -> usize {
        self.key.size()
    }

    /// Largest session key this modulus can wrap.
    pub fn max_payload_len(&self) -> usize {
        self.modulus_len().saturating_sub(PKCS1_V15_OVERHEAD)
    }

    /// Encrypt `session_key`, returning exactly [`RsaEncapsulator::modulus_len`] bytes.
    ///
    /// Padding bytes are drawn from `entropy`.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::Encryption`] if the padded key does not fit the
    /// modulus or the RSA operation fails.
    pub fn encapsulate(
        &self,
        session_key: &[u8],
        entropy: &dyn EntropySource,
    ) -> Result<Vec<u8>, CseError> {
        if session_key.len() > self.max_payload_len() {
            return Err(CseError::Encryption(format!(
                "{} byte key plus {PKCS1_V15_OVERHEAD} bytes of padding exceeds the {} byte modulus",
                session_key.len(),
                self.modulus_len()
            )));
        }
        let mut rng = EntropyRng(entropy);
        self.key
            .encrypt(&mut rng, Pkcs1v15Encrypt, session_key)
            .map_err(|e| CseError::Encryption(format!("RSA encryption failed: {e}")))
    }
}
