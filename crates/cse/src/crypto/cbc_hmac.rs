//! AES-256-CBC + HMAC-SHA-512 (JWA `A256CBC-HS512`, RFC 7518 §5.2.5).
//!
//! The 64-byte key splits into `MAC_KEY = key[..32]` and `ENC_KEY = key[32..]`:
//!
//! ```text
//! E = AES-256-CBC-PKCS7(ENC_KEY, iv, P)
//! T = HMAC-SHA-512(MAC_KEY, A || iv || E || be64(bitlen(A)))[..32]
//! ```
//!
//! Output is `E || T`.

use hmac::{Hmac, Mac};
use sha2::Sha512;

use super::cbc;
use super::cipher::CipherError;

type HmacSha512 = Hmac<Sha512>;

/// Combined MAC and encryption key length.
pub const KEY_LEN: usize = 64;

/// Truncated HMAC-SHA-512 tag length.
pub const TAG_LEN: usize = 32;

/// Encrypt `plaintext` and authenticate it together with `associated_data`.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] unless `key` is [`KEY_LEN`] bytes
/// and [`CipherError::InvalidNonceLength`] unless `iv` is one AES block.
pub fn encrypt(
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength(key.len()));
    }
    let (mac_key, enc_key) = key.split_at(KEY_LEN / 2);

    let mut out = cbc::encrypt(enc_key, iv, plaintext)?;

    let mut mac =
        HmacSha512::new_from_slice(mac_key).map_err(|_| CipherError::InvalidKeyLength(key.len()))?;
    mac.update(associated_data);
    mac.update(iv);
    mac.update(&out);
    mac.update(&(associated_data.len() as u64 * 8).to_be_bytes());
    let tag = mac.finalize().into_bytes();

    out.extend_from_slice(&tag[..TAG_LEN]);
    Ok(out)
}
