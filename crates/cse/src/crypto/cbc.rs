//! AES-CBC with PKCS#7 padding.
//!
//! Padding always adds between 1 and 16 bytes, so a block-aligned plaintext
//! grows by one full block.

use super::block::{xor_in_place, Block, BlockCipher, BLOCK_LEN};
use super::cipher::CipherError;

/// CBC initialisation vectors are exactly one block.
pub const IV_LEN: usize = BLOCK_LEN;

/// Encrypt `plaintext` under `key` chained from `iv`.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] for a non-AES key size and
/// [`CipherError::InvalidNonceLength`] unless `iv` is [`IV_LEN`] bytes.
pub fn encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = BlockCipher::new(key)?;
    let mut chain: Block = iv.try_into().map_err(|_| CipherError::InvalidNonceLength {
        expected: "16",
        got: iv.len(),
    })?;

    let pad = BLOCK_LEN - plaintext.len() % BLOCK_LEN;
    let mut padded = Vec::with_capacity(plaintext.len() + pad);
    padded.extend_from_slice(plaintext);
    padded.resize(plaintext.len() + pad, pad as u8);

    let mut out = Vec::with_capacity(padded.len());
    for chunk in padded.chunks_exact(BLOCK_LEN) {
        xor_in_place(&mut chain, chunk);
        chain = cipher.encrypt(&chain);
        out.extend_from_slice(&chain);
    }
    Ok(out)
}

/// Ciphertext length for a plaintext of `plaintext_len` bytes.
pub fn ciphertext_len(plaintext_len: usize) -> usize {
    (plaintext_len / BLOCK_LEN + 1) * BLOCK_LEN
}
