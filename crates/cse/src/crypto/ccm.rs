//! AES-CCM (RFC 3610, NIST SP 800-38C) built directly on the AES block primitive.
//!
//! Parameters follow the RFC naming: the nonce is `15 - L` bytes, where `L` is
//! the width of the message-length field, and `M` is the tag length.
//!
//! ```text
//! B0   = flags || nonce || len(P)                       flags = Adata<<6 | (M-2)/2<<3 | (L-1)
//! T    = CBC-MAC_K(B0 || encode(A) || pad16(P))         encode(A) = be16(len(A)) || A, zero-padded
//! A_i  = (L-1) || nonce || be_L(i)
//! C    = (P xor E_K(A_1) || E_K(A_2) || ...) || (T xor E_K(A_0))[..M]
//! ```
//!
//! Only encryption lives here; opening the envelope is the backend's job.
//! Callers own nonce freshness: reusing a nonce under one key is undetectable
//! at this layer.

use super::block::{xor_in_place, Block, BlockCipher, BLOCK_LEN};
use super::cipher::CipherError;

/// Shortest nonce CCM allows (`L = 8`).
pub const MIN_NONCE_LEN: usize = 7;

/// Longest nonce CCM allows (`L = 2`).
pub const MAX_NONCE_LEN: usize = 13;

/// Associated data must fit the two-byte length encoding.
pub const MAX_ASSOCIATED_DATA_LEN: usize = 0xFEFF;

/// Authenticate and encrypt `plaintext`, returning `ciphertext || tag`.
///
/// `associated_data` is authenticated but not encrypted; pass an empty slice
/// when there is none.
///
/// # Errors
///
/// - [`CipherError::InvalidKeyLength`] unless `key` is an AES key size.
/// - [`CipherError::InvalidNonceLength`] unless `nonce` is 7..=13 bytes.
/// - [`CipherError::InvalidTagLength`] unless `tag_len` is even and in 4..=16.
/// - [`CipherError::MessageTooLong`] if `plaintext` overflows the `L`-byte length field.
/// - [`CipherError::AssociatedDataTooLong`] if `associated_data` exceeds
///   [`MAX_ASSOCIATED_DATA_LEN`].
pub fn encrypt(
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
    associated_data: &[u8],
    tag_len: usize,
) -> Result<Vec<u8>, CipherError> {
    check_params(nonce, plaintext.len(), associated_data.len(), tag_len)?;
    let cipher = BlockCipher::new(key)?;

    let mac = cbc_mac(&cipher, nonce, plaintext, associated_data, tag_len);

    let mut out = Vec::with_capacity(plaintext.len() + tag_len);
    for (i, chunk) in plaintext.chunks(BLOCK_LEN).enumerate() {
        let keystream = cipher.encrypt(&counter_block(nonce, i as u64 + 1));
        let start = out.len();
        out.extend_from_slice(chunk);
        xor_in_place(&mut out[start..], &keystream);
    }

    let s0 = cipher.encrypt(&counter_block(nonce, 0));
    out.extend(mac.iter().zip(s0.iter()).take(tag_len).map(|(t, s)| t ^ s));
    Ok(out)
}

/// Validate the tag length on its own, for callers that configure it ahead of time.
pub fn check_tag_len(tag_len: usize) -> Result<(), CipherError> {
    if !(4..=16).contains(&tag_len) || tag_len % 2 != 0 {
        return Err(CipherError::InvalidTagLength(tag_len));
    }
    Ok(())
}

fn check_params(
    nonce: &[u8],
    message_len: usize,
    associated_data_len: usize,
    tag_len: usize,
) -> Result<(), CipherError> {
    check_tag_len(tag_len)?;
    if !(MIN_NONCE_LEN..=MAX_NONCE_LEN).contains(&nonce.len()) {
        return Err(CipherError::InvalidNonceLength {
            expected: "7..=13",
            got: nonce.len(),
        });
    }

    let length_field = 15 - nonce.len();
    let max_message_len = if length_field >= 8 {
        u64::MAX
    } else {
        (1u64 << (8 * length_field)) - 1
    };
    if message_len as u64 > max_message_len {
        return Err(CipherError::MessageTooLong {
            len: message_len,
            max: max_message_len,
        });
    }

    if associated_data_len > MAX_ASSOCIATED_DATA_LEN {
        return Err(CipherError::AssociatedDataTooLong(associated_data_len));
    }
    Ok(())
}

/// Write `value` big-endian into the trailing `15 - nonce_len` bytes of `block`.
fn put_length_field(block: &mut Block, nonce_len: usize, value: u64) {
    let width = 15 - nonce_len;
    let bytes = value.to_be_bytes();
    block[BLOCK_LEN - width..].copy_from_slice(&bytes[bytes.len() - width..]);
}

/// The first CBC-MAC block, B0.
fn format_b0(nonce: &[u8], message_len: usize, has_associated_data: bool, tag_len: usize) -> Block {
    let length_field = 15 - nonce.len();
    let mut b0 = [0u8; BLOCK_LEN];
    b0[0] = (u8::from(has_associated_data) << 6)
        | ((((tag_len - 2) / 2) as u8) << 3)
        | ((length_field - 1) as u8);
    b0[1..=nonce.len()].copy_from_slice(nonce);
    put_length_field(&mut b0, nonce.len(), message_len as u64);
    b0
}

/// Counter block A_i.
fn counter_block(nonce: &[u8], counter: u64) -> Block {
    let mut a = [0u8; BLOCK_LEN];
    a[0] = (15 - nonce.len() - 1) as u8;
    a[1..=nonce.len()].copy_from_slice(nonce);
    put_length_field(&mut a, nonce.len(), counter);
    a
}

/// Feed one (possibly short) chunk into the MAC chain; short chunks are zero-padded.
fn absorb(cipher: &BlockCipher, state: &mut Block, chunk: &[u8]) {
    xor_in_place(state, chunk);
    *state = cipher.encrypt(state);
}

fn cbc_mac(
    cipher: &BlockCipher,
    nonce: &[u8],
    plaintext: &[u8],
    associated_data: &[u8],
    tag_len: usize,
) -> Block {
    let b0 = format_b0(nonce, plaintext.len(), !associated_data.is_empty(), tag_len);
    let mut state = cipher.encrypt(&b0);

    if !associated_data.is_empty() {
        let mut encoded = Vec::with_capacity(2 + associated_data.len());
        // Length checked against MAX_ASSOCIATED_DATA_LEN by the caller.
        encoded.extend_from_slice(&(associated_data.len() as u16).to_be_bytes());
        encoded.extend_from_slice(associated_data);
        for chunk in encoded.chunks(BLOCK_LEN) {
            absorb(cipher, &mut state, chunk);
        }
    }

    for chunk in plaintext.chunks(BLOCK_LEN) {
        absorb(cipher, &mut state, chunk);
    }
    state
}
