//! Raw AES block primitive shared by the CBC and CCM constructions.

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};

use super::cipher::CipherError;

/// AES block length in bytes, independent of key size.
pub const BLOCK_LEN: usize = 16;

pub type Block = [u8; BLOCK_LEN];

/// An AES key schedule for any of the three standard key sizes.
pub enum BlockCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl BlockCipher {
    /// Expand `key` into a block cipher.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] unless `key` is 16, 24 or 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        let cipher = match key.len() {
            16 => BlockCipher::Aes128(Aes128::new(GenericArray::from_slice(key))),
            24 => BlockCipher::Aes192(Aes192::new(GenericArray::from_slice(key))),
            32 => BlockCipher::Aes256(Aes256::new(GenericArray::from_slice(key))),
            other => return Err(CipherError::InvalidKeyLength(other)),
        };
        Ok(cipher)
    }

    /// Encrypt one block (ECB, no chaining).
    pub fn encrypt(&self, block: &Block) -> Block {
        let mut out = *block;
        let target = GenericArray::from_mut_slice(&mut out);
        match self {
            BlockCipher::Aes128(c) => c.encrypt_block(target),
            BlockCipher::Aes192(c) => c.encrypt_block(target),
            BlockCipher::Aes256(c) => c.encrypt_block(target),
        }
        out
    }
}

/// XOR `src` into the leading bytes of `dst`.
pub fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    dst.iter_mut().zip(src).for_each(|(d, s)| *d ^= s);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_key_length() {
        assert!(matches!(
            BlockCipher::new(&[0u8; 20]),
            Err(CipherError::InvalidKeyLength(20))
        ));
    }

    #[test]
    fn fips197_aes256_vector() {
        // FIPS-197 appendix C.3.
        let key: Vec<u8> = (0u8..32).collect();
        let plaintext: Block = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ];
        let cipher = BlockCipher::new(&key).unwrap();
        assert_eq!(
            cipher.encrypt(&plaintext).to_vec(),
            hex::decode("8ea2b7ca516745bfeafc49904b496089").unwrap()
        );
    }

    #[test]
    fn xor_stops_at_shorter_input() {
        let mut dst = [0xffu8; 4];
        xor_in_place(&mut dst, &[0x0f, 0xf0]);
        assert_eq!(dst, [0xf0, 0x0f, 0xff, 0xff]);
    }
}
