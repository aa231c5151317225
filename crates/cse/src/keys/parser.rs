//! [`PublicKeyMaterial`]: parsing of `"<exponent-hex>|<modulus-hex>"` descriptors.

use std::str::FromStr;

use cse_common::CseError;

/// Separator between the exponent and modulus halves of a descriptor.
pub const DESCRIPTOR_SEPARATOR: char = '|';

/// An RSA public exponent and modulus as big-endian bytes.
///
/// Byte lengths follow the supplied hex exactly; an odd-length half is read
/// as if it carried one leading `0` nibble, which leaves its value unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyMaterial {
    exponent: Vec<u8>,
    modulus: Vec<u8>,
}

impl PublicKeyMaterial {
    /// Parse a `"<exponent-hex>|<modulus-hex>"` descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::KeyFormat`] if the descriptor does not split into
    /// exactly two halves, or if either half is empty or contains a non-hex
    /// character.
    pub fn parse(descriptor: &str) -> Result<Self, CseError> {
        let mut halves = descriptor.split(DESCRIPTOR_SEPARATOR);
        let (Some(exponent), Some(modulus), None) = (halves.next(), halves.next(), halves.next())
        else {
            return Err(CseError::KeyFormat(format!(
                "expected '<exponent-hex>{DESCRIPTOR_SEPARATOR}<modulus-hex>'"
            )));
        };

        Ok(Self {
            exponent: decode_half("exponent", exponent)?,
            modulus: decode_half("modulus", modulus)?,
        })
    }

    pub fn exponent(&self) -> &[u8] {
        &self.exponent
    }

    pub fn modulus(&self) -> &[u8] {
        &self.modulus
    }
}

impl FromStr for PublicKeyMaterial {
    type Err = CseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn decode_half(name: &str, half: &str) -> Result<Vec<u8>, CseError> {
    if half.is_empty() {
        return Err(CseError::KeyFormat(format!("{name} is empty")));
    }
    let decoded = if half.len() % 2 == 1 {
        hex::decode(format!("0{half}"))
    } else {
        hex::decode(half)
    };
    decoded.map_err(|e| CseError::KeyFormat(format!("{name} is not valid hex: {e}")))
}
