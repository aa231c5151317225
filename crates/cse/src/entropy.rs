//! Randomness for session keys, IVs/nonces and RSA padding.
//!
//! Everything random in an envelope is drawn through [`EntropySource`], so
//! tests can pin every byte of the output while production always reads the
//! OS CSPRNG.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

/// A source of cryptographically secure random bytes.
#[cfg_attr(test, mockall::automock)]
pub trait EntropySource: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    fn fill(&self, dest: &mut [u8]);
}

/// The operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}

/// Adapts an [`EntropySource`] to the `rand_core` traits the RSA padding code expects.
pub(crate) struct EntropyRng<'a>(pub(crate) &'a dyn EntropySource);

impl RngCore for EntropyRng<'_> {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.0.fill(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.0.fill(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.fill(dest);
        Ok(())
    }
}

// Only ever wraps a CSPRNG-backed source outside of tests.
impl CryptoRng for EntropyRng<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_entropy_fills_buffer() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        OsEntropy.fill(&mut a);
        OsEntropy.fill(&mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn adapter_forwards_to_source() {
        let mut mock = MockEntropySource::new();
        mock.expect_fill().returning(|dest: &mut [u8]| dest.fill(0xAB));
        let mut rng = EntropyRng(&mock);
        assert_eq!(rng.next_u32(), 0xABAB_ABAB);
        let mut buf = [0u8; 5];
        rng.fill_bytes(&mut buf);
        assert_eq!(buf, [0xAB; 5]);
    }
}
