//! Shared, lock-free envelope configuration.
//!
//! [`EnvelopeCodec`] holds an [`EnvelopeFormat`] behind [`ArcSwap`]: encodes
//! read a snapshot without blocking and setters atomically replace the whole
//! format. An envelope already produced is never affected by a later setter.

use std::sync::Arc;

use arc_swap::ArcSwap;
use cse_common::CseError;
use tracing::debug;

use super::format::{validate_separator, EnvelopeFormat};

/// Encodes envelopes with a format that may be replaced at runtime.
///
/// Clones share the same format cell.
#[derive(Clone, Debug)]
pub struct EnvelopeCodec {
    format: Arc<ArcSwap<EnvelopeFormat>>,
}

impl EnvelopeCodec {
    pub fn new(format: EnvelopeFormat) -> Self {
        Self {
            format: Arc::new(ArcSwap::from_pointee(format)),
        }
    }

    /// A snapshot of the active format.
    pub fn format(&self) -> Arc<EnvelopeFormat> {
        self.format.load_full()
    }

    /// Replace prefix and separator together.
    pub fn set_format(&self, format: EnvelopeFormat) {
        debug!(
            prefix_len = format.prefix().len(),
            separator = format.separator(),
            "envelope format replaced"
        );
        self.format.store(Arc::new(format));
    }

    /// Replace the prefix, keeping the active separator.
    pub fn set_prefix(&self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        debug!(prefix_len = prefix.len(), "envelope prefix replaced");
        self.format.rcu(|current| current.with_prefix(prefix.as_str()));
    }

    /// Replace the separator, keeping the active prefix.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::InvalidConfiguration`] if the separator is empty or
    /// overlaps the base64 alphabet; the active format is left unchanged.
    pub fn set_separator(&self, separator: impl Into<String>) -> Result<(), CseError> {
        let separator = separator.into();
        validate_separator(&separator)?;
        debug!(separator = separator.as_str(), "envelope separator replaced");
        self.format
            .rcu(|current| current.with_validated_separator(separator.as_str()));
        Ok(())
    }

    /// Encode with a single snapshot of the active format.
    pub fn encode(&self, encapsulated_key: &[u8], sealed_content: &[u8]) -> String {
        self.format.load().encode(encapsulated_key, sealed_content)
    }
}

impl Default for EnvelopeCodec {
    fn default() -> Self {
        Self::new(EnvelopeFormat::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_affect_only_later_encodes() {
        let codec = EnvelopeCodec::default();
        let before = codec.encode(b"k", b"c");

        codec.set_prefix("p1");
        let after_prefix = codec.encode(b"k", b"c");
        codec.set_separator("#").unwrap();
        let after_separator = codec.encode(b"k", b"c");

        assert_eq!(before, "$aw==$Yw==");
        assert_eq!(after_prefix, "p1$aw==$Yw==");
        assert_eq!(after_separator, "p1#aw==#Yw==");
    }

    #[test]
    fn rejected_separator_leaves_format_unchanged() {
        let codec = EnvelopeCodec::default();
        codec.set_prefix("p");
        assert!(codec.set_separator("ab").is_err());
        assert!(codec.set_separator("").is_err());
        assert_eq!(*codec.format(), EnvelopeFormat::new("p", "$").unwrap());
    }

    #[test]
    fn snapshot_is_not_affected_by_later_set() {
        let codec = EnvelopeCodec::default();
        let snapshot = codec.format();
        codec.set_format(EnvelopeFormat::new("x", "::").unwrap());
        assert_eq!(snapshot.prefix(), "");
        assert_eq!(codec.format().separator(), "::");
    }

    #[test]
    fn clones_share_format() {
        let codec = EnvelopeCodec::default();
        let clone = codec.clone();
        clone.set_prefix("shared");
        assert_eq!(codec.format().prefix(), "shared");
    }

    #[test]
    fn concurrent_setters_never_tear_an_envelope() {
        let codec = EnvelopeCodec::default();
        let writer = codec.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..200 {
                if i % 2 == 0 {
                    writer.set_format(EnvelopeFormat::new("a", "#").unwrap());
                } else {
                    writer.set_format(EnvelopeFormat::new("b", "$").unwrap());
                }
            }
        });
        for _ in 0..200 {
            let envelope = codec.encode(b"k", b"c");
            assert!(
                envelope == "$aw==$Yw=="
                    || envelope == "a#aw==#Yw=="
                    || envelope == "b$aw==$Yw==",
                "torn envelope {envelope}"
            );
        }
        handle.join().unwrap();
    }
}
