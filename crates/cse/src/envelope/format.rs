//! The envelope wire format: `prefix ++ sep ++ b64(key) ++ sep ++ b64(content)`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cse_common::CseError;

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: &str = "$";

/// Prefix and separator applied to every envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeFormat {
    prefix: String,
    separator: String,
}

/// The two raw segments recovered from an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeParts {
    /// RSA-encrypted session key.
    pub encapsulated_key: Vec<u8>,
    /// `iv || ciphertext [|| tag]`.
    pub sealed_content: Vec<u8>,
}

impl EnvelopeFormat {
    /// # Errors
    ///
    /// Returns [`CseError::InvalidConfiguration`] if `separator` is rejected by
    /// [`validate_separator`].
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Result<Self, CseError> {
        let separator = separator.into();
        validate_separator(&separator)?;
        Ok(Self {
            prefix: prefix.into(),
            separator,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Same separator, different prefix.
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: self.separator.clone(),
        }
    }

    /// Same prefix, different separator. `separator` must already have passed
    /// [`validate_separator`].
    pub(crate) fn with_validated_separator(&self, separator: &str) -> Self {
        Self {
            prefix: self.prefix.clone(),
            separator: separator.to_owned(),
        }
    }

    /// Assemble an envelope from the encapsulated key and sealed content.
    pub fn encode(&self, encapsulated_key: &[u8], sealed_content: &[u8]) -> String {
        let key_b64 = STANDARD.encode(encapsulated_key);
        let content_b64 = STANDARD.encode(sealed_content);
        let mut out = String::with_capacity(
            self.prefix.len() + 2 * self.separator.len() + key_b64.len() + content_b64.len(),
        );
        out.push_str(&self.prefix);
        out.push_str(&self.separator);
        out.push_str(&key_b64);
        out.push_str(&self.separator);
        out.push_str(&content_b64);
        out
    }

    /// Parse an envelope produced with this format back into its raw segments.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::Serialization`] if the prefix or separators are
    /// missing, there are not exactly two segments, or a segment is not valid
    /// base64.
    pub fn split(&self, envelope: &str) -> Result<EnvelopeParts, CseError> {
        let body = envelope
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix(self.separator.as_str()))
            .ok_or_else(|| {
                CseError::Serialization("envelope does not start with prefix and separator".into())
            })?;

        let mut segments = body.split(self.separator.as_str());
        let (Some(key), Some(content), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(CseError::Serialization(
                "envelope must contain exactly two segments".into(),
            ));
        };

        Ok(EnvelopeParts {
            encapsulated_key: decode_segment("key", key)?,
            sealed_content: decode_segment("content", content)?,
        })
    }
}

impl Default for EnvelopeFormat {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            separator: DEFAULT_SEPARATOR.to_owned(),
        }
    }
}

/// Check that `separator` can delimit base64 segments unambiguously.
///
/// # Errors
///
/// Returns [`CseError::InvalidConfiguration`] if the separator is empty or
/// contains a character of the standard base64 alphabet (including `=`).
pub fn validate_separator(separator: &str) -> Result<(), CseError> {
    if separator.is_empty() {
        return Err(CseError::InvalidConfiguration(
            "envelope separator must not be empty".into(),
        ));
    }
    if separator.chars().any(is_base64_char) {
        return Err(CseError::InvalidConfiguration(format!(
            "envelope separator {separator:?} overlaps the base64 alphabet"
        )));
    }
    Ok(())
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

fn decode_segment(name: &str, segment: &str) -> Result<Vec<u8>, CseError> {
    if segment.is_empty() {
        return Err(CseError::Serialization(format!("envelope {name} segment is empty")));
    }
    STANDARD
        .decode(segment)
        .map_err(|e| CseError::Serialization(format!("envelope {name} segment: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_format_has_empty_prefix_and_dollar() {
        let format = EnvelopeFormat::default();
        assert_eq!(format.prefix(), "");
        assert_eq!(format.separator(), "$");
        assert_eq!(format.encode(b"\x01\x02", b"\x03"), "$AQI=$Aw==");
    }

    #[test]
    fn encode_prepends_prefix() {
        let format = EnvelopeFormat::new("adyenan0_1_1", "$").unwrap();
        assert_eq!(format.encode(b"k", b"c"), "adyenan0_1_1$aw==$Yw==");
    }

    #[test]
    fn split_recovers_both_segments() {
        let format = EnvelopeFormat::new("v1", "::").unwrap();
        let envelope = format.encode(&[0xff; 40], &[0x00, 0x01, 0xfe]);
        let parts = format.split(&envelope).unwrap();
        assert_eq!(parts.encapsulated_key, vec![0xff; 40]);
        assert_eq!(parts.sealed_content, vec![0x00, 0x01, 0xfe]);
    }

    #[test]
    fn split_rejects_malformed_envelopes() {
        let format = EnvelopeFormat::default();
        for bad in ["", "AQI=$Aw==", "$AQI=", "$AQI=$Aw==$Aw==", "$AQI=$", "$AQI=$!!"] {
            let err = format.split(bad).unwrap_err();
            assert_eq!(err.code(), "serialization_failed", "input {bad:?}");
        }
    }

    #[test]
    fn split_requires_matching_prefix() {
        let envelope = EnvelopeFormat::new("A", "$").unwrap().encode(b"k", b"c");
        assert!(EnvelopeFormat::new("B", "$").unwrap().split(&envelope).is_err());
    }

    #[test]
    fn separator_validation() {
        assert!(validate_separator("$").is_ok());
        assert!(validate_separator("|#|").is_ok());
        for bad in ["", "a", "Z", "9", "+", "/", "=", "$x"] {
            assert!(
                matches!(validate_separator(bad), Err(CseError::InvalidConfiguration(_))),
                "separator {bad:?}"
            );
        }
    }

    #[test]
    fn with_prefix_keeps_separator() {
        let format = EnvelopeFormat::new("", "#").unwrap().with_prefix("p");
        assert_eq!(format.prefix(), "p");
        assert_eq!(format.separator(), "#");
    }
}
