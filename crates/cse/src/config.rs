//! Configuration loading and validation for the tokenizer.
//!
//! Values are read from `CSE_`-prefixed environment variables; every field has
//! a default, so an empty environment yields a working configuration.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::cipher::{ContentMode, SessionCipher, DEFAULT_TAG_LEN};
use crate::envelope::{validate_separator, EnvelopeFormat, DEFAULT_SEPARATOR};

/// Validated tokenizer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CseConfig {
    /// String placed before the first separator of every envelope.
    #[serde(default)]
    pub envelope_prefix: String,

    /// Separator between envelope segments.
    #[serde(default = "default_envelope_separator")]
    pub envelope_separator: String,

    /// Content-encryption strategy (`ccm`, `cbc` or `cbc-hs512`).
    #[serde(default)]
    pub content_mode: ContentMode,

    /// CCM tag length in bytes. Ignored by the CBC modes.
    #[serde(default = "default_tag_length")]
    pub tag_length: usize,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_envelope_separator() -> String {
    DEFAULT_SEPARATOR.into()
}
fn default_tag_length() -> usize {
    DEFAULT_TAG_LEN
}
fn default_log_level() -> String {
    "info".into()
}

impl CseConfig {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or a value is invalid.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::with_prefix("CSE"))
    }

    fn load(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env.try_parsing(true))
            .build()
            .context("failed to build configuration from environment")?;

        let c: CseConfig = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending variable.
    pub fn validate(&self) -> Result<()> {
        validate_separator(&self.envelope_separator).context("CSE_ENVELOPE_SEPARATOR")?;
        self.session_cipher().context("CSE_TAG_LENGTH")?;
        if self.log_level.trim().is_empty() {
            anyhow::bail!("CSE_LOG_LEVEL must not be empty");
        }
        Ok(())
    }

    /// The envelope format these settings describe.
    ///
    /// # Errors
    ///
    /// Returns [`cse_common::CseError::InvalidConfiguration`] for a rejected separator.
    pub fn envelope_format(&self) -> Result<EnvelopeFormat, cse_common::CseError> {
        EnvelopeFormat::new(self.envelope_prefix.as_str(), self.envelope_separator.as_str())
    }

    /// The content cipher these settings describe.
    ///
    /// # Errors
    ///
    /// Returns [`cse_common::CseError::InvalidConfiguration`] for a rejected tag length.
    pub fn session_cipher(&self) -> Result<SessionCipher, cse_common::CseError> {
        SessionCipher::new(self.content_mode, self.tag_length)
            .map_err(|e| cse_common::CseError::InvalidConfiguration(e.to_string()))
    }
}

impl Default for CseConfig {
    fn default() -> Self {
        Self {
            envelope_prefix: String::new(),
            envelope_separator: default_envelope_separator(),
            content_mode: ContentMode::default(),
            tag_length: default_tag_length(),
            log_level: default_log_level(),
        }
    }
}
