//! Field tokenizer: drives serialise → seal → encapsulate → envelope for each
//! card field and for the aggregate card record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cse_common::{CardDetails, CardField, CardPayload, CseError, EncryptedCard, FieldFailure};
use tracing::{debug, warn};

use crate::config::CseConfig;
use crate::crypto::{SessionCipher, SessionKey};
use crate::entropy::{EntropySource, OsEntropy};
use crate::envelope::EnvelopeCodec;
use crate::keys::{PublicKeyMaterial, RsaEncapsulator};

/// Produces envelopes for one backend public key.
///
/// Every envelope gets its own [`SessionKey`]. A `Tokenizer` is `Send + Sync`
/// and may be shared across threads; its envelope format can be changed at
/// runtime through [`Tokenizer::codec`].
#[derive(Clone)]
pub struct Tokenizer {
    encapsulator: RsaEncapsulator,
    cipher: SessionCipher,
    codec: EnvelopeCodec,
    entropy: Arc<dyn EntropySource>,
}

impl Tokenizer {
    /// Build a tokenizer from a `"<exponent-hex>|<modulus-hex>"` descriptor.
    ///
    /// # Errors
    ///
    /// - [`CseError::KeyFormat`] if the descriptor is malformed.
    /// - [`CseError::Encryption`] if the key is structurally unusable.
    /// - [`CseError::InvalidConfiguration`] if `config` is rejected.
    pub fn new(public_key: &str, config: &CseConfig) -> Result<Self, CseError> {
        let material = PublicKeyMaterial::parse(public_key)?;
        let encapsulator = RsaEncapsulator::new(&material)?;
        let cipher = config.session_cipher()?;
        let codec = EnvelopeCodec::new(config.envelope_format()?);
        debug!(
            modulus_len = encapsulator.modulus_len(),
            mode = ?cipher.mode(),
            tag_len = cipher.tag_len(),
            "tokenizer ready"
        );
        Ok(Self {
            encapsulator,
            cipher,
            codec,
            entropy: Arc::new(OsEntropy),
        })
    }

    /// Replace the randomness source.
    pub fn with_entropy(mut self, entropy: Arc<dyn EntropySource>) -> Self {
        self.entropy = entropy;
        self
    }

    /// The envelope codec; clones of this tokenizer share it.
    pub fn codec(&self) -> &EnvelopeCodec {
        &self.codec
    }

    /// Encrypt one payload into a complete envelope.
    ///
    /// # Errors
    ///
    /// Returns the first failure of the pipeline. No partial envelope is ever
    /// produced.
    pub fn seal_payload(&self, payload: &CardPayload) -> Result<String, CseError> {
        let plaintext = payload.to_json_bytes()?;
        let session = SessionKey::generate(self.cipher.mode(), self.entropy.as_ref());
        let sealed = self.cipher.seal(&session, &plaintext)?;
        let wrapped = self
            .encapsulator
            .encapsulate(session.key(), self.entropy.as_ref())?;
        Ok(self.codec.encode(&wrapped, &sealed))
    }

    /// Tokenize a single field value. An absent value yields `Ok(None)`
    /// without touching the entropy source.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::InvalidField`] if the value is rejected by
    /// [`CardField::validate`], otherwise see [`Tokenizer::seal_payload`].
    pub fn encrypt_field(
        &self,
        field: CardField,
        value: Option<&str>,
        generation_time: DateTime<Utc>,
    ) -> Result<Option<String>, CseError> {
        let Some(value) = value else {
            return Ok(None);
        };
        field.validate(value)?;
        let token = self.seal_payload(&CardPayload::single(field, value, generation_time))?;
        debug!(field = %field, "field tokenized");
        Ok(Some(token))
    }

    pub fn encrypt_number(
        &self,
        number: Option<&str>,
        generation_time: DateTime<Utc>,
    ) -> Result<Option<String>, CseError> {
        self.encrypt_field(CardField::Number, number, generation_time)
    }

    pub fn encrypt_security_code(
        &self,
        security_code: Option<&str>,
        generation_time: DateTime<Utc>,
    ) -> Result<Option<String>, CseError> {
        self.encrypt_field(CardField::SecurityCode, security_code, generation_time)
    }

    pub fn encrypt_expiry_month(
        &self,
        expiry_month: Option<&str>,
        generation_time: DateTime<Utc>,
    ) -> Result<Option<String>, CseError> {
        self.encrypt_field(CardField::ExpiryMonth, expiry_month, generation_time)
    }

    pub fn encrypt_expiry_year(
        &self,
        expiry_year: Option<&str>,
        generation_time: DateTime<Utc>,
    ) -> Result<Option<String>, CseError> {
        self.encrypt_field(CardField::ExpiryYear, expiry_year, generation_time)
    }

    /// Tokenize a BIN as a `binValue` payload.
    pub fn encrypt_bin(
        &self,
        bin: Option<&str>,
        generation_time: DateTime<Utc>,
    ) -> Result<Option<String>, CseError> {
        self.encrypt_field(CardField::Bin, bin, generation_time)
    }

    /// Tokenize number, security code and expiry independently.
    ///
    /// A field that fails yields `None` and a [`FieldFailure`]; the others are
    /// still attempted. The holder name is only carried by
    /// [`Tokenizer::encrypt_token`].
    pub fn encrypt_card(&self, card: &CardDetails) -> EncryptedCard {
        let mut out = EncryptedCard::default();
        let slots = [
            (CardField::Number, &mut out.number),
            (CardField::SecurityCode, &mut out.security_code),
            (CardField::ExpiryMonth, &mut out.expiry_month),
            (CardField::ExpiryYear, &mut out.expiry_year),
        ];
        for (field, slot) in slots {
            *slot = match self.encrypt_field(field, card.field(field), card.generation_time()) {
                Ok(token) => token,
                Err(error) => {
                    warn!(field = %field, code = error.code(), error = %error, "field encryption failed");
                    out.failures.push(FieldFailure { field, error });
                    None
                }
            };
        }
        out
    }

    /// Tokenize the whole card, holder name included, into one envelope.
    ///
    /// Returns `Ok(None)` if the card carries no field at all.
    ///
    /// # Errors
    ///
    /// See [`Tokenizer::seal_payload`].
    pub fn encrypt_token(&self, card: &CardDetails) -> Result<Option<String>, CseError> {
        if card.is_empty() {
            return Ok(None);
        }
        let token = self.seal_payload(&CardPayload::from(card))?;
        debug!("card token produced");
        Ok(Some(token))
    }
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("modulus_len", &self.encapsulator.modulus_len())
            .field("cipher", &self.cipher)
            .field("format", &self.codec.format())
            .finish_non_exhaustive()
    }
}
