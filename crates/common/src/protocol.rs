//! Card data model and the JSON payload shape encrypted into every envelope.
//!
//! The payload is a small JSON object; absent fields are omitted entirely:
//!
//! ```text
//! { "number"?, "holderName"?, "cvc"?, "expiryMonth"?, "expiryYear"?, "binValue"?, "generationtime" }
//! ```
//!
//! `generationtime` is UTC ISO-8601 with millisecond precision, e.g.
//! `2030-03-01T12:00:00.000Z`.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CseError;

// ---------------------------------------------------------------------------
// Card fields
// ---------------------------------------------------------------------------

/// Identifies one protected card field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardField {
    /// Primary account number.
    Number,
    /// Cardholder name. Only ever part of the aggregate token.
    HolderName,
    /// Security code (CVC/CVV).
    SecurityCode,
    /// Two-digit expiry month.
    ExpiryMonth,
    /// Four-digit expiry year.
    ExpiryYear,
    /// Bank identification number, the leading digits of the PAN.
    Bin,
}

impl CardField {
    /// The payload key this field is serialised under.
    pub fn as_str(self) -> &'static str {
        match self {
            CardField::Number => "number",
            CardField::HolderName => "holderName",
            CardField::SecurityCode => "cvc",
            CardField::ExpiryMonth => "expiryMonth",
            CardField::ExpiryYear => "expiryYear",
            CardField::Bin => "binValue",
        }
    }

    /// Check a value before it is tokenized on its own.
    ///
    /// Every field except the holder name must be one or more ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::InvalidField`] naming this field otherwise.
    pub fn validate(self, value: &str) -> Result<(), CseError> {
        let numeric = !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit());
        match self {
            CardField::HolderName => Ok(()),
            _ if numeric => Ok(()),
            _ => Err(CseError::InvalidField(self)),
        }
    }
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Card details
// ---------------------------------------------------------------------------

/// Card fields collected by the caller just before encryption.
///
/// Every field is optional; absence is a valid, encodable state. The generation
/// time is stamped at construction and truncated to milliseconds, the precision
/// carried on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct CardDetails {
    /// The card number.
    pub number: Option<String>,
    /// The cardholder's name.
    pub holder_name: Option<String>,
    /// The card's security code.
    pub security_code: Option<String>,
    /// The month the card expires.
    pub expiry_month: Option<String>,
    /// The year the card expires.
    pub expiry_year: Option<String>,
    generation_time: DateTime<Utc>,
}

impl CardDetails {
    /// Create an empty card stamped with the current time.
    pub fn new() -> Self {
        Self {
            number: None,
            holder_name: None,
            security_code: None,
            expiry_month: None,
            expiry_year: None,
            generation_time: Utc::now().trunc_subsecs(3),
        }
    }

    /// Set the card number.
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    /// Set the cardholder name.
    pub fn with_holder_name(mut self, holder_name: impl Into<String>) -> Self {
        self.holder_name = Some(holder_name.into());
        self
    }

    /// Set the security code.
    pub fn with_security_code(mut self, security_code: impl Into<String>) -> Self {
        self.security_code = Some(security_code.into());
        self
    }

    /// Set the expiry month and year together.
    pub fn with_expiry(mut self, month: impl Into<String>, year: impl Into<String>) -> Self {
        self.expiry_month = Some(month.into());
        self.expiry_year = Some(year.into());
        self
    }

    /// Replace the generation time. Sub-millisecond precision is dropped.
    pub fn with_generation_time(mut self, generation_time: DateTime<Utc>) -> Self {
        self.generation_time = generation_time.trunc_subsecs(3);
        self
    }

    /// The point in time this card object was created.
    pub fn generation_time(&self) -> DateTime<Utc> {
        self.generation_time
    }

    /// Returns `true` when no card field is present.
    pub fn is_empty(&self) -> bool {
        [
            &self.number,
            &self.holder_name,
            &self.security_code,
            &self.expiry_month,
            &self.expiry_year,
        ]
        .iter()
        .all(|f| f.is_none())
    }

    /// Borrow the value of a single field, if present.
    pub fn field(&self, field: CardField) -> Option<&str> {
        match field {
            CardField::Number => self.number.as_deref(),
            CardField::HolderName => self.holder_name.as_deref(),
            CardField::SecurityCode => self.security_code.as_deref(),
            CardField::ExpiryMonth => self.expiry_month.as_deref(),
            CardField::ExpiryYear => self.expiry_year.as_deref(),
            CardField::Bin => None,
        }
    }
}

impl Default for CardDetails {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Card values never reach logs; only their presence does.
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("CardDetails")
            .field("number", &redact(&self.number))
            .field("holder_name", &redact(&self.holder_name))
            .field("security_code", &redact(&self.security_code))
            .field("expiry_month", &redact(&self.expiry_month))
            .field("expiry_year", &redact(&self.expiry_year))
            .field("generation_time", &self.generation_time)
            .finish()
    }
}

impl From<CardPayload> for CardDetails {
    fn from(payload: CardPayload) -> Self {
        Self {
            number: payload.number,
            holder_name: payload.holder_name,
            security_code: payload.security_code,
            expiry_month: payload.expiry_month,
            expiry_year: payload.expiry_year,
            generation_time: payload.generation_time,
        }
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// The structured object serialised to JSON and encrypted into an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_name: Option<String>,

    #[serde(rename = "cvc", default, skip_serializing_if = "Option::is_none")]
    pub security_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_month: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_year: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_value: Option<String>,

    #[serde(rename = "generationtime", with = "generation_time")]
    pub generation_time: DateTime<Utc>,
}

impl CardPayload {
    /// An empty payload carrying only the generation time.
    pub fn new(generation_time: DateTime<Utc>) -> Self {
        Self {
            number: None,
            holder_name: None,
            security_code: None,
            expiry_month: None,
            expiry_year: None,
            bin_value: None,
            generation_time,
        }
    }

    /// Payload for a single field.
    pub fn single(field: CardField, value: &str, generation_time: DateTime<Utc>) -> Self {
        Self::new(generation_time).with_field(field, value)
    }

    /// Set `field` to `value`.
    pub fn with_field(mut self, field: CardField, value: &str) -> Self {
        let slot = match field {
            CardField::Number => &mut self.number,
            CardField::HolderName => &mut self.holder_name,
            CardField::SecurityCode => &mut self.security_code,
            CardField::ExpiryMonth => &mut self.expiry_month,
            CardField::ExpiryYear => &mut self.expiry_year,
            CardField::Bin => &mut self.bin_value,
        };
        *slot = Some(value.to_owned());
        self
    }

    /// Serialise to the canonical JSON bytes that get encrypted.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::Serialization`] if the generation time cannot be
    /// represented (year outside `0000..=9999`).
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CseError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse payload bytes produced by [`CardPayload::to_json_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`CseError::Serialization`] if `bytes` is not a well-formed payload.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, CseError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl From<&CardDetails> for CardPayload {
    fn from(card: &CardDetails) -> Self {
        Self {
            number: card.number.clone(),
            holder_name: card.holder_name.clone(),
            security_code: card.security_code.clone(),
            expiry_month: card.expiry_month.clone(),
            expiry_year: card.expiry_year.clone(),
            bin_value: None,
            generation_time: card.generation_time,
        }
    }
}

mod generation_time {
    use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
    use serde::{de, ser, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    pub fn serialize<S: Serializer>(time: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        if !(0..=9999).contains(&time.year()) {
            return Err(ser::Error::custom(format!(
                "generation time year {} is outside 0000..=9999",
                time.year()
            )));
        }
        s.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Encrypted card
// ---------------------------------------------------------------------------

/// A field whose token could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: CardField,
    pub error: CseError,
}

/// Individually encrypted card fields.
///
/// A `None` token means the field was either absent or failed; the two cases
/// are told apart through [`EncryptedCard::failures`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptedCard {
    /// The encrypted card number.
    pub number: Option<String>,
    /// The card's encrypted security code.
    pub security_code: Option<String>,
    /// The encrypted month the card expires.
    pub expiry_month: Option<String>,
    /// The encrypted year the card expires.
    pub expiry_year: Option<String>,
    /// Fields that were present but could not be encrypted.
    pub failures: Vec<FieldFailure>,
}

impl EncryptedCard {
    /// Returns `true` if every present field was encrypted.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The failure recorded for `field`, if any.
    pub fn failure(&self, field: CardField) -> Option<&CseError> {
        self.failures
            .iter()
            .find(|f| f.field == field)
            .map(|f| &f.error)
    }
}
