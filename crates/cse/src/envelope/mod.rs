//! Envelope assembly: joins the encapsulated session key and the sealed
//! content into the delimited string handed to the backend.

pub mod codec;
pub mod format;

pub use codec::EnvelopeCodec;
pub use format::{validate_separator, EnvelopeFormat, EnvelopeParts, DEFAULT_SEPARATOR};
