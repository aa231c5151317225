//! Structured logging setup for hosts embedding the tokenizer.
//!
//! # Telemetry invariants
//!
//! - **No card data or key material** may appear in any log field. Events carry
//!   field names, modes, lengths, and error displays only.
//! - Log level is configurable via `CSE_LOG_LEVEL` (default: `info`), and
//!   `RUST_LOG` overrides it.

pub mod init;

pub use init::{init_tracing, init_tracing_with_writer};
