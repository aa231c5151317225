//! Tracing subscriber initialisation.

use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Install the global tracing subscriber, logging JSON lines to stdout.
///
/// Events are filtered by `RUST_LOG` when set and `log_level` otherwise.
///
/// # Errors
///
/// Returns an error if `log_level` is not a valid filter directive or a global
/// subscriber is already installed.
pub fn init_tracing(log_level: &str) -> Result<()> {
    init_tracing_with_writer(log_level, std::io::stdout)
}

/// Same as [`init_tracing`], writing JSON lines through `writer`.
///
/// # Errors
///
/// See [`init_tracing`].
pub fn init_tracing_with_writer<W>(log_level: &str, writer: W) -> Result<()>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(log_level)?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
        .try_init()
        .context("failed to initialise tracing subscriber")?;

    Ok(())
}

fn level_filter(log_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(log_level).with_context(|| format!("invalid log level {log_level:?}"))
}
