//! Diagnostics for the CLI.
//!
//! Command results own stdout, so every diagnostic event is written to
//! stderr. The subscriber is process-global and installed at most once.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{Subscriber, debug};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::UtcTime;

use wbemcli_config::{Config, LogFormat};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression does not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter { filter: String, message: String },
    /// Another global subscriber is already installed.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Installs the stderr subscriber described by `config`.
///
/// Only the first call has an effect; the runtime tests run many
/// invocations in one process.
pub fn initialise(config: &Config) -> Result<(), TelemetryError> {
    INSTALLED.get_or_try_init(|| install(config)).map(|_| ())
}

fn parse_filter(raw: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(raw).map_err(|error| TelemetryError::Filter {
        filter: raw.to_owned(),
        message: error.to_string(),
    })
}

fn install(config: &Config) -> Result<(), TelemetryError> {
    let filter = parse_filter(config.log_filter())?;
    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(
            fmt::Subscriber::builder()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .with_timer(UtcTime::rfc_3339())
                .finish(),
        ),
        LogFormat::Compact => Box::new(
            fmt::Subscriber::builder()
                .compact()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .with_timer(UtcTime::rfc_3339())
                .finish(),
        ),
    };
    tracing::subscriber::set_global_default(subscriber)?;
    debug!(
        target: "wbemcli::telemetry",
        filter = config.log_filter(),
        format = %config.log_format(),
        "telemetry initialised"
    );
    Ok(())
}
