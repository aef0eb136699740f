//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use wbemcli_connections::{EXIT_FAILURE, EXIT_USAGE, ResolveError, StoreError};
use wbemcli_dispatch::{MockLoadError, OperationError};

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    MockLoad(#[from] MockLoadError),
    #[error("no current connection: use --server, --mock-server, --name, or set a default connection")]
    NoCurrentConnection,
    #[error("connection test failed: {0}")]
    ConnectionTest(OperationError),
    #[error("failed to serialise output: {0}")]
    Serialise(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl AppError {
    /// Returns the process exit status for this error.
    ///
    /// Usage errors, conflicting options, and unparsable option values exit
    /// with 2; every other failure exits with 1.
    pub(crate) fn exit_status(&self) -> u8 {
        match self {
            Self::LoadConfiguration(_) => EXIT_USAGE,
            Self::CliUsage(error) => u8::try_from(error.exit_code()).unwrap_or(EXIT_USAGE),
            Self::Resolve(error) => error.exit_status(),
            Self::Store(error) => error.exit_status(),
            Self::MockLoad(error) => error.exit_status(),
            Self::Telemetry(_)
            | Self::NoCurrentConnection
            | Self::ConnectionTest(_)
            | Self::Serialise(_)
            | Self::Output(_) => EXIT_FAILURE,
        }
    }
}
