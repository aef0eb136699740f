//! Command execution.
//!
//! A [`Session`] owns the connection store and the connection options of
//! one invocation; each command borrows it.

mod connection;
mod operation;

use std::io::Write;

use wbemcli_connections::{ConnectionOptions, ConnectionResolver, ConnectionStore, CurrentConnection};
use wbemcli_dispatch::ConnectionFactory;

use crate::AppError;
use crate::IoStreams;
use crate::cli::{CliCommand, OutputFormat};

pub(crate) struct Session<'a> {
    pub(crate) store: ConnectionStore,
    pub(crate) cli_options: ConnectionOptions,
    pub(crate) env_options: ConnectionOptions,
    pub(crate) factory: &'a dyn ConnectionFactory,
    pub(crate) format: OutputFormat,
}

impl Session<'_> {
    /// Resolves the current connection, if any source names one.
    pub(crate) fn current(&self) -> Result<Option<CurrentConnection>, AppError> {
        ConnectionResolver::new(&self.store)
            .resolve(self.cli_options.clone(), self.env_options.clone())
            .map_err(AppError::from)
    }

    /// Resolves the current connection, failing when there is none.
    pub(crate) fn require_current(&self) -> Result<CurrentConnection, AppError> {
        self.current()?.ok_or(AppError::NoCurrentConnection)
    }
}

/// Runs `command` and returns its exit code.
pub(crate) fn execute<W: Write, E: Write>(
    command: CliCommand,
    session: &mut Session<'_>,
    io: &mut IoStreams<'_, W, E>,
) -> Result<u8, AppError> {
    match command {
        CliCommand::Connection { action } => connection::execute(action, session, io),
        CliCommand::Class { action } => operation::execute_class(action, session, io),
        CliCommand::Instance { action } => operation::execute_instance(action, session, io),
        CliCommand::Namespace { action } => operation::execute_namespace(action, session, io),
    }
}
