//! Command-line runtime for the WBEM client.
//!
//! The module owns argument parsing, configuration bootstrapping, connection
//! resolution, and command execution. The runtime is exercised both from the
//! binary entrypoint and from tests, where configuration loading, the
//! environment, the connection factory, and the IO streams can be
//! substituted.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::debug;
use wbemcli_connections::{
    ConnectionOptions, ConnectionResolver, ConnectionStore, Environment, ProcessEnvironment,
};
use wbemcli_dispatch::{ConnectionFactory, DefaultConnectionFactory, EXIT_SUCCESS};

mod cli;
mod commands;
mod config;
mod connection_args;
mod errors;
mod output;
pub mod telemetry;

use cli::Cli;
use commands::Session;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader, config_arguments};
use connection_args::connection_options;
pub(crate) use errors::AppError;

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

/// Collaborators the runtime reads from, substituted in tests.
pub(crate) struct Runtime<'a> {
    pub(crate) loader: &'a dyn ConfigLoader,
    pub(crate) environment: &'a dyn Environment,
    pub(crate) factory: &'a dyn ConnectionFactory,
}

impl Runtime<'_> {
    /// Runs one invocation and returns its exit status.
    fn run<I, W, E>(&self, args: I, io: &mut IoStreams<'_, W, E>) -> u8
    where
        I: IntoIterator<Item = OsString>,
        W: Write,
        E: Write,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let cli = match Cli::try_parse_from(&args) {
            Ok(cli) => cli,
            Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                let _ = write!(io.stdout, "{error}");
                return EXIT_SUCCESS;
            }
            Err(error) => return report(io, &AppError::CliUsage(error)),
        };

        match self.execute(&args, cli, io) {
            Ok(status) => status,
            Err(error) => report(io, &error),
        }
    }

    fn execute<W: Write, E: Write>(
        &self,
        args: &[OsString],
        cli: Cli,
        io: &mut IoStreams<'_, W, E>,
    ) -> Result<u8, AppError> {
        let program = args.first().cloned().unwrap_or_else(|| OsString::from("wbemcli"));
        let config = self.loader.load(&config_arguments(&program, &cli))?;
        telemetry::initialise(&config)?;

        let cli_options = connection_options(&cli.connection)?;
        let env_options = ConnectionOptions::from_environment(self.environment)?;
        // Every command, mutating or not, rejects contradictory options up front.
        ConnectionResolver::check_options(&cli_options, &env_options)?;

        let connections_file = config.connections_file();
        debug!(target: "wbemcli::store", path = %connections_file, "opening connection repository");
        let mut session = Session {
            store: ConnectionStore::open(connections_file)?,
            cli_options,
            env_options,
            factory: self.factory,
            format: cli.output,
        };
        commands::execute(cli.command, &mut session, io)
    }
}

fn report<W: Write, E: Write>(io: &mut IoStreams<'_, W, E>, error: &AppError) -> u8 {
    let _ = writeln!(io.stderr, "{error}");
    error.exit_status()
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    let runtime = Runtime {
        loader: &OrthoConfigLoader,
        environment: &ProcessEnvironment,
        factory: &DefaultConnectionFactory,
    };
    ExitCode::from(runtime.run(args, &mut io))
}

#[cfg(test)]
mod tests;
