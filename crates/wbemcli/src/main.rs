//! CLI entrypoint for the WBEM client.
//!
//! The binary delegates to [`wbemcli::run`], which loads configuration,
//! resolves the current connection, and executes the requested command.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    wbemcli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
