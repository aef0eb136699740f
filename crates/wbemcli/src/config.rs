//! Configuration loading helpers for the WBEM client.
//!
//! Tool configuration (logging and the repository location) is handled by
//! `ortho-config`, which layers defaults, configuration files, environment
//! variables, and the configuration flags given on the command line. The
//! loader only receives those flags; connection options are resolved
//! separately.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use wbemcli_config::Config;

use crate::AppError;
use crate::cli::Cli;

pub(crate) trait ConfigLoader {
    /// Loads configuration from the configuration flags in `args`.
    ///
    /// `args` starts with the program name, followed by flag and value pairs.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

/// Rebuilds the configuration flags of a parsed command line for the loader.
pub(crate) fn config_arguments(program: &OsStr, cli: &Cli) -> Vec<OsString> {
    let mut arguments = vec![program.to_owned()];
    let flags = [
        ("--connections-file", cli.connections_file.as_ref().map(|path| path.as_os_str().to_owned())),
        ("--log-filter", cli.log_filter.as_ref().map(OsString::from)),
        ("--log-format", cli.log_format.as_ref().map(OsString::from)),
    ];
    for (flag, value) in flags {
        if let Some(value) = value {
            arguments.push(OsString::from(flag));
            arguments.push(value);
        }
    }
    arguments
}
