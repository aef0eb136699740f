//! Tool-level configuration shared by the `wbemcli` crates.
//!
//! This is the configuration of the program itself (where the connection
//! repository lives and how logging is emitted), not of any WBEM server.
//! Values are layered by `ortho_config`: built-in defaults, then a
//! configuration file, then `PYWBEMCLI_*` environment variables, then CLI
//! flags.

mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    CONNECTIONS_FILE_NAME, DEFAULT_LOG_FILTER, default_connections_file, default_log_filter,
    default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Process configuration for the `wbemcli` binary.
///
/// The defaults layer always carries the log filter, so a run with no
/// configuration file, environment or flags still merges into an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(prefix = "PYWBEMCLI")]
pub struct Config {
    /// `tracing` filter directive for diagnostics written to stderr.
    #[ortho_config(default = String::from(DEFAULT_LOG_FILTER))]
    pub log_filter: Option<String>,
    /// Diagnostic output format.
    pub log_format: Option<LogFormat>,
    /// Path of the connection repository file.
    pub connections_file: Option<Utf8PathBuf>,
}

impl Config {
    /// Effective log filter.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter
            .as_deref()
            .filter(|filter| !filter.trim().is_empty())
            .unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Effective log format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }

    /// Effective connection repository path.
    #[must_use]
    pub fn connections_file(&self) -> Utf8PathBuf {
        self.connections_file
            .as_deref()
            .filter(|path| !path.as_str().is_empty())
            .map_or_else(default_connections_file, Utf8Path::to_path_buf)
    }
}
