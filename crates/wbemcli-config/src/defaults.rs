use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Default log filter expression used by the binary.
///
/// The CLI writes results to stdout, so only warnings reach stderr unless the
/// operator asks for more.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// File name of the connection repository in the user's home directory.
pub const CONNECTIONS_FILE_NAME: &str = "pywbemcli_connection_definitions.yaml";

/// Returns [`DEFAULT_LOG_FILTER`].
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binary.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Location of the connection repository when none is configured.
///
/// Uses the home directory when it is known and representable as UTF-8,
/// otherwise a file in the working directory.
#[must_use]
pub fn default_connections_file() -> Utf8PathBuf {
    dirs::home_dir()
        .and_then(|home| Utf8PathBuf::from_path_buf(home).ok())
        .map_or_else(
            || Utf8PathBuf::from(CONNECTIONS_FILE_NAME),
            |home| home.join(CONNECTIONS_FILE_NAME),
        )
}
