//! Error types for the connection repository and resolver.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::definition::DefinitionError;

/// Exit status for runtime failures.
pub const EXIT_FAILURE: u8 = 1;

/// Exit status for contradictory or malformed command-line usage.
pub const EXIT_USAGE: u8 = 2;

/// Errors raised by [`crate::ConnectionStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The repository file exists but could not be parsed.
    #[error("connection repository {path} is corrupt: {message}")]
    RepositoryCorrupt { path: Utf8PathBuf, message: String },
    /// A named connection was requested but no repository file exists.
    #[error("connection repository file {path} does not exist")]
    ConnectionFileNotFound { path: Utf8PathBuf },
    /// The named definition is not in the repository.
    #[error("connection definition '{name}' not found in {path}")]
    NotFound { name: String, path: Utf8PathBuf },
    /// A definition violated its invariants.
    #[error("invalid connection definition '{name}': {source}")]
    InvalidDefinition {
        name: String,
        #[source]
        source: DefinitionError,
    },
    /// Filesystem access failed.
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// The repository could not be rendered as YAML.
    #[error("failed to serialise connection repository: {message}")]
    Serialise { message: String },
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: impl Into<Utf8PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_status(&self) -> u8 {
        EXIT_FAILURE
    }
}

/// Errors raised while resolving the current connection.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Mutually exclusive connection options were combined.
    #[error("conflicting connection options: {message}")]
    ConfigConflict { message: String },
    /// An option value could not be interpreted.
    #[error("invalid value for {option}: {message}")]
    InvalidValue {
        option: &'static str,
        message: String,
    },
    /// The repository could not supply the requested definition.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResolveError {
    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::ConfigConflict {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_value(option: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            option,
            message: message.into(),
        }
    }

    /// Process exit status for this error.
    ///
    /// Conflicts and malformed values are usage errors and exit with 2; a
    /// missing or unreadable repository exits with 1.
    #[must_use]
    pub const fn exit_status(&self) -> u8 {
        match self {
            Self::ConfigConflict { .. } | Self::InvalidValue { .. } => EXIT_USAGE,
            Self::Store(error) => error.exit_status(),
        }
    }
}
