//! Error taxonomy for WBEM operations.
//!
//! Server-reported [`CimError`]s are local to one namespace; transport-level
//! [`ConnectionError`]s abort a whole dispatch.

use std::io;

use camino::Utf8PathBuf;
use strum::Display;
use thiserror::Error;

use crate::status::CimStatus;

/// Exit status for operational failures.
pub const EXIT_FAILURE: u8 = 1;

/// An error reported by the WBEM server for one request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status} ({code}): {description}", code = .status.code())]
pub struct CimError {
    /// Status code.
    pub status: CimStatus,
    /// Human-readable description from the server.
    pub description: String,
}

impl CimError {
    /// Creates an error with the given status and description.
    pub fn new(status: CimStatus, description: impl Into<String>) -> Self {
        Self {
            status,
            description: description.into(),
        }
    }
}

/// Category of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionErrorKind {
    /// The request exceeded the configured timeout.
    Timeout,
    /// The server refused the TCP connection.
    Refused,
    /// The server host name could not be resolved.
    Dns,
    /// TLS negotiation or certificate verification failed.
    Tls,
    /// The server rejected the credentials.
    Authentication,
    /// No transport is available for the target.
    Unavailable,
}

/// A failure to reach the WBEM server at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("connection failed ({kind}): {message}")]
pub struct ConnectionError {
    /// Failure category.
    pub kind: ConnectionErrorKind,
    /// Detail for the operator.
    pub message: String,
}

impl ConnectionError {
    /// Creates an error of the given kind.
    pub fn new(kind: ConnectionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Failure of a single [`crate::Operation`] against one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The server answered with a CIM status.
    #[error(transparent)]
    Cim(#[from] CimError),
    /// The server could not be reached.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

impl OperationError {
    /// Returns true for failures that make every further request pointless.
    #[must_use]
    pub const fn is_connection_level(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Errors raised while building a mock server from model files.
#[derive(Debug, Error)]
pub enum MockLoadError {
    /// A model file could not be read.
    #[error("failed to read mock model {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// A model file is not a valid model document.
    #[error("invalid mock model {path}: {message}")]
    Parse { path: Utf8PathBuf, message: String },
    /// The merged model refers to something it does not define.
    #[error("inconsistent mock model in namespace {namespace}: {message}")]
    Inconsistent { namespace: String, message: String },
}

impl MockLoadError {
    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_status(&self) -> u8 {
        EXIT_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cim_error_display_names_status_and_code() {
        let error = CimError::new(CimStatus::InvalidNamespace, "namespace root/x does not exist");
        assert_eq!(
            error.to_string(),
            "CIM_ERR_INVALID_NAMESPACE (3): namespace root/x does not exist"
        );
    }

    #[test]
    fn only_connection_errors_are_connection_level() {
        let cim = OperationError::from(CimError::new(CimStatus::NotFound, "gone"));
        let timeout =
            OperationError::from(ConnectionError::new(ConnectionErrorKind::Timeout, "30s elapsed"));
        assert!(!cim.is_connection_level());
        assert!(timeout.is_connection_level());
        assert_eq!(timeout.to_string(), "connection failed (timeout): 30s elapsed");
    }
}
