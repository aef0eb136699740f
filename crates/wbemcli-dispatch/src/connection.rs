//! The WBEM client seam.
//!
//! Dispatch only ever talks to a [`WbemConnection`]; the
//! [`ConnectionFactory`] decides what sits behind it for a given
//! [`CurrentConnection`].

use wbemcli_connections::{ConnectionTarget, CurrentConnection};

use crate::error::{ConnectionError, ConnectionErrorKind, MockLoadError, OperationError};
use crate::mock::MockModel;
use crate::object::CimObject;
use crate::operation::Operation;

/// Performs WBEM operations against one server.
pub trait WbemConnection {
    /// Executes `operation` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Cim`] for server-reported failures and
    /// [`OperationError::Connection`] when the server cannot be reached.
    fn perform(
        &mut self,
        namespace: &str,
        operation: &Operation,
    ) -> Result<Vec<CimObject>, OperationError>;
}

/// Builds connections for the current connection settings.
pub trait ConnectionFactory {
    /// Opens a connection.
    ///
    /// # Errors
    ///
    /// Returns [`MockLoadError`] when mock model files cannot be loaded.
    fn connect(
        &self,
        connection: &CurrentConnection,
    ) -> Result<Box<dyn WbemConnection>, MockLoadError>;
}

/// Factory that serves mock connections and reports real servers as
/// unreachable, since no CIM-XML transport is linked in.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultConnectionFactory;

impl ConnectionFactory for DefaultConnectionFactory {
    fn connect(
        &self,
        connection: &CurrentConnection,
    ) -> Result<Box<dyn WbemConnection>, MockLoadError> {
        match &connection.target {
            ConnectionTarget::Mock(files) => {
                let model = MockModel::load(files)?;
                Ok(Box::new(model.into_connection(
                    connection.use_pull,
                    connection.pull_max_cnt,
                )))
            }
            ConnectionTarget::Server(url) => Ok(Box::new(UnavailableConnection { url: url.clone() })),
        }
    }
}

/// Connection to a real server URL when no transport is available.
#[derive(Debug, Clone)]
pub struct UnavailableConnection {
    url: String,
}

impl WbemConnection for UnavailableConnection {
    fn perform(
        &mut self,
        _namespace: &str,
        _operation: &Operation,
    ) -> Result<Vec<CimObject>, OperationError> {
        Err(ConnectionError::new(
            ConnectionErrorKind::Unavailable,
            format!("no CIM-XML transport is available to reach {}", self.url),
        )
        .into())
    }
}
