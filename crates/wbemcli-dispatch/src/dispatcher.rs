//! Runs one operation once per requested namespace.
//!
//! Namespaces are attempted sequentially in request order. A server-reported
//! CIM error is recorded for its namespace and the run continues; a
//! connection-level error aborts the remaining namespaces.

use tracing::{debug, warn};

use crate::connection::WbemConnection;
use crate::error::{CimError, ConnectionError, OperationError};
use crate::object::CimObject;
use crate::operation::Operation;
use crate::request::NamespaceRequest;

const DISPATCH_TARGET: &str = "wbemcli::dispatch";

/// Result of one namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    /// The namespace returned objects.
    Success {
        namespace: String,
        objects: Vec<CimObject>,
    },
    /// The server reported an error for the namespace.
    Failure { namespace: String, error: CimError },
}

impl OperationOutcome {
    /// Namespace the outcome belongs to.
    #[must_use]
    pub fn namespace(&self) -> &str {
        match self {
            Self::Success { namespace, .. } | Self::Failure { namespace, .. } => namespace,
        }
    }

    /// Returned objects; empty for failures.
    #[must_use]
    pub fn objects(&self) -> &[CimObject] {
        match self {
            Self::Success { objects, .. } => objects,
            Self::Failure { .. } => &[],
        }
    }

    /// The recorded error, for failures.
    #[must_use]
    pub const fn error(&self) -> Option<&CimError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}

/// Terminal state of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchState {
    /// Every namespace was attempted.
    Completed,
    /// A connection-level error stopped the run at `namespace`.
    ConnectionFailed {
        namespace: String,
        error: ConnectionError,
    },
}

/// Everything a dispatch produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    /// Terminal state.
    pub state: DispatchState,
    /// One outcome per attempted namespace, in request order.
    pub outcomes: Vec<OperationOutcome>,
}

impl DispatchReport {
    /// Returns true when the run was aborted by a connection error.
    #[must_use]
    pub const fn connection_failed(&self) -> bool {
        matches!(self.state, DispatchState::ConnectionFailed { .. })
    }

    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &OperationOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.error().is_some())
    }
}

/// Fans one operation out across a [`NamespaceRequest`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceDispatcher;

impl NamespaceDispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Invokes `operation` once per namespace.
    pub fn dispatch<F>(&self, request: &NamespaceRequest, mut operation: F) -> DispatchReport
    where
        F: FnMut(&str) -> Result<Vec<CimObject>, OperationError>,
    {
        let mut outcomes = Vec::with_capacity(request.namespaces().len());
        for namespace in request.namespaces() {
            debug!(target: DISPATCH_TARGET, namespace = namespace.as_str(), "dispatching");
            match operation(namespace) {
                Ok(objects) => {
                    debug!(
                        target: DISPATCH_TARGET,
                        namespace = namespace.as_str(),
                        objects = objects.len(),
                        "namespace succeeded"
                    );
                    outcomes.push(OperationOutcome::Success {
                        namespace: namespace.clone(),
                        objects,
                    });
                }
                Err(OperationError::Cim(error)) => {
                    debug!(
                        target: DISPATCH_TARGET,
                        namespace = namespace.as_str(),
                        status = %error.status,
                        "namespace failed"
                    );
                    outcomes.push(OperationOutcome::Failure {
                        namespace: namespace.clone(),
                        error,
                    });
                }
                Err(OperationError::Connection(error)) => {
                    warn!(
                        target: DISPATCH_TARGET,
                        namespace = namespace.as_str(),
                        kind = %error.kind,
                        skipped = request.namespaces().len() - outcomes.len() - 1,
                        "connection failed; aborting dispatch"
                    );
                    return DispatchReport {
                        state: DispatchState::ConnectionFailed {
                            namespace: namespace.clone(),
                            error,
                        },
                        outcomes,
                    };
                }
            }
        }
        DispatchReport {
            state: DispatchState::Completed,
            outcomes,
        }
    }

    /// Performs `operation` through `connection` for every namespace.
    pub fn run(
        &self,
        connection: &mut dyn WbemConnection,
        request: &NamespaceRequest,
        operation: &Operation,
    ) -> DispatchReport {
        debug!(
            target: DISPATCH_TARGET,
            operation = operation.name(),
            namespaces = request.namespaces().len(),
            "starting dispatch"
        );
        self.dispatch(request, |namespace| connection.perform(namespace, operation))
    }
}
