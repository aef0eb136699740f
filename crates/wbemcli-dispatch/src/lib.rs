//! Multi-namespace dispatch for WBEM operations.
//!
//! A [`NamespaceDispatcher`] runs one [`Operation`] against every namespace
//! of a [`NamespaceRequest`] through a [`WbemConnection`]. The
//! [`ResultAggregator`] orders the per-namespace results for output and the
//! [`ExitStatusPolicy`] turns them into the process verdict.

mod aggregate;
mod connection;
mod dispatcher;
mod error;
pub mod mock;
mod object;
mod operation;
mod policy;
mod request;
mod status;

pub use aggregate::{NamespaceSummary, ResultAggregator, Summary};
pub use connection::{
    ConnectionFactory, DefaultConnectionFactory, UnavailableConnection, WbemConnection,
};
pub use dispatcher::{DispatchReport, DispatchState, NamespaceDispatcher, OperationOutcome};
pub use error::{
    CimError, ConnectionError, ConnectionErrorKind, EXIT_FAILURE, MockLoadError, OperationError,
};
pub use object::{CimObject, ObjectKind};
pub use operation::Operation;
pub use policy::{EXIT_SUCCESS, ExitStatusPolicy, FailureRecord, Verdict};
pub use request::{NamespaceRequest, OrderingMode};
pub use status::CimStatus;
