//! Turns a dispatch report into the process verdict.

use crate::dispatcher::{DispatchReport, DispatchState};
use crate::error::{CimError, ConnectionError, EXIT_FAILURE};

/// Exit status of a fully successful command.
pub const EXIT_SUCCESS: u8 = 0;

/// What a command reports and how it exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<'a> {
    /// Every namespace succeeded.
    Success,
    /// Some namespaces failed; successful output is still emitted.
    PartialFailure,
    /// Every namespace failed.
    AllFailed,
    /// A connection error aborted the run; nothing else is emitted.
    ConnectionFailed {
        namespace: &'a str,
        error: &'a ConnectionError,
    },
}

impl Verdict<'_> {
    /// Process exit status.
    #[must_use]
    pub const fn exit_status(&self) -> u8 {
        match self {
            Self::Success => EXIT_SUCCESS,
            Self::PartialFailure | Self::AllFailed | Self::ConnectionFailed { .. } => EXIT_FAILURE,
        }
    }

    /// Whether successful namespaces' objects are printed.
    #[must_use]
    pub const fn emits_output(&self) -> bool {
        matches!(self, Self::Success | Self::PartialFailure)
    }

    /// Whether the per-namespace error report is printed.
    #[must_use]
    pub const fn reports_failures(&self) -> bool {
        matches!(self, Self::PartialFailure | Self::AllFailed)
    }
}

/// One line of the per-namespace error report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureRecord<'a> {
    /// Failed namespace.
    pub namespace: &'a str,
    /// Server error.
    pub error: &'a CimError,
}

/// Derives the verdict for a dispatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitStatusPolicy;

impl ExitStatusPolicy {
    /// Classifies `report`.
    #[must_use]
    pub fn evaluate(report: &DispatchReport) -> Verdict<'_> {
        if let DispatchState::ConnectionFailed { namespace, error } = &report.state {
            return Verdict::ConnectionFailed { namespace, error };
        }
        let failed = report.failures().count();
        if failed == 0 {
            Verdict::Success
        } else if failed == report.outcomes.len() {
            Verdict::AllFailed
        } else {
            Verdict::PartialFailure
        }
    }

    /// Failure records to report, in request order.
    #[must_use]
    pub fn failure_records(report: &DispatchReport) -> Vec<FailureRecord<'_>> {
        report
            .outcomes
            .iter()
            .filter_map(|outcome| {
                outcome.error().map(|error| FailureRecord {
                    namespace: outcome.namespace(),
                    error,
                })
            })
            .collect()
    }
}
