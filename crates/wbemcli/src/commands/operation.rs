//! Server operation subcommands, run across one or more namespaces.

use std::io::Write;

use tracing::info;
use wbemcli_dispatch::{
    ExitStatusPolicy, NamespaceDispatcher, NamespaceRequest, Operation, OrderingMode,
    ResultAggregator, Verdict,
};

use super::Session;
use crate::cli::{ClassAction, InstanceAction, NamespaceAction, NamespaceArgs};
use crate::{AppError, IoStreams, output};

pub(super) fn execute_class<W: Write, E: Write>(
    action: ClassAction,
    session: &Session<'_>,
    io: &mut IoStreams<'_, W, E>,
) -> Result<u8, AppError> {
    let (operation, targets) = match action {
        ClassAction::Enumerate {
            class_name,
            names_only,
            targets,
        } => (
            Operation::EnumerateClasses {
                class_name,
                names_only,
            },
            targets,
        ),
        ClassAction::Get {
            class_name,
            targets,
        } => (Operation::GetClass { class_name }, targets),
    };
    run(session, io, &operation, &targets)
}

pub(super) fn execute_instance<W: Write, E: Write>(
    action: InstanceAction,
    session: &Session<'_>,
    io: &mut IoStreams<'_, W, E>,
) -> Result<u8, AppError> {
    let (operation, targets) = match action {
        InstanceAction::Enumerate {
            class_name,
            names_only,
            targets,
        } => (
            Operation::EnumerateInstances {
                class_name,
                names_only,
            },
            targets,
        ),
        InstanceAction::Get { path, targets } => (Operation::GetInstance { path }, targets),
        InstanceAction::Count { pattern, targets } => (
            Operation::CountInstances {
                class_pattern: pattern,
            },
            targets,
        ),
    };
    run(session, io, &operation, &targets)
}

pub(super) fn execute_namespace<W: Write, E: Write>(
    action: NamespaceAction,
    session: &Session<'_>,
    io: &mut IoStreams<'_, W, E>,
) -> Result<u8, AppError> {
    match action {
        NamespaceAction::List { targets } => {
            run(session, io, &Operation::EnumerateNamespaces, &targets)
        }
    }
}

/// Dispatches `operation` and renders the verdict.
///
/// Without `--namespace` the operation runs once in the default namespace.
fn run<W: Write, E: Write>(
    session: &Session<'_>,
    io: &mut IoStreams<'_, W, E>,
    operation: &Operation,
    targets: &NamespaceArgs,
) -> Result<u8, AppError> {
    let current = session.require_current()?;
    let ordering = if targets.object_order {
        OrderingMode::ObjectOrder
    } else {
        OrderingMode::NamespaceOrder
    };
    let request =
        NamespaceRequest::parse(&targets.namespaces, &current.default_namespace, ordering);
    let mut connection = session.factory.connect(&current)?;
    let report = NamespaceDispatcher::new().run(connection.as_mut(), &request, operation);

    let verdict = ExitStatusPolicy::evaluate(&report);
    if let Verdict::ConnectionFailed { namespace, error } = verdict {
        writeln!(io.stderr, "{error} (namespace {namespace})")?;
        return Ok(verdict.exit_status());
    }

    let aggregator = ResultAggregator::new(&report.outcomes, request.ordering());
    let summary = aggregator.summarize();
    info!(
        target: "wbemcli::dispatch",
        operation = operation.name(),
        namespaces = summary.namespaces.len(),
        failed = summary.namespaces.iter().filter(|entry| entry.failed).count(),
        total = summary.total,
        "dispatch complete"
    );
    if verdict.emits_output() {
        output::write_objects(io.stdout, session.format, &aggregator.ordered())?;
    }
    io.stdout.flush()?;
    if verdict.reports_failures() {
        output::write_failures(io.stderr, &ExitStatusPolicy::failure_records(&report))?;
    }
    Ok(verdict.exit_status())
}
