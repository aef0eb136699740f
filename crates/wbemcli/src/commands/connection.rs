//! `connection` subcommands.

use std::ffi::OsString;
use std::io::Write;

use tracing::info;
use wbemcli_connections::{
    ConnectionTarget, CurrentConnection, ENV_CA_CERTS, ENV_CERTFILE, ENV_DEFAULT_NAMESPACE,
    ENV_KEYFILE, ENV_MOCK_SERVER, ENV_NAME, ENV_PASSWORD, ENV_PULL_MAX_CNT, ENV_SERVER,
    ENV_TIMEOUT, ENV_USE_PULL, ENV_USER, ENV_VERIFY, StoreError,
};
use wbemcli_dispatch::{EXIT_SUCCESS, Operation};

use super::Session;
use crate::cli::ConnectionAction;
use crate::{AppError, IoStreams, output};

pub(super) fn execute<W: Write, E: Write>(
    action: ConnectionAction,
    session: &mut Session<'_>,
    io: &mut IoStreams<'_, W, E>,
) -> Result<u8, AppError> {
    match action {
        ConnectionAction::List => list(session, io),
        ConnectionAction::Show { name } => show(session, io, name.as_deref()),
        ConnectionAction::Save { name, set_default } => save(session, io, &name, set_default),
        ConnectionAction::Delete { name } => {
            session.store.delete(&name)?;
            writeln!(io.stdout, "Deleted connection {name}")?;
            Ok(EXIT_SUCCESS)
        }
        ConnectionAction::Select { name, default } => select(session, io, &name, default),
        ConnectionAction::Test => test(session, io),
        ConnectionAction::Export => export(session, io),
    }
}

fn list<W: Write, E: Write>(
    session: &Session<'_>,
    io: &mut IoStreams<'_, W, E>,
) -> Result<u8, AppError> {
    let current = session.current()?;
    let repository = session.store.repository();
    output::write_connection_list(
        io.stdout,
        session.format,
        repository.definitions(),
        repository.default_name(),
        current.as_ref().and_then(CurrentConnection::name),
    )?;
    Ok(EXIT_SUCCESS)
}

fn show<W: Write, E: Write>(
    session: &Session<'_>,
    io: &mut IoStreams<'_, W, E>,
    name: Option<&str>,
) -> Result<u8, AppError> {
    match name {
        Some(name) => {
            let definition = session.store.select(name)?;
            output::write_definition(io.stdout, session.format, definition)?;
        }
        None => {
            let current = session.require_current()?;
            output::write_current(io.stdout, session.format, &current)?;
        }
    }
    Ok(EXIT_SUCCESS)
}

fn save<W: Write, E: Write>(
    session: &mut Session<'_>,
    io: &mut IoStreams<'_, W, E>,
    name: &str,
    set_default: bool,
) -> Result<u8, AppError> {
    let definition = session.require_current()?.to_definition(name);
    session.store.transaction(|repository, path| {
        repository.upsert(name, definition)?;
        if set_default {
            repository.set_default(name, path)?;
        }
        Ok::<(), StoreError>(())
    })?;
    info!(target: "wbemcli::store", name, set_default, "saved connection");
    let suffix = if set_default { " as default" } else { "" };
    writeln!(io.stdout, "Saved connection {name}{suffix}")?;
    Ok(EXIT_SUCCESS)
}

fn select<W: Write, E: Write>(
    session: &mut Session<'_>,
    io: &mut IoStreams<'_, W, E>,
    name: &str,
    default: bool,
) -> Result<u8, AppError> {
    session.store.select(name)?;
    if default {
        session.store.set_default(name)?;
        writeln!(io.stdout, "Selected connection {name} as default")?;
    } else {
        writeln!(io.stdout, "Selected connection {name}")?;
    }
    Ok(EXIT_SUCCESS)
}

fn test<W: Write, E: Write>(
    session: &Session<'_>,
    io: &mut IoStreams<'_, W, E>,
) -> Result<u8, AppError> {
    let current = session.require_current()?;
    let mut connection = session.factory.connect(&current)?;
    let request = Operation::EnumerateClasses {
        class_name: None,
        names_only: true,
    };
    connection
        .perform(&current.default_namespace, &request)
        .map_err(AppError::ConnectionTest)?;
    let target = match &current.target {
        ConnectionTarget::Server(url) => url.clone(),
        ConnectionTarget::Mock(files) => format!("mock server ({} files)", files.len()),
    };
    writeln!(io.stdout, "Connection OK: {target}")?;
    Ok(EXIT_SUCCESS)
}

fn export<W: Write, E: Write>(
    session: &Session<'_>,
    io: &mut IoStreams<'_, W, E>,
) -> Result<u8, AppError> {
    let current = session.require_current()?;
    for (key, value) in export_variables(&current) {
        writeln!(io.stdout, "export {key}={}", shell_quote(&value))?;
    }
    Ok(EXIT_SUCCESS)
}

/// Environment variables that reproduce `current`.
fn export_variables(current: &CurrentConnection) -> Vec<(&'static str, String)> {
    let mut variables = Vec::new();
    match &current.target {
        ConnectionTarget::Server(url) => variables.push((ENV_SERVER, url.clone())),
        ConnectionTarget::Mock(files) => {
            let joined = std::env::join_paths(files.iter().map(|file| file.as_std_path()))
                .unwrap_or_else(|_| OsString::from(files.first().map_or("", |file| file.as_str())));
            variables.push((ENV_MOCK_SERVER, joined.to_string_lossy().into_owned()));
        }
    }
    if let Some(name) = current.name() {
        variables.push((ENV_NAME, name.to_owned()));
    }
    let optional = [
        (ENV_USER, current.user.clone()),
        (ENV_PASSWORD, current.password.clone()),
        (ENV_CERTFILE, current.certfile.as_ref().map(ToString::to_string)),
        (ENV_KEYFILE, current.keyfile.as_ref().map(ToString::to_string)),
        (ENV_CA_CERTS, current.ca_certs.as_ref().map(ToString::to_string)),
    ];
    variables.extend(optional.into_iter().filter_map(|(key, value)| value.map(|value| (key, value))));
    variables.push((ENV_DEFAULT_NAMESPACE, current.default_namespace.clone()));
    variables.push((ENV_TIMEOUT, current.timeout().to_string()));
    if !current.is_mock() {
        variables.push((ENV_VERIFY, current.verify.to_string()));
    }
    variables.push((ENV_USE_PULL, current.use_pull.to_string()));
    variables.push((ENV_PULL_MAX_CNT, current.pull_max_cnt.to_string()));
    variables
}

/// Quotes `value` for POSIX shells.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
