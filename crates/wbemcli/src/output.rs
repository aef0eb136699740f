//! Rendering of command results.
//!
//! Objects go to stdout; the per-namespace error report goes to stderr after
//! all objects so it cannot be mistaken for output of another namespace.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;
use wbemcli_connections::{ConnectionDefinition, CurrentConnection};
use wbemcli_dispatch::{CimObject, FailureRecord};

use crate::AppError;
use crate::cli::OutputFormat;

const REDACTED: &str = "******";

/// Writes objects in the selected format.
pub(crate) fn write_objects<W: Write>(
    out: &mut W,
    format: OutputFormat,
    objects: &[&CimObject],
) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => write_json(out, &objects),
        OutputFormat::Text => {
            for object in objects {
                writeln!(out, "{}", object_line(object))?;
            }
            Ok(())
        }
    }
}

/// One text line: `namespace:name` followed by `key=value` pairs.
pub(crate) fn object_line(object: &CimObject) -> String {
    let mut line = format!("{}:{}", object.namespace, object.display_name());
    if let Some(superclass) = &object.superclass {
        line.push_str(&format!(" superclass={superclass}"));
    }
    for (key, value) in &object.properties {
        match value {
            Value::String(text) => line.push_str(&format!(" {key}={text}")),
            other => line.push_str(&format!(" {key}={other}")),
        }
    }
    line
}

/// Writes the per-namespace failure report.
pub(crate) fn write_failures<E: Write>(
    err: &mut E,
    records: &[FailureRecord<'_>],
) -> Result<(), AppError> {
    for record in records {
        writeln!(err, "namespace {}: {}", record.namespace, record.error)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct ConnectionRow<'a> {
    name: &'a str,
    server: Option<&'a str>,
    mock_server: Vec<&'a str>,
    default_namespace: &'a str,
    default: bool,
    current: bool,
}

/// Writes the connection listing.
pub(crate) fn write_connection_list<'a, W, I>(
    out: &mut W,
    format: OutputFormat,
    definitions: I,
    default_name: Option<&str>,
    current_name: Option<&str>,
) -> Result<(), AppError>
where
    W: Write,
    I: IntoIterator<Item = &'a ConnectionDefinition>,
{
    let rows: Vec<ConnectionRow<'a>> = definitions
        .into_iter()
        .map(|definition| ConnectionRow {
            name: &definition.name,
            server: definition.server_url.as_deref(),
            mock_server: definition
                .mock_server_files
                .iter()
                .map(|file| file.as_str())
                .collect(),
            default_namespace: &definition.default_namespace,
            default: default_name == Some(definition.name.as_str()),
            current: current_name == Some(definition.name.as_str()),
        })
        .collect();
    match format {
        OutputFormat::Json => write_json(out, &rows),
        OutputFormat::Text => {
            for row in rows {
                let marker = match (row.current, row.default) {
                    (true, true) => "*#",
                    (true, false) => "* ",
                    (false, true) => " #",
                    (false, false) => "  ",
                };
                let target = row
                    .server
                    .map_or_else(|| row.mock_server.join(" "), str::to_owned);
                writeln!(out, "{marker} {}\t{target}\t{}", row.name, row.default_namespace)?;
            }
            Ok(())
        }
    }
}

/// Writes one saved definition with the password redacted.
pub(crate) fn write_definition<W: Write>(
    out: &mut W,
    format: OutputFormat,
    definition: &ConnectionDefinition,
) -> Result<(), AppError> {
    let mut shown = definition.clone();
    if shown.password.is_some() {
        shown.password = Some(REDACTED.to_owned());
    }
    match format {
        OutputFormat::Json => write_json(out, &shown),
        OutputFormat::Text => {
            let value = serde_json::to_value(&shown)?;
            if let Value::Object(fields) = value {
                for (key, value) in fields {
                    match value {
                        Value::Null => writeln!(out, "{key}:")?,
                        Value::String(text) => writeln!(out, "{key}: {text}")?,
                        other => writeln!(out, "{key}: {other}")?,
                    }
                }
            }
            Ok(())
        }
    }
}

/// Writes the current connection with the password redacted.
pub(crate) fn write_current<W: Write>(
    out: &mut W,
    format: OutputFormat,
    current: &CurrentConnection,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => write_definition(
            out,
            format,
            &current.to_definition(current.name().unwrap_or("")),
        ),
        OutputFormat::Text => {
            writeln!(out, "{current}")?;
            Ok(())
        }
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
