//! Merges command-line options, environment variables, and stored
//! definitions into the current connection.
//!
//! Precedence, highest first: command line, environment, the selected (or
//! default) definition, built-in defaults. The connection-selecting options
//! (`--name`, `--server`, `--mock-server`) are taken as a group from the
//! highest source that mentions any of them and are mutually exclusive within
//! it.

use camino::Utf8PathBuf;
use tracing::debug;
use url::Url;

use crate::current::{ConnectionOrigin, ConnectionTarget, CurrentConnection};
use crate::definition::{
    ConnectionDefinition, DEFAULT_NAMESPACE, DEFAULT_PULL_MAX_CNT, MAX_TIMEOUT,
};
use crate::error::ResolveError;
use crate::option_value::OptionValue;
use crate::options::ConnectionOptions;
use crate::store::ConnectionStore;

const RESOLVER_TARGET: &str = "wbemcli::resolver";

/// How the connection was selected.
enum Selection {
    Name(String),
    Server(String),
    Mock(Vec<Utf8PathBuf>),
    /// Selectors were given but all of them were cleared.
    Cleared,
    /// No selector anywhere; fall back to the default definition.
    Inherit,
}

/// Produces the current connection from all configuration sources.
#[derive(Debug)]
pub struct ConnectionResolver<'a> {
    store: &'a ConnectionStore,
}

impl<'a> ConnectionResolver<'a> {
    /// Creates a resolver reading definitions from `store`.
    #[must_use]
    pub const fn new(store: &'a ConnectionStore) -> Self {
        Self { store }
    }

    /// Resolves the current connection.
    ///
    /// Returns `Ok(None)` when no source names a target server.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ConfigConflict`] for contradictory options,
    /// [`ResolveError::InvalidValue`] for out-of-range values, and store
    /// errors when a named definition cannot be found.
    pub fn resolve(
        &self,
        cli: ConnectionOptions,
        env: ConnectionOptions,
    ) -> Result<Option<CurrentConnection>, ResolveError> {
        let selection = choose(&cli, &env)?;
        let merged = cli.over(env);

        let (origin, base) = match &selection {
            Selection::Name(name) => (
                ConnectionOrigin::Named(name.clone()),
                Some(self.store.select(name)?.clone()),
            ),
            Selection::Inherit => match self.store.repository().default_definition() {
                Some(definition) => (
                    ConnectionOrigin::Default(definition.name.clone()),
                    Some(definition.clone()),
                ),
                None => (ConnectionOrigin::Options, None),
            },
            Selection::Server(_) | Selection::Mock(_) | Selection::Cleared => {
                (ConnectionOrigin::Options, None)
            }
        };

        let target = match selection {
            Selection::Server(url) => Some(ConnectionTarget::Server(normalise_server_url(&url)?)),
            Selection::Mock(files) => Some(ConnectionTarget::Mock(files)),
            Selection::Cleared => None,
            Selection::Name(_) | Selection::Inherit => base.as_ref().and_then(definition_target),
        };
        let Some(target) = target else {
            debug!(target: RESOLVER_TARGET, "no connection target configured");
            return Ok(None);
        };

        let connection = build_connection(origin, target, merged, base)?;
        debug!(
            target: RESOLVER_TARGET,
            name = connection.name().unwrap_or(""),
            mock = connection.is_mock(),
            namespace = %connection.default_namespace,
            "resolved current connection"
        );
        Ok(Some(connection))
    }

    /// Rejects contradictory options without reading any definition.
    ///
    /// Commands that never resolve a connection, such as `connection delete`,
    /// still run this so conflicting selectors fail before the repository
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ConfigConflict`] for conflicting selectors or
    /// identity options given with a mock server, and
    /// [`ResolveError::InvalidValue`] for a malformed server URL or an
    /// out-of-range timeout.
    pub fn check_options(
        cli: &ConnectionOptions,
        env: &ConnectionOptions,
    ) -> Result<(), ResolveError> {
        let merged = cli.clone().over(env.clone());
        match choose(cli, env)? {
            Selection::Server(url) => {
                normalise_server_url(&url)?;
            }
            Selection::Mock(_) => reject_mock_identity(&merged)?,
            Selection::Name(_) | Selection::Cleared | Selection::Inherit => {}
        }
        if let OptionValue::Set(timeout) = &merged.timeout {
            check_timeout(*timeout)?;
        }
        Ok(())
    }
}

/// Selectors come as a group from the highest source that mentions any.
fn choose(cli: &ConnectionOptions, env: &ConnectionOptions) -> Result<Selection, ResolveError> {
    if cli.selects_connection() {
        select(cli)
    } else {
        select(env)
    }
}

fn select(source: &ConnectionOptions) -> Result<Selection, ResolveError> {
    let given: Vec<&str> = [
        ("--name", source.name.is_set()),
        ("--server", source.server.is_set()),
        ("--mock-server", source.mock_server.is_set()),
    ]
    .into_iter()
    .filter_map(|(option, set)| set.then_some(option))
    .collect();
    if given.len() > 1 {
        return Err(ResolveError::conflict(format!(
            "{} are mutually exclusive",
            given.join(" and ")
        )));
    }

    let selection = match (&source.name, &source.server, &source.mock_server) {
        (OptionValue::Set(name), _, _) => Selection::Name(name.clone()),
        (_, OptionValue::Set(server), _) => Selection::Server(server.clone()),
        (_, _, OptionValue::Set(files)) if !files.is_empty() => Selection::Mock(files.clone()),
        _ if source.selects_connection() => Selection::Cleared,
        _ => Selection::Inherit,
    };
    Ok(selection)
}

fn definition_target(definition: &ConnectionDefinition) -> Option<ConnectionTarget> {
    if definition.is_mock() {
        Some(ConnectionTarget::Mock(definition.mock_server_files.clone()))
    } else {
        definition.server_url.clone().map(ConnectionTarget::Server)
    }
}

fn build_connection(
    origin: ConnectionOrigin,
    target: ConnectionTarget,
    merged: ConnectionOptions,
    base: Option<ConnectionDefinition>,
) -> Result<CurrentConnection, ResolveError> {
    if matches!(target, ConnectionTarget::Mock(_)) {
        reject_mock_identity(&merged)?;
    }

    let base = base.as_ref();
    let certfile = merged
        .certfile
        .resolve(base.and_then(|definition| definition.certfile.clone()));
    let keyfile = merged
        .keyfile
        .resolve(base.and_then(|definition| definition.keyfile.clone()));
    if keyfile.is_some() && certfile.is_none() {
        return Err(ResolveError::conflict("--keyfile requires --certfile"));
    }

    let timeout = merged
        .timeout
        .resolve(base.and_then(|definition| definition.timeout));
    if let Some(timeout) = timeout {
        check_timeout(timeout)?;
    }

    Ok(CurrentConnection {
        origin,
        target,
        user: merged
            .user
            .resolve(base.and_then(|definition| definition.user.clone())),
        password: merged
            .password
            .resolve(base.and_then(|definition| definition.password.clone())),
        default_namespace: merged
            .default_namespace
            .resolve(base.map(|definition| definition.default_namespace.clone()))
            .filter(|namespace| !namespace.is_empty())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_owned()),
        timeout,
        verify: merged
            .verify
            .resolve(base.map(|definition| definition.verify))
            .unwrap_or(true),
        certfile,
        keyfile,
        ca_certs: merged
            .ca_certs
            .resolve(base.and_then(|definition| definition.ca_certs.clone())),
        use_pull: merged
            .use_pull
            .resolve(base.map(|definition| definition.use_pull))
            .unwrap_or_default(),
        pull_max_cnt: merged
            .pull_max_cnt
            .resolve(base.map(|definition| definition.pull_max_cnt))
            .unwrap_or(DEFAULT_PULL_MAX_CNT),
    })
}

fn reject_mock_identity(merged: &ConnectionOptions) -> Result<(), ResolveError> {
    let rejected = merged.identity_options();
    if rejected.is_empty() {
        return Ok(());
    }
    Err(ResolveError::conflict(format!(
        "{} cannot be used with a mock server",
        rejected.join(", ")
    )))
}

fn check_timeout(timeout: u32) -> Result<(), ResolveError> {
    if (1..=MAX_TIMEOUT).contains(&timeout) {
        return Ok(());
    }
    Err(ResolveError::invalid_value(
        "--timeout",
        format!("{timeout} is outside the range 1..={MAX_TIMEOUT} seconds"),
    ))
}

/// Validates a server URL, assuming `https` when no scheme is given.
///
/// The accepted text is returned unchanged apart from the added scheme, so a
/// saved definition shows what the user typed.
///
/// # Errors
///
/// Returns [`ResolveError::InvalidValue`] for unparsable URLs, schemes other
/// than `http`/`https`, and URLs without a host.
pub fn normalise_server_url(raw: &str) -> Result<String, ResolveError> {
    let candidate = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&candidate)
        .map_err(|error| ResolveError::invalid_value("--server", format!("'{raw}': {error}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ResolveError::invalid_value(
            "--server",
            format!("unsupported scheme '{}' in '{raw}'", url.scheme()),
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ResolveError::invalid_value(
            "--server",
            format!("'{raw}' has no host"),
        ));
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests;
