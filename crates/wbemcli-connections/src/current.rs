//! The effective connection of the running process.

use std::fmt;

use camino::Utf8PathBuf;

use crate::definition::{ConnectionDefinition, DEFAULT_TIMEOUT, UsePull};

/// What the current connection talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// A real WBEM server URL.
    Server(String),
    /// A mock server built from model files, in load order.
    Mock(Vec<Utf8PathBuf>),
}

/// Where the current connection came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionOrigin {
    /// Selected explicitly with `--name`.
    Named(String),
    /// The repository's default connection.
    Default(String),
    /// Built directly from `--server` or `--mock-server` options.
    Options,
}

/// Effective connection settings after layering every source.
///
/// Never persisted by itself; [`CurrentConnection::to_definition`] copies it
/// into a definition for an explicit save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentConnection {
    /// Provenance of the settings.
    pub origin: ConnectionOrigin,
    /// Server or mock target.
    pub target: ConnectionTarget,
    /// User name for HTTP authentication.
    pub user: Option<String>,
    /// Password for HTTP authentication.
    pub password: Option<String>,
    /// Namespace used when a command names none.
    pub default_namespace: String,
    /// Per-request timeout in seconds; `None` leaves the built-in default.
    pub timeout: Option<u32>,
    /// Whether the server certificate is verified.
    pub verify: bool,
    /// Client certificate file.
    pub certfile: Option<Utf8PathBuf>,
    /// Client key file.
    pub keyfile: Option<Utf8PathBuf>,
    /// CA certificate bundle.
    pub ca_certs: Option<Utf8PathBuf>,
    /// Pull-operation policy.
    pub use_pull: UsePull,
    /// Maximum objects per pull request.
    pub pull_max_cnt: u32,
}

impl CurrentConnection {
    /// Name of the definition the connection was built from, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.origin {
            ConnectionOrigin::Named(name) | ConnectionOrigin::Default(name) => Some(name.as_str()),
            ConnectionOrigin::Options => None,
        }
    }

    /// Effective per-request timeout in seconds.
    #[must_use]
    pub fn timeout(&self) -> u32 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Returns true for mock connections.
    #[must_use]
    pub const fn is_mock(&self) -> bool {
        matches!(self.target, ConnectionTarget::Mock(_))
    }

    /// Server URL, for real-server connections.
    #[must_use]
    pub fn server_url(&self) -> Option<&str> {
        match &self.target {
            ConnectionTarget::Server(url) => Some(url.as_str()),
            ConnectionTarget::Mock(_) => None,
        }
    }

    /// Mock model files, for mock connections.
    #[must_use]
    pub fn mock_server_files(&self) -> &[Utf8PathBuf] {
        match &self.target {
            ConnectionTarget::Mock(files) => files.as_slice(),
            ConnectionTarget::Server(_) => &[],
        }
    }

    /// Copies the connection into a definition named `name`.
    #[must_use]
    pub fn to_definition(&self, name: &str) -> ConnectionDefinition {
        ConnectionDefinition {
            name: name.to_owned(),
            server_url: self.server_url().map(str::to_owned),
            user: self.user.clone(),
            password: self.password.clone(),
            default_namespace: self.default_namespace.clone(),
            timeout: self.timeout,
            use_pull: self.use_pull,
            pull_max_cnt: self.pull_max_cnt,
            verify: self.verify,
            certfile: self.certfile.clone(),
            keyfile: self.keyfile.clone(),
            ca_certs: self.ca_certs.clone(),
            mock_server_files: self.mock_server_files().to_vec(),
        }
    }
}

fn optional<T: fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(String::new, ToString::to_string)
}

impl fmt::Display for CurrentConnection {
    /// Renders the settings one per line with the password redacted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name: {}", self.name().unwrap_or("(not saved)"))?;
        match &self.target {
            ConnectionTarget::Server(url) => writeln!(f, "server: {url}")?,
            ConnectionTarget::Mock(files) => {
                let files: Vec<&str> = files.iter().map(|file| file.as_str()).collect();
                writeln!(f, "mock-server: {}", files.join(", "))?;
            }
        }
        writeln!(f, "default-namespace: {}", self.default_namespace)?;
        writeln!(f, "user: {}", optional(self.user.as_ref()))?;
        let password = if self.password.is_some() { "******" } else { "" };
        writeln!(f, "password: {password}")?;
        writeln!(f, "timeout: {}", self.timeout())?;
        writeln!(f, "verify: {}", self.verify)?;
        writeln!(f, "certfile: {}", optional(self.certfile.as_ref()))?;
        writeln!(f, "keyfile: {}", optional(self.keyfile.as_ref()))?;
        writeln!(f, "ca-certs: {}", optional(self.ca_certs.as_ref()))?;
        writeln!(f, "use-pull: {}", self.use_pull)?;
        write!(f, "pull-max-cnt: {}", self.pull_max_cnt)
    }
}
