//! Named connection definitions as stored in the repository file.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Namespace targeted when nothing else is configured.
pub const DEFAULT_NAMESPACE: &str = "root/cimv2";

/// Per-request timeout in seconds when nothing else is configured.
pub const DEFAULT_TIMEOUT: u32 = 30;

/// Upper bound accepted for the per-request timeout, in seconds.
pub const MAX_TIMEOUT: u32 = 300;

/// Maximum objects returned per pull request when nothing else is configured.
pub const DEFAULT_PULL_MAX_CNT: u32 = 1000;

/// Pull-operation policy for enumerations.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UsePull {
    /// Always use Open/Pull/Close sequences.
    Yes,
    /// Always use the traditional monolithic operations.
    No,
    /// Try pull operations first and fall back when unsupported.
    #[default]
    Either,
}

/// One named server configuration.
///
/// A definition targets either a real server (`server_url`) or a mock server
/// (`mock_server_files`), never both. Transport identity (user, password,
/// certificates) only makes sense for a real server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectionDefinition {
    /// Unique key of the definition.
    pub name: String,
    /// WBEM server URL, for example `https://host:5989`.
    #[serde(rename = "server", default)]
    pub server_url: Option<String>,
    /// User name for HTTP authentication.
    #[serde(default)]
    pub user: Option<String>,
    /// Password for HTTP authentication.
    #[serde(default)]
    pub password: Option<String>,
    /// Namespace used when a command names none.
    #[serde(rename = "default-namespace", default = "default_namespace")]
    pub default_namespace: String,
    /// Per-request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u32>,
    /// Pull-operation policy.
    #[serde(default)]
    pub use_pull: UsePull,
    /// Maximum objects per pull request.
    #[serde(default = "default_pull_max_cnt")]
    pub pull_max_cnt: u32,
    /// Whether the server TLS certificate is verified.
    #[serde(default = "default_verify")]
    pub verify: bool,
    /// Client certificate file.
    #[serde(default)]
    pub certfile: Option<Utf8PathBuf>,
    /// Private key file for the client certificate.
    #[serde(default)]
    pub keyfile: Option<Utf8PathBuf>,
    /// CA certificate bundle used to verify the server.
    #[serde(rename = "ca-certs", default)]
    pub ca_certs: Option<Utf8PathBuf>,
    /// Mock server model files, in load order.
    #[serde(rename = "mock-server", default)]
    pub mock_server_files: Vec<Utf8PathBuf>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_owned()
}

const fn default_pull_max_cnt() -> u32 {
    DEFAULT_PULL_MAX_CNT
}

const fn default_verify() -> bool {
    true
}

/// Violations of the definition invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The definition has no name.
    #[error("connection name must not be empty")]
    EmptyName,
    /// Both a server URL and mock server files were given.
    #[error("a connection cannot define both a server and mock server files")]
    ServerAndMock,
    /// A transport identity field was set on a mock definition.
    #[error("'{field}' is not valid for a mock server connection")]
    MockWithIdentity {
        /// Offending field name.
        field: &'static str,
    },
    /// A key file was given without a certificate file.
    #[error("'keyfile' requires 'certfile'")]
    KeyfileWithoutCertfile,
    /// The timeout is outside the accepted range.
    #[error("timeout {timeout} is outside the range 1..={MAX_TIMEOUT} seconds")]
    TimeoutOutOfRange {
        /// Rejected timeout.
        timeout: u32,
    },
    /// `pull_max_cnt` must be positive.
    #[error("pull_max_cnt must be a positive integer")]
    ZeroPullMaxCnt,
}

impl ConnectionDefinition {
    /// Creates a real-server definition with default settings.
    #[must_use]
    pub fn with_server(name: impl Into<String>, server_url: impl Into<String>) -> Self {
        Self {
            server_url: Some(server_url.into()),
            ..Self::empty(name)
        }
    }

    /// Creates a mock-server definition with default settings.
    #[must_use]
    pub fn with_mock_server(
        name: impl Into<String>,
        files: impl IntoIterator<Item = Utf8PathBuf>,
    ) -> Self {
        Self {
            mock_server_files: files.into_iter().collect(),
            ..Self::empty(name)
        }
    }

    fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server_url: None,
            user: None,
            password: None,
            default_namespace: default_namespace(),
            timeout: None,
            use_pull: UsePull::default(),
            pull_max_cnt: DEFAULT_PULL_MAX_CNT,
            verify: true,
            certfile: None,
            keyfile: None,
            ca_certs: None,
            mock_server_files: Vec::new(),
        }
    }

    /// Returns true when the definition targets a mock server.
    #[must_use]
    pub fn is_mock(&self) -> bool {
        !self.mock_server_files.is_empty()
    }

    /// Checks the definition invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        if self.is_mock() {
            if self.server_url.is_some() {
                return Err(DefinitionError::ServerAndMock);
            }
            if let Some(field) = self.identity_field() {
                return Err(DefinitionError::MockWithIdentity { field });
            }
        }
        if self.keyfile.is_some() && self.certfile.is_none() {
            return Err(DefinitionError::KeyfileWithoutCertfile);
        }
        if let Some(timeout) = self.timeout.filter(|value| !(1..=MAX_TIMEOUT).contains(value)) {
            return Err(DefinitionError::TimeoutOutOfRange { timeout });
        }
        if self.pull_max_cnt == 0 {
            return Err(DefinitionError::ZeroPullMaxCnt);
        }
        Ok(())
    }

    fn identity_field(&self) -> Option<&'static str> {
        [
            ("user", self.user.is_some()),
            ("password", self.password.is_some()),
            ("certfile", self.certfile.is_some()),
            ("keyfile", self.keyfile.is_some()),
            ("ca-certs", self.ca_certs.is_some()),
        ]
        .into_iter()
        .find_map(|(field, present)| present.then_some(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn server_definition_uses_defaults() {
        let definition = ConnectionDefinition::with_server("blah", "http://junkhost");
        assert_eq!(definition.default_namespace, DEFAULT_NAMESPACE);
        assert_eq!(definition.pull_max_cnt, DEFAULT_PULL_MAX_CNT);
        assert_eq!(definition.use_pull, UsePull::Either);
        assert!(definition.verify);
        assert!(!definition.is_mock());
        assert_eq!(definition.validate(), Ok(()));
    }

    #[test]
    fn mock_definition_rejects_server() {
        let mut definition =
            ConnectionDefinition::with_mock_server("mock", [Utf8PathBuf::from("model.yaml")]);
        definition.server_url = Some(String::from("http://junkhost"));
        assert_eq!(definition.validate(), Err(DefinitionError::ServerAndMock));
    }

    #[rstest]
    #[case::user("user")]
    #[case::password("password")]
    #[case::certfile("certfile")]
    #[case::ca_certs("ca-certs")]
    fn mock_definition_rejects_identity(#[case] field: &'static str) {
        let mut definition =
            ConnectionDefinition::with_mock_server("mock", [Utf8PathBuf::from("model.yaml")]);
        match field {
            "user" => definition.user = Some(String::from("fred")),
            "password" => definition.password = Some(String::from("secret")),
            "certfile" => definition.certfile = Some(Utf8PathBuf::from("cert.pem")),
            _ => definition.ca_certs = Some(Utf8PathBuf::from("ca.pem")),
        }
        assert_eq!(
            definition.validate(),
            Err(DefinitionError::MockWithIdentity { field })
        );
    }

    #[test]
    fn keyfile_requires_certfile() {
        let mut definition = ConnectionDefinition::with_server("srv", "https://host");
        definition.keyfile = Some(Utf8PathBuf::from("key.pem"));
        assert_eq!(
            definition.validate(),
            Err(DefinitionError::KeyfileWithoutCertfile)
        );
        definition.certfile = Some(Utf8PathBuf::from("cert.pem"));
        assert_eq!(definition.validate(), Ok(()));
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(MAX_TIMEOUT, true)]
    #[case(MAX_TIMEOUT + 1, false)]
    fn timeout_range(#[case] timeout: u32, #[case] valid: bool) {
        let mut definition = ConnectionDefinition::with_server("srv", "https://host");
        definition.timeout = Some(timeout);
        assert_eq!(definition.validate().is_ok(), valid);
    }

    #[test]
    fn zero_pull_max_cnt_is_rejected() {
        let mut definition = ConnectionDefinition::with_server("srv", "https://host");
        definition.pull_max_cnt = 0;
        assert_eq!(definition.validate(), Err(DefinitionError::ZeroPullMaxCnt));
    }

    #[test]
    fn blank_name_is_rejected() {
        let definition = ConnectionDefinition::with_server("  ", "https://host");
        assert_eq!(definition.validate(), Err(DefinitionError::EmptyName));
    }

    #[rstest]
    #[case("yes", UsePull::Yes)]
    #[case("No", UsePull::No)]
    #[case("EITHER", UsePull::Either)]
    fn use_pull_parses(#[case] raw: &str, #[case] expected: UsePull) {
        assert_eq!(raw.parse::<UsePull>(), Ok(expected));
    }
}
