//! Connection options supplied by one source (command line or environment).

use std::collections::HashMap;
use std::ffi::OsString;

use camino::Utf8PathBuf;

use crate::definition::UsePull;
use crate::error::ResolveError;
use crate::option_value::{OptionValue, parse_bool, parse_positive};

/// Environment variable naming a connection definition.
pub const ENV_NAME: &str = "PYWBEMCLI_NAME";
/// Environment variable carrying the server URL.
pub const ENV_SERVER: &str = "PYWBEMCLI_SERVER";
/// Environment variable listing mock server files.
pub const ENV_MOCK_SERVER: &str = "PYWBEMCLI_MOCK_SERVER";
/// Environment variable carrying the user name.
pub const ENV_USER: &str = "PYWBEMCLI_USER";
/// Environment variable carrying the password.
pub const ENV_PASSWORD: &str = "PYWBEMCLI_PASSWORD";
/// Environment variable carrying the default namespace.
pub const ENV_DEFAULT_NAMESPACE: &str = "PYWBEMCLI_DEFAULT_NAMESPACE";
/// Environment variable carrying the timeout in seconds.
pub const ENV_TIMEOUT: &str = "PYWBEMCLI_TIMEOUT";
/// Environment variable controlling certificate verification.
pub const ENV_VERIFY: &str = "PYWBEMCLI_VERIFY";
/// Environment variable carrying the client certificate file.
pub const ENV_CERTFILE: &str = "PYWBEMCLI_CERTFILE";
/// Environment variable carrying the client key file.
pub const ENV_KEYFILE: &str = "PYWBEMCLI_KEYFILE";
/// Environment variable carrying the CA certificate bundle.
pub const ENV_CA_CERTS: &str = "PYWBEMCLI_CA_CERTS";
/// Environment variable carrying the pull-operation policy.
pub const ENV_USE_PULL: &str = "PYWBEMCLI_USE_PULL";
/// Environment variable carrying the maximum objects per pull.
pub const ENV_PULL_MAX_CNT: &str = "PYWBEMCLI_PULL_MAX_CNT";

/// Source of environment variables.
pub trait Environment {
    /// Returns the value of `key`, if set.
    fn var(&self, key: &str) -> Option<OsString>;
}

/// Reads the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<OsString> {
        self.get(key).map(OsString::from)
    }
}

/// Connection options from a single source.
///
/// Every field is tri-state so an explicit empty value can clear what a
/// lower-precedence source would otherwise supply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Named definition to select.
    pub name: OptionValue<String>,
    /// Server URL.
    pub server: OptionValue<String>,
    /// Mock server model files.
    pub mock_server: OptionValue<Vec<Utf8PathBuf>>,
    /// User name.
    pub user: OptionValue<String>,
    /// Password.
    pub password: OptionValue<String>,
    /// Default namespace.
    pub default_namespace: OptionValue<String>,
    /// Timeout in seconds.
    pub timeout: OptionValue<u32>,
    /// Certificate verification.
    pub verify: OptionValue<bool>,
    /// Client certificate file.
    pub certfile: OptionValue<Utf8PathBuf>,
    /// Client key file.
    pub keyfile: OptionValue<Utf8PathBuf>,
    /// CA certificate bundle.
    pub ca_certs: OptionValue<Utf8PathBuf>,
    /// Pull-operation policy.
    pub use_pull: OptionValue<UsePull>,
    /// Maximum objects per pull.
    pub pull_max_cnt: OptionValue<u32>,
}

impl ConnectionOptions {
    /// Reads the `PYWBEMCLI_*` connection variables.
    ///
    /// Variables that are not valid UTF-8 are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidValue`] naming the variable when a value
    /// cannot be parsed.
    pub fn from_environment(env: &(impl Environment + ?Sized)) -> Result<Self, ResolveError> {
        let text = |key: &str| env.var(key).and_then(|value| value.into_string().ok());
        let string = |key: &str| OptionValue::<String>::from_raw(text(key).as_deref());
        let path = |key: &str| string(key).map(Utf8PathBuf::from);

        let mock_server = match text(ENV_MOCK_SERVER) {
            None => OptionValue::Unset,
            Some(raw) if raw.is_empty() => OptionValue::Cleared,
            Some(raw) => OptionValue::Set(
                std::env::split_paths(&raw)
                    .filter_map(|entry| Utf8PathBuf::from_path_buf(entry).ok())
                    .filter(|entry| !entry.as_str().is_empty())
                    .collect(),
            ),
        };

        Ok(Self {
            name: string(ENV_NAME),
            server: string(ENV_SERVER),
            mock_server,
            user: string(ENV_USER),
            password: string(ENV_PASSWORD),
            default_namespace: string(ENV_DEFAULT_NAMESPACE),
            timeout: OptionValue::parse(ENV_TIMEOUT, text(ENV_TIMEOUT).as_deref(), parse_positive)?,
            verify: OptionValue::parse(ENV_VERIFY, text(ENV_VERIFY).as_deref(), parse_bool)?,
            certfile: path(ENV_CERTFILE),
            keyfile: path(ENV_KEYFILE),
            ca_certs: path(ENV_CA_CERTS),
            use_pull: OptionValue::parse(ENV_USE_PULL, text(ENV_USE_PULL).as_deref(), |raw| {
                raw.parse::<UsePull>()
            })?,
            pull_max_cnt: OptionValue::parse(
                ENV_PULL_MAX_CNT,
                text(ENV_PULL_MAX_CNT).as_deref(),
                parse_positive,
            )?,
        })
    }

    /// Layers `self` over `lower`, field by field.
    #[must_use]
    pub fn over(self, lower: Self) -> Self {
        Self {
            name: self.name.or(lower.name),
            server: self.server.or(lower.server),
            mock_server: self.mock_server.or(lower.mock_server),
            user: self.user.or(lower.user),
            password: self.password.or(lower.password),
            default_namespace: self.default_namespace.or(lower.default_namespace),
            timeout: self.timeout.or(lower.timeout),
            verify: self.verify.or(lower.verify),
            certfile: self.certfile.or(lower.certfile),
            keyfile: self.keyfile.or(lower.keyfile),
            ca_certs: self.ca_certs.or(lower.ca_certs),
            use_pull: self.use_pull.or(lower.use_pull),
            pull_max_cnt: self.pull_max_cnt.or(lower.pull_max_cnt),
        }
    }

    /// Returns true when any of the connection-selecting options is present.
    #[must_use]
    pub const fn selects_connection(&self) -> bool {
        self.name.is_present() || self.server.is_present() || self.mock_server.is_present()
    }

    /// Names of the transport identity options given a value in this source.
    #[must_use]
    pub fn identity_options(&self) -> Vec<&'static str> {
        [
            ("--user", self.user.is_set()),
            ("--password", self.password.is_set()),
            ("--certfile", self.certfile.is_set()),
            ("--keyfile", self.keyfile.is_set()),
            ("--ca-certs", self.ca_certs.is_set()),
            ("--verify/--no-verify", self.verify.is_set()),
        ]
        .into_iter()
        .filter_map(|(option, set)| set.then_some(option))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn reads_connection_variables() {
        let options = ConnectionOptions::from_environment(&env(&[
            (ENV_SERVER, "https://host"),
            (ENV_USER, "fred"),
            (ENV_TIMEOUT, "12"),
            (ENV_VERIFY, "no"),
            (ENV_USE_PULL, "yes"),
        ]))
        .expect("valid environment");
        assert_eq!(options.server, OptionValue::Set(String::from("https://host")));
        assert_eq!(options.user, OptionValue::Set(String::from("fred")));
        assert_eq!(options.timeout, OptionValue::Set(12));
        assert_eq!(options.verify, OptionValue::Set(false));
        assert_eq!(options.use_pull, OptionValue::Set(UsePull::Yes));
        assert_eq!(options.password, OptionValue::Unset);
    }

    #[test]
    fn empty_variables_clear() {
        let options = ConnectionOptions::from_environment(&env(&[(ENV_USER, "")]))
            .expect("valid environment");
        assert_eq!(options.user, OptionValue::Cleared);
    }

    #[test]
    fn mock_server_variable_splits_paths() {
        let joined = std::env::join_paths(["a.yaml", "b.yaml"]).expect("join paths");
        let joined = joined.into_string().expect("utf8 paths");
        let options = ConnectionOptions::from_environment(&env(&[(ENV_MOCK_SERVER, &joined)]))
            .expect("valid environment");
        assert_eq!(
            options.mock_server,
            OptionValue::Set(vec![Utf8PathBuf::from("a.yaml"), Utf8PathBuf::from("b.yaml")])
        );
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let error = ConnectionOptions::from_environment(&env(&[(ENV_PULL_MAX_CNT, "0")]))
            .expect_err("zero is rejected");
        assert!(matches!(
            error,
            ResolveError::InvalidValue {
                option: ENV_PULL_MAX_CNT,
                ..
            }
        ));
    }

    #[test]
    fn higher_source_wins_field_by_field() {
        let cli = ConnectionOptions {
            user: OptionValue::Set(String::from("cli")),
            timeout: OptionValue::Cleared,
            ..ConnectionOptions::default()
        };
        let env = ConnectionOptions {
            user: OptionValue::Set(String::from("env")),
            password: OptionValue::Set(String::from("env-secret")),
            timeout: OptionValue::Set(10),
            ..ConnectionOptions::default()
        };
        let merged = cli.over(env);
        assert_eq!(merged.user, OptionValue::Set(String::from("cli")));
        assert_eq!(merged.password, OptionValue::Set(String::from("env-secret")));
        assert_eq!(merged.timeout, OptionValue::Cleared);
    }
}
