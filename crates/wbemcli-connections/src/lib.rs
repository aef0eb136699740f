//! Connection repository and connection resolution for the WBEM CLI.
//!
//! Named connection definitions persist in a single YAML file managed by
//! [`ConnectionStore`]. [`ConnectionResolver`] layers command-line options,
//! `PYWBEMCLI_*` environment variables, and the selected or default
//! definition into the [`CurrentConnection`] used by every server operation.

mod current;
mod definition;
mod error;
mod option_value;
mod options;
mod repository;
mod resolver;
mod store;

pub use current::{ConnectionOrigin, ConnectionTarget, CurrentConnection};
pub use definition::{
    ConnectionDefinition, DEFAULT_NAMESPACE, DEFAULT_PULL_MAX_CNT, DEFAULT_TIMEOUT,
    DefinitionError, MAX_TIMEOUT, UsePull,
};
pub use error::{EXIT_FAILURE, EXIT_USAGE, ResolveError, StoreError};
pub use option_value::{OptionValue, parse_bool, parse_positive};
pub use options::{
    ConnectionOptions, ENV_CA_CERTS, ENV_CERTFILE, ENV_DEFAULT_NAMESPACE, ENV_KEYFILE,
    ENV_MOCK_SERVER, ENV_NAME, ENV_PASSWORD, ENV_PULL_MAX_CNT, ENV_SERVER, ENV_TIMEOUT,
    ENV_USE_PULL, ENV_USER, ENV_VERIFY, Environment, ProcessEnvironment,
};
pub use repository::ConnectionRepository;
pub use resolver::{ConnectionResolver, normalise_server_url};
pub use store::ConnectionStore;
