//! CLI argument definitions for the WBEM client.
//!
//! This module defines the command-line interface structure used by both the
//! runtime parser and the build script for manpage generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for command results.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// One line per object.
    #[default]
    Text,
    /// A single JSON array.
    Json,
}

/// Command-line interface for the WBEM client.
#[derive(Parser, Debug)]
#[command(
    name = "wbemcli",
    version,
    about = "Query WBEM servers through named connections",
    disable_help_subcommand = true
)]
pub(crate) struct Cli {
    /// Path of the connection repository file.
    #[arg(long, value_name = "FILE")]
    pub(crate) connections_file: Option<PathBuf>,
    /// Tracing filter directive, for example `debug` or `wbemcli::dispatch=trace`.
    #[arg(long, value_name = "FILTER")]
    pub(crate) log_filter: Option<String>,
    /// Log line format: `compact` or `json`.
    #[arg(long, value_name = "FORMAT")]
    pub(crate) log_format: Option<String>,
    /// Connection settings for this invocation.
    #[command(flatten)]
    pub(crate) connection: ConnectionArgs,
    /// Controls how results are rendered.
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) output: OutputFormat,
    /// Command to run.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Connection options. An empty value clears what a lower source supplies.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct ConnectionArgs {
    /// Selects a saved connection by name.
    #[arg(long, short = 'N', value_name = "NAME")]
    pub(crate) name: Option<String>,
    /// WBEM server URL, e.g. `https://host:5989`.
    #[arg(long, short = 's', value_name = "URL")]
    pub(crate) server: Option<String>,
    /// Mock server model file; repeat to merge several files.
    #[arg(long, short = 'm', value_name = "FILE")]
    pub(crate) mock_server: Vec<String>,
    /// User name for the server.
    #[arg(long, short = 'u', value_name = "USER")]
    pub(crate) user: Option<String>,
    /// Password for the server.
    #[arg(long, short = 'p', value_name = "PASSWORD")]
    pub(crate) password: Option<String>,
    /// Namespace used when a command names none.
    #[arg(long, short = 'd', value_name = "NAMESPACE")]
    pub(crate) default_namespace: Option<String>,
    /// Request timeout in seconds (1 to 300).
    #[arg(long, short = 't', value_name = "SECONDS")]
    pub(crate) timeout: Option<String>,
    /// Verifies the server certificate.
    #[arg(long, conflicts_with = "no_verify")]
    pub(crate) verify: bool,
    /// Skips server certificate verification.
    #[arg(long)]
    pub(crate) no_verify: bool,
    /// Client certificate file.
    #[arg(long, value_name = "FILE")]
    pub(crate) certfile: Option<String>,
    /// Client private key file; requires `--certfile`.
    #[arg(long, value_name = "FILE")]
    pub(crate) keyfile: Option<String>,
    /// CA certificate bundle used to verify the server.
    #[arg(long, value_name = "FILE")]
    pub(crate) ca_certs: Option<String>,
    /// Pull operation policy: `yes`, `no`, or `either`.
    #[arg(long, value_name = "POLICY")]
    pub(crate) use_pull: Option<String>,
    /// Maximum objects returned per pull request.
    #[arg(long, value_name = "COUNT")]
    pub(crate) pull_max_cnt: Option<String>,
}

/// Namespace selection shared by server operations.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct NamespaceArgs {
    /// Target namespace; repeat or separate with commas for several.
    #[arg(long = "namespace", short = 'n', value_name = "NAMESPACE")]
    pub(crate) namespaces: Vec<String>,
    /// Interleaves results from several namespaces object by object.
    #[arg(long)]
    pub(crate) object_order: bool,
}

/// Top-level command groups.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Manages saved connections.
    Connection {
        #[command(subcommand)]
        action: ConnectionAction,
    },
    /// Queries classes.
    Class {
        #[command(subcommand)]
        action: ClassAction,
    },
    /// Queries instances.
    Instance {
        #[command(subcommand)]
        action: InstanceAction,
    },
    /// Queries namespaces.
    Namespace {
        #[command(subcommand)]
        action: NamespaceAction,
    },
}

/// Connection repository commands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum ConnectionAction {
    /// Lists saved connections.
    List,
    /// Shows a saved connection, or the current one.
    Show {
        /// Connection name.
        name: Option<String>,
    },
    /// Saves the current connection under a name.
    Save {
        /// Connection name.
        name: String,
        /// Also makes it the default connection.
        #[arg(long)]
        set_default: bool,
    },
    /// Deletes a saved connection.
    Delete {
        /// Connection name.
        name: String,
    },
    /// Selects a saved connection.
    Select {
        /// Connection name.
        name: String,
        /// Persists the selection as the default connection.
        #[arg(long)]
        default: bool,
    },
    /// Checks that the current connection answers requests.
    Test,
    /// Prints shell `export` statements for the current connection.
    Export,
}

/// Class commands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum ClassAction {
    /// Enumerates classes, optionally below a class.
    Enumerate {
        /// Parent class.
        class_name: Option<String>,
        /// Returns class names only.
        #[arg(long)]
        names_only: bool,
        #[command(flatten)]
        targets: NamespaceArgs,
    },
    /// Retrieves one class.
    Get {
        /// Class name.
        class_name: String,
        #[command(flatten)]
        targets: NamespaceArgs,
    },
}

/// Instance commands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum InstanceAction {
    /// Enumerates the instances of a class.
    Enumerate {
        /// Class name.
        class_name: String,
        /// Returns instance paths only.
        #[arg(long)]
        names_only: bool,
        #[command(flatten)]
        targets: NamespaceArgs,
    },
    /// Retrieves one instance by path.
    Get {
        /// Instance path, e.g. `CIM_Foo.InstanceID="CIM_Foo1"`.
        path: String,
        #[command(flatten)]
        targets: NamespaceArgs,
    },
    /// Counts instances per class.
    Count {
        /// Class name pattern; `*` and `?` are wildcards.
        pattern: Option<String>,
        #[command(flatten)]
        targets: NamespaceArgs,
    },
}

/// Namespace commands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum NamespaceAction {
    /// Lists the namespaces of the server.
    List {
        #[command(flatten)]
        targets: NamespaceArgs,
    },
}
