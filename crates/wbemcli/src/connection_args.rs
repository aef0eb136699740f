//! Converts parsed connection flags into tri-state connection options.

use camino::Utf8PathBuf;
use wbemcli_connections::{
    ConnectionOptions, OptionValue, ResolveError, UsePull, parse_positive,
};

use crate::cli::ConnectionArgs;

/// Interprets the connection flags of one invocation.
///
/// Absent flags are unset and empty values clear inherited settings. A
/// single empty `--mock-server ""` clears the mock server list.
pub(crate) fn connection_options(args: &ConnectionArgs) -> Result<ConnectionOptions, ResolveError> {
    let string = |raw: Option<&String>| OptionValue::<String>::from_raw(raw.map(String::as_str));
    let path = |raw: Option<&String>| string(raw).map(Utf8PathBuf::from);

    let mock_server = match args.mock_server.as_slice() {
        [] => OptionValue::Unset,
        [only] if only.is_empty() => OptionValue::Cleared,
        files => OptionValue::Set(
            files
                .iter()
                .filter(|file| !file.is_empty())
                .map(Utf8PathBuf::from)
                .collect(),
        ),
    };
    let verify = if args.verify {
        OptionValue::Set(true)
    } else if args.no_verify {
        OptionValue::Set(false)
    } else {
        OptionValue::Unset
    };

    Ok(ConnectionOptions {
        name: string(args.name.as_ref()),
        server: string(args.server.as_ref()),
        mock_server,
        user: string(args.user.as_ref()),
        password: string(args.password.as_ref()),
        default_namespace: string(args.default_namespace.as_ref()),
        timeout: OptionValue::parse("--timeout", args.timeout.as_deref(), parse_positive)?,
        verify,
        certfile: path(args.certfile.as_ref()),
        keyfile: path(args.keyfile.as_ref()),
        ca_certs: path(args.ca_certs.as_ref()),
        use_pull: OptionValue::parse("--use-pull", args.use_pull.as_deref(), |raw| {
            raw.parse::<UsePull>()
        })?,
        pull_max_cnt: OptionValue::parse(
            "--pull-max-cnt",
            args.pull_max_cnt.as_deref(),
            parse_positive,
        )?,
    })
}
