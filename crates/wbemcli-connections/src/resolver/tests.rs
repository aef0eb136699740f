use super::*;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::definition::{DEFAULT_TIMEOUT, UsePull};
use crate::error::StoreError;

struct Workspace {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl Workspace {
    fn store(&self) -> ConnectionStore {
        ConnectionStore::open(self.path.clone()).expect("open store")
    }

    fn seeded(&self) -> ConnectionStore {
        let mut store = self.store();
        let mut definition = ConnectionDefinition::with_server("blah", "http://junkhost");
        definition.user = Some("fred".to_owned());
        definition.default_namespace = "interop".to_owned();
        definition.timeout = Some(45);
        store.upsert("blah", definition).expect("upsert blah");
        store
            .upsert(
                "mocked",
                ConnectionDefinition::with_mock_server("mocked", vec![Utf8PathBuf::from("model.yaml")]),
            )
            .expect("upsert mocked");
        store
    }
}

#[fixture]
fn workspace() -> Workspace {
    let dir = TempDir::new().expect("create temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
    Workspace {
        path: root.join("connections.yaml"),
        _dir: dir,
    }
}

fn set<T>(value: T) -> OptionValue<T> {
    OptionValue::Set(value)
}

fn server(url: &str) -> ConnectionOptions {
    ConnectionOptions {
        server: set(url.to_owned()),
        ..ConnectionOptions::default()
    }
}

fn named(name: &str) -> ConnectionOptions {
    ConnectionOptions {
        name: set(name.to_owned()),
        ..ConnectionOptions::default()
    }
}

#[rstest]
fn nothing_configured_resolves_to_none(workspace: Workspace) {
    let store = workspace.store();
    let resolved = ConnectionResolver::new(&store)
        .resolve(ConnectionOptions::default(), ConnectionOptions::default())
        .expect("resolve");
    assert!(resolved.is_none());
}

#[rstest]
fn server_option_applies_defaults(workspace: Workspace) {
    let store = workspace.store();
    let connection = ConnectionResolver::new(&store)
        .resolve(server("http://junkhost"), ConnectionOptions::default())
        .expect("resolve")
        .expect("connection");
    assert_eq!(connection.origin, ConnectionOrigin::Options);
    assert_eq!(connection.server_url(), Some("http://junkhost"));
    assert_eq!(connection.default_namespace, DEFAULT_NAMESPACE);
    assert_eq!(connection.timeout, None);
    assert_eq!(connection.timeout(), DEFAULT_TIMEOUT);
    assert!(connection.verify);
    assert_eq!(connection.use_pull, UsePull::Either);
    assert_eq!(connection.pull_max_cnt, DEFAULT_PULL_MAX_CNT);
}

#[rstest]
#[case(
    ConnectionOptions { name: set("a".to_owned()), server: set("http://h".to_owned()), ..ConnectionOptions::default() }
)]
#[case(
    ConnectionOptions { name: set("a".to_owned()), mock_server: set(vec![Utf8PathBuf::from("m.yaml")]), ..ConnectionOptions::default() }
)]
#[case(
    ConnectionOptions { server: set("http://h".to_owned()), mock_server: set(vec![Utf8PathBuf::from("m.yaml")]), ..ConnectionOptions::default() }
)]
fn selectors_are_mutually_exclusive(workspace: Workspace, #[case] cli: ConnectionOptions) {
    let store = workspace.store();
    let error = ConnectionResolver::new(&store)
        .resolve(cli, ConnectionOptions::default())
        .expect_err("conflict");
    assert!(matches!(error, ResolveError::ConfigConflict { .. }));
    assert_eq!(error.exit_status(), 2);
}

#[rstest]
fn command_line_selector_hides_environment_selector(workspace: Workspace) {
    let store = workspace.store();
    let env = ConnectionOptions {
        mock_server: set(vec![Utf8PathBuf::from("m.yaml")]),
        ..ConnectionOptions::default()
    };
    let connection = ConnectionResolver::new(&store)
        .resolve(server("http://junkhost"), env)
        .expect("resolve")
        .expect("connection");
    assert!(!connection.is_mock());
}

#[rstest]
fn name_without_repository_file_is_reported(workspace: Workspace) {
    let store = workspace.store();
    let error = ConnectionResolver::new(&store)
        .resolve(named("blah"), ConnectionOptions::default())
        .expect_err("missing file");
    assert!(matches!(
        error,
        ResolveError::Store(StoreError::ConnectionFileNotFound { .. })
    ));
    assert_eq!(error.exit_status(), 1);
}

#[rstest]
fn unknown_name_is_not_found(workspace: Workspace) {
    let store = workspace.seeded();
    let error = ConnectionResolver::new(&store)
        .resolve(named("nope"), ConnectionOptions::default())
        .expect_err("unknown name");
    assert!(matches!(error, ResolveError::Store(StoreError::NotFound { .. })));
}

#[rstest]
fn named_definition_is_overlaid_by_options(workspace: Workspace) {
    let store = workspace.seeded();
    let cli = ConnectionOptions {
        timeout: set(10),
        ..named("blah")
    };
    let env = ConnectionOptions {
        default_namespace: set("root/other".to_owned()),
        ..ConnectionOptions::default()
    };
    let connection = ConnectionResolver::new(&store)
        .resolve(cli, env)
        .expect("resolve")
        .expect("connection");
    assert_eq!(connection.origin, ConnectionOrigin::Named("blah".to_owned()));
    assert_eq!(connection.user.as_deref(), Some("fred"));
    assert_eq!(connection.timeout(), 10);
    assert_eq!(connection.default_namespace, "root/other");
}

#[rstest]
fn empty_value_clears_inherited_field(workspace: Workspace) {
    let store = workspace.seeded();
    let cli = ConnectionOptions {
        user: OptionValue::Cleared,
        ..named("blah")
    };
    let connection = ConnectionResolver::new(&store)
        .resolve(cli, ConnectionOptions::default())
        .expect("resolve")
        .expect("connection");
    assert!(connection.user.is_none());
}

#[rstest]
fn default_connection_used_without_selectors(workspace: Workspace) {
    let mut store = workspace.seeded();
    store.set_default("blah").expect("set default");
    let connection = ConnectionResolver::new(&store)
        .resolve(ConnectionOptions::default(), ConnectionOptions::default())
        .expect("resolve")
        .expect("connection");
    assert_eq!(connection.origin, ConnectionOrigin::Default("blah".to_owned()));
    assert_eq!(connection.default_namespace, "interop");
    assert_eq!(connection.timeout(), 45);
}

#[rstest]
fn cleared_selector_suppresses_default(workspace: Workspace) {
    let mut store = workspace.seeded();
    store.set_default("blah").expect("set default");
    let cli = ConnectionOptions {
        server: OptionValue::Cleared,
        ..ConnectionOptions::default()
    };
    let resolved = ConnectionResolver::new(&store)
        .resolve(cli, ConnectionOptions::default())
        .expect("resolve");
    assert!(resolved.is_none());
}

#[rstest]
fn mock_with_user_conflicts(workspace: Workspace) {
    let store = workspace.seeded();
    let cli = ConnectionOptions {
        user: set("fred".to_owned()),
        ..named("mocked")
    };
    let error = ConnectionResolver::new(&store)
        .resolve(cli, ConnectionOptions::default())
        .expect_err("conflict");
    assert!(matches!(error, ResolveError::ConfigConflict { .. }));
}

#[rstest]
fn keyfile_without_certfile_conflicts(workspace: Workspace) {
    let store = workspace.store();
    let cli = ConnectionOptions {
        keyfile: set(Utf8PathBuf::from("client.key")),
        ..server("https://host")
    };
    let error = ConnectionResolver::new(&store)
        .resolve(cli, ConnectionOptions::default())
        .expect_err("conflict");
    assert!(matches!(error, ResolveError::ConfigConflict { .. }));
}

#[rstest]
fn cleared_certfile_leaves_inherited_keyfile_unpaired(workspace: Workspace) {
    let mut store = workspace.store();
    let mut definition = ConnectionDefinition::with_server("tls", "https://host");
    definition.certfile = Some(Utf8PathBuf::from("client.pem"));
    definition.keyfile = Some(Utf8PathBuf::from("client.key"));
    store.upsert("tls", definition).expect("upsert tls");
    let cli = ConnectionOptions {
        certfile: OptionValue::Cleared,
        ..named("tls")
    };
    let error = ConnectionResolver::new(&store)
        .resolve(cli, ConnectionOptions::default())
        .expect_err("conflict");
    assert!(matches!(error, ResolveError::ConfigConflict { .. }));
    assert_eq!(error.exit_status(), 2);
}

#[rstest]
fn inherited_default_timeout_is_not_saved(workspace: Workspace) {
    let store = workspace.seeded();
    let connection = ConnectionResolver::new(&store)
        .resolve(named("mocked"), ConnectionOptions::default())
        .expect("resolve")
        .expect("connection");
    assert_eq!(connection.to_definition("copy").timeout, None);

    let connection = ConnectionResolver::new(&store)
        .resolve(named("blah"), ConnectionOptions::default())
        .expect("resolve")
        .expect("connection");
    assert_eq!(connection.to_definition("copy").timeout, Some(45));
}

#[rstest]
#[case(
    ConnectionOptions { name: set("blah".to_owned()), server: set("http://h".to_owned()), ..ConnectionOptions::default() },
    ConnectionOptions::default()
)]
#[case(
    ConnectionOptions::default(),
    ConnectionOptions { server: set("http://h".to_owned()), mock_server: set(vec![Utf8PathBuf::from("m.yaml")]), ..ConnectionOptions::default() }
)]
#[case(
    ConnectionOptions { user: set("fred".to_owned()), mock_server: set(vec![Utf8PathBuf::from("m.yaml")]), ..ConnectionOptions::default() },
    ConnectionOptions::default()
)]
fn option_checks_reject_conflicts(#[case] cli: ConnectionOptions, #[case] env: ConnectionOptions) {
    let error = ConnectionResolver::check_options(&cli, &env).expect_err("conflict");
    assert!(matches!(error, ResolveError::ConfigConflict { .. }));
    assert_eq!(error.exit_status(), 2);
}

#[rstest]
#[case(server("ftp://junkhost"))]
#[case(ConnectionOptions { timeout: set(0), ..named("blah") })]
fn option_checks_reject_invalid_values(#[case] cli: ConnectionOptions) {
    let error = ConnectionResolver::check_options(&cli, &ConnectionOptions::default())
        .expect_err("invalid value");
    assert!(matches!(error, ResolveError::InvalidValue { .. }));
}

#[rstest]
#[case(named("nope"))]
#[case(server("junkhost"))]
#[case(ConnectionOptions::default())]
fn option_checks_do_not_need_the_repository(#[case] cli: ConnectionOptions) {
    assert!(ConnectionResolver::check_options(&cli, &ConnectionOptions::default()).is_ok());
}

#[rstest]
fn timeout_above_limit_is_invalid(workspace: Workspace) {
    let store = workspace.store();
    let cli = ConnectionOptions {
        timeout: set(301),
        ..server("https://host")
    };
    let error = ConnectionResolver::new(&store)
        .resolve(cli, ConnectionOptions::default())
        .expect_err("invalid timeout");
    assert!(matches!(error, ResolveError::InvalidValue { option: "--timeout", .. }));
    assert_eq!(error.exit_status(), 2);
}

#[rstest]
#[case("junkhost", Some("https://junkhost"))]
#[case("http://junkhost:5988", Some("http://junkhost:5988"))]
#[case("ftp://junkhost", None)]
#[case("http://", None)]
fn server_urls_are_normalised(#[case] raw: &str, #[case] expected: Option<&str>) {
    assert_eq!(normalise_server_url(raw).ok().as_deref(), expected);
}
