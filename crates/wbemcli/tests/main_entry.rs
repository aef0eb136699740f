//! Integration tests for the `wbemcli` binary entry point.
//!
//! Verifies help output, a run with only built-in configuration, the exit
//! status for a missing connection, and the usage status for conflicting
//! selectors.

use anyhow::Result;
use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use tempfile::TempDir;

const SELECTOR_VARIABLES: [&str; 3] = [
    "PYWBEMCLI_NAME",
    "PYWBEMCLI_SERVER",
    "PYWBEMCLI_MOCK_SERVER",
];

const CONFIG_VARIABLES: [&str; 4] = [
    "PYWBEMCLI_CONNECTIONS_FILE",
    "PYWBEMCLI_LOG_FILTER",
    "PYWBEMCLI_LOG_FORMAT",
    "PYWBEMCLI_CONFIG_PATH",
];

const MODEL: &str = "\
namespaces:
  - name: interop
    classes:
      - name: CIM_Foo
";

fn isolated_command(dir: &TempDir) -> Command {
    let mut command = cargo_bin_cmd!("wbemcli");
    for variable in SELECTOR_VARIABLES {
        command.env_remove(variable);
    }
    command
        .arg("--connections-file")
        .arg(dir.path().join("connections.yaml"));
    command
}

#[test]
fn help_succeeds() {
    let mut command = cargo_bin_cmd!("wbemcli");
    command.arg("--help");
    command.assert().success().stdout(contains("connection"));
}

/// No configuration flags, file or variables: every setting is a default.
fn default_command(home: &TempDir) -> Command {
    let mut command = cargo_bin_cmd!("wbemcli");
    for variable in SELECTOR_VARIABLES.into_iter().chain(CONFIG_VARIABLES) {
        command.env_remove(variable);
    }
    command
        .current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"));
    command
}

#[test]
fn runs_with_built_in_configuration() -> Result<()> {
    let home = TempDir::new()?;
    let model = home.path().join("model.yaml");
    std::fs::write(&model, MODEL)?;

    default_command(&home)
        .arg("--mock-server")
        .arg(&model)
        .args(["namespace", "list"])
        .assert()
        .success()
        .stdout(contains("interop"));

    default_command(&home)
        .arg("--mock-server")
        .arg(&model)
        .args(["connection", "save", "mocked"])
        .assert()
        .success();
    assert!(
        home.path()
            .join("pywbemcli_connection_definitions.yaml")
            .is_file()
    );
    Ok(())
}

#[test]
fn missing_connection_exits_with_failure() -> Result<()> {
    let dir = TempDir::new()?;
    isolated_command(&dir)
        .args(["namespace", "list"])
        .assert()
        .code(1)
        .stderr(contains("no current connection"));
    Ok(())
}

#[test]
fn conflicting_selectors_exit_with_usage_status() -> Result<()> {
    let dir = TempDir::new()?;
    isolated_command(&dir)
        .args(["--name", "blah", "--server", "http://junkhost", "connection", "show"])
        .assert()
        .code(2)
        .stderr(contains("conflicting connection options"));
    Ok(())
}
