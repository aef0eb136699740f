//! Shared fixtures for the CLI runtime tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsString;

use camino::Utf8PathBuf;
use rstest::fixture;
use tempfile::TempDir;
use wbemcli_config::Config;
use wbemcli_dispatch::DefaultConnectionFactory;

use crate::{AppError, ConfigLoader, IoStreams, Runtime};

pub(super) const MOCK_MODEL: &str = r#"
namespaces:
  - name: root/cimv2
    classes:
      - name: CIM_Foo
        properties:
          InstanceID: string
      - name: CIM_Foo_sub
        superclass: CIM_Foo
    instances:
      - class: CIM_Foo
        keys:
          InstanceID: CIM_Foo1
      - class: CIM_Foo
        keys:
          InstanceID: CIM_Foo2
  - name: interop
    classes:
      - name: CIM_Foo
    instances:
      - class: CIM_Foo
        keys:
          InstanceID: interop1
  - name: root/slow
    fault: timeout
"#;

pub(super) struct StaticConfigLoader {
    config: Config,
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

pub(super) struct TestWorld {
    dir: TempDir,
    pub(super) env: HashMap<String, String>,
    pub(super) model: Option<Utf8PathBuf>,
    pub(super) stdout: Vec<u8>,
    pub(super) stderr: Vec<u8>,
    pub(super) status: Option<u8>,
}

impl TestWorld {
    pub(super) fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temporary directory"),
            env: HashMap::new(),
            model: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            status: None,
        }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().join(name)).expect("utf-8 temp path")
    }

    pub(super) fn connections_file(&self) -> Utf8PathBuf {
        self.path("connections.yaml")
    }

    /// Writes the shared mock model and returns its path.
    pub(super) fn write_model(&self) -> Utf8PathBuf {
        let path = self.path("model.yaml");
        std::fs::write(&path, MOCK_MODEL).expect("write mock model");
        path
    }

    /// Runs the CLI with `args` after the program name.
    pub(super) fn run(&mut self, args: &[&str]) -> u8 {
        let loader = StaticConfigLoader {
            config: Config {
                log_filter: Some(String::from("off")),
                log_format: None,
                connections_file: Some(self.connections_file()),
            },
        };
        let runtime = Runtime {
            loader: &loader,
            environment: &self.env,
            factory: &DefaultConnectionFactory,
        };
        self.stdout.clear();
        self.stderr.clear();
        let argv = std::iter::once("wbemcli")
            .chain(args.iter().copied())
            .map(OsString::from);
        let status = runtime.run(argv, &mut IoStreams::new(&mut self.stdout, &mut self.stderr));
        self.status = Some(status);
        status
    }

    pub(super) fn stdout_text(&self) -> String {
        String::from_utf8(self.stdout.clone()).expect("utf-8 stdout")
    }

    pub(super) fn stderr_text(&self) -> String {
        String::from_utf8(self.stderr.clone()).expect("utf-8 stderr")
    }
}

#[fixture]
pub(super) fn cli() -> TestWorld {
    TestWorld::new()
}

#[fixture]
pub(super) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
