//! Behavioural coverage for the dispatch pipeline against a mock server.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use wbemcli_connections::{ConnectionOrigin, ConnectionTarget, CurrentConnection, UsePull};
use wbemcli_dispatch::{
    ConnectionFactory, DefaultConnectionFactory, DispatchReport, DispatchState, ExitStatusPolicy,
    NamespaceDispatcher, NamespaceRequest, Operation, OrderingMode, ResultAggregator,
    WbemConnection,
};

#[derive(Default)]
struct World {
    connection: Option<Box<dyn WbemConnection>>,
    report: Option<DispatchReport>,
    ordering: OrderingMode,
}

impl World {
    fn report(&self) -> &DispatchReport {
        self.report.as_ref().expect("a dispatch has run")
    }

    fn dispatch(&mut self, class_name: String, namespaces: &str, ordering: OrderingMode) {
        let request = NamespaceRequest::parse([namespaces], "root/cimv2", ordering);
        let connection = self.connection.as_mut().expect("a mock server is configured");
        let operation = Operation::EnumerateInstances {
            class_name,
            names_only: false,
        };
        self.report = Some(NamespaceDispatcher::new().run(connection.as_mut(), &request, &operation));
        self.ordering = ordering;
    }

    fn emitted_paths(&self) -> Vec<String> {
        let report = self.report();
        if !ExitStatusPolicy::evaluate(report).emits_output() {
            return Vec::new();
        }
        ResultAggregator::new(&report.outcomes, self.ordering)
            .ordered()
            .into_iter()
            .map(|object| object.display_name().to_owned())
            .collect()
    }
}

#[fixture]
fn world() -> RefCell<World> {
    RefCell::new(World::default())
}

fn fixture_path(name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[given("a mock server from {file}")]
fn given_mock_server(world: &RefCell<World>, file: String) {
    let current = CurrentConnection {
        origin: ConnectionOrigin::Options,
        target: ConnectionTarget::Mock(vec![fixture_path(&file)]),
        user: None,
        password: None,
        default_namespace: "root/cimv2".to_owned(),
        timeout: None,
        verify: true,
        certfile: None,
        keyfile: None,
        ca_certs: None,
        use_pull: UsePull::Either,
        pull_max_cnt: 1000,
    };
    let connection = DefaultConnectionFactory
        .connect(&current)
        .expect("mock model loads");
    world.borrow_mut().connection = Some(connection);
}

#[when("instances of {class} are enumerated in {namespaces}")]
fn when_enumerated(world: &RefCell<World>, class: String, namespaces: String) {
    world
        .borrow_mut()
        .dispatch(class, &namespaces, OrderingMode::NamespaceOrder);
}

#[when("instances of {class} are interleaved by object across {namespaces}")]
fn when_interleaved(world: &RefCell<World>, class: String, namespaces: String) {
    world
        .borrow_mut()
        .dispatch(class, &namespaces, OrderingMode::ObjectOrder);
}

#[then("the exit status is {status}")]
fn then_exit_status(world: &RefCell<World>, status: u8) {
    let world = world.borrow();
    assert_eq!(ExitStatusPolicy::evaluate(world.report()).exit_status(), status);
}

#[then("{count} objects are emitted")]
fn then_object_count(world: &RefCell<World>, count: usize) {
    assert_eq!(world.borrow().emitted_paths().len(), count);
}

#[then("no failures are reported")]
fn then_no_failures(world: &RefCell<World>) {
    assert!(ExitStatusPolicy::failure_records(world.borrow().report()).is_empty());
}

#[then("a {status} failure is reported for {namespace}")]
fn then_failure_reported(world: &RefCell<World>, status: String, namespace: String) {
    let world = world.borrow();
    let records = ExitStatusPolicy::failure_records(world.report());
    assert_eq!(records.len(), 1);
    let record = records.first().expect("one failure record");
    assert_eq!(record.namespace, namespace);
    assert_eq!(record.error.status.to_string(), status);
}

#[then("the run stopped at {namespace}")]
fn then_stopped_at(world: &RefCell<World>, namespace: String) {
    let world = world.borrow();
    match &world.report().state {
        DispatchState::ConnectionFailed {
            namespace: failed, ..
        } => assert_eq!(failed, &namespace),
        DispatchState::Completed => panic!("dispatch completed unexpectedly"),
    }
    assert!(world.report().outcomes.is_empty());
}

#[then("the emitted paths are {paths}")]
fn then_emitted_paths(world: &RefCell<World>, paths: String) {
    let expected: Vec<&str> = paths.split(',').collect();
    assert_eq!(world.borrow().emitted_paths(), expected);
}

#[scenario(path = "tests/features/namespace_dispatch.feature")]
fn namespace_dispatch_behaviour(world: RefCell<World>) {
    let _ = world;
}
