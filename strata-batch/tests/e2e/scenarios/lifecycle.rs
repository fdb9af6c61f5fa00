//! Session lifecycle: build -> assemble -> execute -> release.
//!
//! Validates the reactor fallback chain, baseline registration, the build
//! tool adapter fallback and release of the session scope.

use crate::helpers::config::*;
use crate::helpers::fixtures::*;

use strata_batch::components::{BASELINE_COMPONENTS, BaselineComponent};
use strata_batch::orchestrator::{ScanSession, SessionPhase};
use strata_batch::reactor::ReactorResolver;
use strata_core::error::StrataError;
use strata_core::pipeline::BuildToolExecutor;
use strata_core::scope::Scope;
use strata_core::types::{Module, ProjectTree};

/// Tree built from properties by the default bootstrapper, scanned post-order.
#[test]
fn test_e2e_run_with_default_bootstrapper() {
    // Given: a config describing P -> [A -> [D], B]
    let executor = RecordingExecutor::new();
    let session = ScanSession::builder()
        .config(pabd_config())
        .build()
        .expect("session should build");

    // When: running the session
    let summary = session.run(&executor).expect("run should succeed");

    // Then: every module is scanned children-first
    assert_eq!(summary.project, "p");
    assert_eq!(summary.scanned, vec!["d", "a", "b", "p"]);
    assert_eq!(executor.visits(), summary.scanned);
    assert!(summary.extensions.is_empty());
}

/// A bootstrapper bound in the session scope replaces the default one.
#[test]
fn test_e2e_bound_bootstrapper_is_used() {
    let bootstrapper = CountingBootstrapper::returning(pabd_tree());
    let calls = bootstrapper.calls();

    // properties would describe a different tree; the bound bootstrapper wins
    let config = TestConfigBuilder::new().project("ignored").build();
    let mut session = ScanSession::builder().config(config).build().unwrap();
    session.scope_mut().bind(bootstrapper.boxed()).unwrap();

    let summary = session.run(&RecordingExecutor::new()).unwrap();
    assert_eq!(summary.project, "p");
    assert_eq!(count(&calls), 1);
}

/// A tree already present in the parent scope is reused without bootstrapping.
#[test]
fn test_e2e_tree_in_parent_scope_skips_bootstrap() {
    let bootstrapper = CountingBootstrapper::returning(
        ProjectTree::new(Module::new("from-bootstrapper")).unwrap(),
    );
    let calls = bootstrapper.calls();

    let mut container = Scope::new("container");
    container.bind(pabd_tree()).unwrap();
    container.bind(bootstrapper.boxed()).unwrap();

    let summary = ScanSession::builder()
        .parent(&container)
        .build()
        .unwrap()
        .run(&RecordingExecutor::new())
        .unwrap();

    assert_eq!(summary.project, "p");
    assert_eq!(count(&calls), 0);
}

/// Resolving twice within one session returns the same tree, bootstrapping once.
#[test]
fn test_e2e_resolution_is_idempotent() {
    let bootstrapper = CountingBootstrapper::returning(pabd_tree());
    let calls = bootstrapper.calls();
    let mut session = ScanSession::builder().build().unwrap();
    session.scope_mut().bind(bootstrapper.boxed()).unwrap();

    session.assemble().unwrap();
    let first = session.project_tree().cloned().unwrap();

    let config = session.config().clone();
    let second = ReactorResolver::new()
        .resolve(session.scope_mut(), &config)
        .unwrap()
        .clone();

    assert_eq!(first, second);
    assert_eq!(count(&calls), 1);
}

/// Every baseline component is bound by name in the session scope.
#[test]
fn test_e2e_baseline_components_registered() {
    let mut session = ScanSession::builder().config(pabd_config()).build().unwrap();
    session.assemble().unwrap();

    for component in BASELINE_COMPONENTS {
        let bound = session
            .scope()
            .lookup_named::<BaselineComponent>(component.name())
            .unwrap_or_else(|| panic!("{} should be bound", component.name()));
        assert_eq!(bound, component);
    }
}

/// Without an adapter the no-op substitute is bound; a visible adapter is kept.
#[test]
fn test_e2e_build_tool_adapter_fallback() {
    struct GradleAdapter;

    impl BuildToolExecutor for GradleAdapter {
        fn name(&self) -> &str {
            "gradle"
        }

        fn execute(&self, _module: &Module, _goal: &str) -> Result<(), StrataError> {
            Ok(())
        }
    }

    // no adapter anywhere -> no-op bound locally
    let mut session = ScanSession::builder().config(pabd_config()).build().unwrap();
    session.assemble().unwrap();
    let adapter = session
        .scope()
        .lookup_local::<Box<dyn BuildToolExecutor>>()
        .expect("no-op adapter should be bound");
    assert_eq!(adapter.name(), "noop");

    // adapter in the parent scope -> nothing bound locally
    let mut container = Scope::new("container");
    let gradle: Box<dyn BuildToolExecutor> = Box::new(GradleAdapter);
    container.bind(gradle).unwrap();
    let mut session = ScanSession::builder()
        .config(pabd_config())
        .parent(&container)
        .build()
        .unwrap();
    session.assemble().unwrap();
    assert!(
        session
            .scope()
            .lookup_local::<Box<dyn BuildToolExecutor>>()
            .is_none()
    );
    let visible = session.scope().lookup::<Box<dyn BuildToolExecutor>>().unwrap();
    assert_eq!(visible.name(), "gradle");
}

/// Components bound in the session scope are released when `run` returns.
#[test]
fn test_e2e_session_scope_released_after_run() {
    let log = EventLog::default();
    let mut session = ScanSession::builder().config(pabd_config()).build().unwrap();
    session
        .scope_mut()
        .bind_component(ReleaseProbe::new("session-probe", &log))
        .unwrap();

    session.run(&RecordingExecutor::new()).unwrap();

    assert_eq!(snapshot(&log), vec!["released:session-probe"]);
}

/// Phases advance Created -> Assembled -> Completed and never re-enter.
#[test]
fn test_e2e_phases_advance_in_order() {
    let mut session = ScanSession::builder().config(pabd_config()).build().unwrap();
    assert_eq!(session.phase(), SessionPhase::Created);

    session.assemble().unwrap();
    assert_eq!(session.phase(), SessionPhase::Assembled);

    session.execute(&RecordingExecutor::new()).unwrap();
    assert_eq!(session.phase(), SessionPhase::Completed);

    assert!(session.assemble().is_err());
    assert!(session.execute(&RecordingExecutor::new()).is_err());
    assert_eq!(session.phase(), SessionPhase::Completed);
}
