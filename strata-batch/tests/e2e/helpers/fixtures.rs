//! Test bootstrappers and module executors.
//!
//! Provides collaborators with observable behavior:
//! - [`CountingBootstrapper`] counts `bootstrap()` calls
//! - [`RecordingExecutor`] records the visit order and can fail on a given module
//! - [`ReleaseProbe`] is a component that logs its release into a shared log

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use strata_core::error::{ScanError, StrataError};
use strata_core::pipeline::{Component, ModuleExecutor, ProjectBootstrapper};
use strata_core::scope::Scope;
use strata_core::types::{Module, ProjectTree};

/// Shared ordered log of events (visits, releases).
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// Read a snapshot of an event log.
#[allow(dead_code)]
pub fn snapshot(log: &EventLog) -> Vec<String> {
    log.lock().expect("event log poisoned").clone()
}

/// The `P -> [A -> [D], B]` tree.
#[allow(dead_code)]
pub fn pabd_tree() -> ProjectTree {
    ProjectTree::new(
        Module::new("p")
            .with_child(Module::new("a").with_child(Module::new("d")))
            .with_child(Module::new("b")),
    )
    .expect("sample tree is valid")
}

// ─── Bootstrappers ──────────────────────────────────────────────────

/// A bootstrapper that counts invocations and returns a fixed outcome.
pub struct CountingBootstrapper {
    name: String,
    tree: Option<ProjectTree>,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl CountingBootstrapper {
    /// Returns `tree` on every call.
    pub fn returning(tree: ProjectTree) -> Self {
        Self {
            name: "counting-bootstrapper".to_owned(),
            tree: Some(tree),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns no tree (the fatal path).
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            tree: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter, readable after the bootstrapper is bound.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    /// Box the bootstrapper for binding into a scope.
    pub fn boxed(self) -> Box<dyn ProjectBootstrapper> {
        Box::new(self)
    }
}

impl ProjectBootstrapper for CountingBootstrapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn bootstrap(&self) -> Result<Option<ProjectTree>, StrataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tree.clone())
    }
}

/// Read a shared call counter.
#[allow(dead_code)]
pub fn count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}

// ─── Executors ──────────────────────────────────────────────────────

/// A module executor that records the key of every module it runs.
#[derive(Default)]
pub struct RecordingExecutor {
    visits: EventLog,
    fail_on: Option<String>,
}

#[allow(dead_code)]
impl RecordingExecutor {
    /// Record every visit, never fail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record into an existing log.
    pub fn with_log(visits: EventLog) -> Self {
        Self {
            visits,
            fail_on: None,
        }
    }

    /// Fail when the module with `key` is executed.
    pub fn failing_on(mut self, key: &str) -> Self {
        self.fail_on = Some(key.to_owned());
        self
    }

    /// Keys visited so far.
    pub fn visits(&self) -> Vec<String> {
        snapshot(&self.visits)
    }
}

impl ModuleExecutor for RecordingExecutor {
    fn execute(&self, module: &Module, _scope: &mut Scope<'_>) -> Result<(), StrataError> {
        self.visits
            .lock()
            .expect("event log poisoned")
            .push(module.key().to_owned());
        if self.fail_on.as_deref() == Some(module.key()) {
            return Err(ScanError::ModuleFailed {
                module: module.key().to_owned(),
                reason: "injected failure".to_owned(),
            }
            .into());
        }
        Ok(())
    }
}

// ─── Components ─────────────────────────────────────────────────────

/// A component that writes `released:<name>` to a shared log on release.
pub struct ReleaseProbe {
    name: String,
    log: EventLog,
}

#[allow(dead_code)]
impl ReleaseProbe {
    pub fn new(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_owned(),
            log: log.clone(),
        }
    }
}

impl Component for ReleaseProbe {
    fn release(&self) {
        self.log
            .lock()
            .expect("event log poisoned")
            .push(format!("released:{}", self.name));
    }
}

/// An executor that binds a [`ReleaseProbe`] named after each module.
///
/// The visit is logged as `visit:<key>` before the probe is bound, so the log
/// shows when each module scope is torn down relative to the walk.
pub struct ProbingExecutor {
    log: EventLog,
}

#[allow(dead_code)]
impl ProbingExecutor {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl ModuleExecutor for ProbingExecutor {
    fn execute(&self, module: &Module, scope: &mut Scope<'_>) -> Result<(), StrataError> {
        self.log
            .lock()
            .expect("event log poisoned")
            .push(format!("visit:{}", module.key()));
        scope.bind_component(ReleaseProbe::new(module.key(), &self.log))?;
        Ok(())
    }
}
