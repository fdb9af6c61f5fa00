//! Scan sequencing -- depth-first, post-order module traversal.
//!
//! Every module is analysed in its own child scope, nested under the scope
//! of its parent module:
//!
//! ```text
//! session scope
//!   └─ module:p            bind(Module p)
//!        ├─ module:a       bind(Module a)
//!        │    └─ module:d  bind(Module d) → execute(d) → release
//!        │  execute(a) → release
//!        ├─ module:b       bind(Module b) → execute(b) → release
//!      execute(p) → release
//! ```
//!
//! Children run left to right before their parent. The first failing
//! module aborts the walk; its scope (and every enclosing module scope)
//! is still released on the way out.
//!
//! Module scopes are not siblings under the session scope. Because each
//! one hangs off its parent module's scope, an ancestor module's
//! [`Module`] binding stays reachable through [`Scope::parent`], while a
//! plain `lookup::<Module>()` always finds the module's own binding first.

use std::collections::HashSet;
use std::time::Instant;

use strata_core::error::{ScanError, StrataError, TreeError};
use strata_core::metrics as m;
use strata_core::pipeline::ModuleExecutor;
use strata_core::scope::Scope;
use strata_core::types::Module;

use crate::profiling::{MODULE_PHASE, PhaseProfiler};

/// Walks a module tree and runs the executor once per module.
pub struct ScanSequencer<'e> {
    executor: &'e dyn ModuleExecutor,
}

impl<'e> ScanSequencer<'e> {
    pub fn new(executor: &'e dyn ModuleExecutor) -> Self {
        Self { executor }
    }

    /// Scan `module` and its descendants under `parent`.
    ///
    /// Returns the module keys in the order they were executed.
    ///
    /// # Errors
    ///
    /// - the first executor error: [`ScanError::ModuleFailed`] as returned,
    ///   anything else wrapped in [`ScanError::ModuleAborted`]
    /// - [`TreeError::DuplicateModule`] if a key is reached twice
    pub fn scan(&self, module: &Module, parent: &Scope<'_>) -> Result<Vec<String>, StrataError> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        self.scan_module(module, parent, &mut visited, &mut order)?;
        Ok(order)
    }

    fn scan_module(
        &self,
        module: &Module,
        parent: &Scope<'_>,
        visited: &mut HashSet<String>,
        order: &mut Vec<String>,
    ) -> Result<(), StrataError> {
        if !visited.insert(module.key().to_owned()) {
            return Err(TreeError::DuplicateModule {
                key: module.key().to_owned(),
            }
            .into());
        }

        let mut scope = parent.child(format!("module:{}", module.key()));
        scope.bind(module.clone())?;

        for child in module.children() {
            self.scan_module(child, &scope, visited, order)?;
        }

        let _span = tracing::debug_span!("scan_module", module = module.key()).entered();
        let started = Instant::now();
        let result = self.executor.execute(module, &mut scope);
        let elapsed = started.elapsed();

        if let Some(profiler) = scope.lookup::<PhaseProfiler>() {
            profiler.record(module.key(), MODULE_PHASE, elapsed);
        }

        match result {
            Ok(()) => {
                metrics::counter!(m::SCAN_MODULES_TOTAL, m::LABEL_RESULT => "success").increment(1);
                tracing::debug!(
                    module = module.key(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "module scanned"
                );
                order.push(module.key().to_owned());
                Ok(())
            }
            Err(e) => {
                metrics::counter!(m::SCAN_MODULES_TOTAL, m::LABEL_RESULT => "failure").increment(1);
                tracing::error!(module = module.key(), error = %e, "module scan failed");
                match e {
                    StrataError::Scan(ScanError::ModuleFailed { .. }) => Err(e),
                    other => Err(ScanError::ModuleAborted {
                        module: module.key().to_owned(),
                        source: Box::new(other),
                    }
                    .into()),
                }
            }
        }
    }
}
