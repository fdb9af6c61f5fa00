//! Built-in per-module executor used by the `strata-batch` binary.
//!
//! Real analysis lives in extensions. The built-in executor only reports
//! each module and forwards the requested build goals to whichever
//! build tool adapter is visible from the module scope (the no-op adapter
//! unless an embedder bound a real one).

use strata_core::error::StrataError;
use strata_core::pipeline::{BuildToolExecutor, ModuleExecutor};
use strata_core::scope::Scope;
use strata_core::types::Module;

/// Runs build goals for every module through the bound adapter.
#[derive(Debug, Clone, Default)]
pub struct GoalExecutor {
    goals: Vec<String>,
}

impl GoalExecutor {
    pub fn new(goals: Vec<String>) -> Self {
        Self { goals }
    }

    pub fn goals(&self) -> &[String] {
        &self.goals
    }
}

impl ModuleExecutor for GoalExecutor {
    fn execute(&self, module: &Module, scope: &mut Scope<'_>) -> Result<(), StrataError> {
        tracing::info!(
            module = module.key(),
            name = module.name(),
            base_dir = ?module.base_dir(),
            children = module.children().len(),
            "scanning module"
        );

        if self.goals.is_empty() {
            return Ok(());
        }

        let adapter = scope.require::<Box<dyn BuildToolExecutor>>()?;
        for goal in &self.goals {
            tracing::debug!(
                module = module.key(),
                adapter = adapter.name(),
                goal = %goal,
                "running goal"
            );
            adapter.execute(module, goal)?;
        }
        Ok(())
    }
}
