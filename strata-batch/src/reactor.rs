//! Reactor resolution -- producing the session's project tree.
//!
//! # Fallback chain
//!
//! 1. A [`ProjectTree`] already visible in the scope chain is reused as is.
//! 2. Otherwise the `Box<dyn ProjectBootstrapper>` bound in the scope is asked
//!    to build one, falling back to [`DefaultProjectBootstrapper`] over the
//!    configured project properties.
//! 3. A bootstrapper that returns no tree aborts the session with
//!    [`ConfigError::InvalidProjectTree`]. There is no retry.
//! 4. The new tree is bound into the session scope exactly once.

use strata_core::config::ScanConfig;
use strata_core::error::{ConfigError, StrataError};
use strata_core::metrics as m;
use strata_core::pipeline::ProjectBootstrapper;
use strata_core::scope::Scope;
use strata_core::types::ProjectTree;

use crate::bootstrap::DefaultProjectBootstrapper;

/// Resolves the project tree for a session scope.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReactorResolver;

impl ReactorResolver {
    /// Create a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Return the scope's project tree, bootstrapping and binding it if needed.
    ///
    /// Calling this again on the same scope returns the same tree without
    /// invoking any bootstrapper.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidProjectTree`] when the bootstrapper produced no tree
    /// - any error raised by the bootstrapper itself
    pub fn resolve<'s>(
        &self,
        scope: &'s mut Scope<'_>,
        config: &ScanConfig,
    ) -> Result<&'s ProjectTree, StrataError> {
        if scope.contains::<ProjectTree>() {
            tracing::debug!(scope = scope.label(), "project tree already bound, reusing");
            return Ok(scope.require::<ProjectTree>()?);
        }

        let tree = match scope.lookup::<Box<dyn ProjectBootstrapper>>() {
            Some(bootstrapper) => bootstrap_with(bootstrapper.as_ref())?,
            None => {
                let fallback = DefaultProjectBootstrapper::new(config.properties.clone());
                bootstrap_with(&fallback)?
            }
        };

        tracing::info!(
            project = tree.root().key(),
            modules = tree.len(),
            "project tree resolved"
        );
        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!(m::SCAN_TREE_MODULES).set(tree.len() as f64);

        scope.bind(tree)?;
        Ok(scope.require::<ProjectTree>()?)
    }
}

fn bootstrap_with(bootstrapper: &dyn ProjectBootstrapper) -> Result<ProjectTree, StrataError> {
    tracing::debug!(bootstrapper = bootstrapper.name(), "bootstrapping project tree");
    match bootstrapper.bootstrap()? {
        Some(tree) => Ok(tree),
        None => {
            tracing::error!(
                bootstrapper = bootstrapper.name(),
                "bootstrapper returned no project tree"
            );
            Err(ConfigError::InvalidProjectTree {
                bootstrapper: bootstrapper.name().to_owned(),
            }
            .into())
        }
    }
}
