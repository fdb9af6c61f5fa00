//! Baseline session components.
//!
//! Every session registers the same fixed catalogue of session-scoped
//! services (locks, caches, persisters, the issue workflow, test and
//! language builders) before any extension is installed. The orchestrator
//! treats them as opaque: each one is bound by name as a
//! [`BaselineComponent`] so that later collaborators can look it up
//! and so that release order is observable.

use std::fmt;

use strata_core::error::ScopeError;
use strata_core::pipeline::Component;
use strata_core::scope::Scope;

use self::ComponentGroup::{Core, Issues, Lang, Tests};

/// Functional group a baseline component belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentGroup {
    /// Index, caches, locks and persisters.
    Core,
    /// Issue tracking and notification.
    Issues,
    /// Test plan and coverage graph.
    Tests,
    /// Syntax highlighting and symbol tables.
    Lang,
}

impl fmt::Display for ComponentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => write!(f, "core"),
            Self::Issues => write!(f, "issues"),
            Self::Tests => write!(f, "tests"),
            Self::Lang => write!(f, "lang"),
        }
    }
}

/// A session-scoped service registered by identity only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineComponent {
    name: &'static str,
    group: ComponentGroup,
}

impl BaselineComponent {
    const fn new(name: &'static str, group: ComponentGroup) -> Self {
        Self { name, group }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> ComponentGroup {
        self.group
    }
}

impl Component for BaselineComponent {
    fn release(&self) {
        tracing::trace!(component = self.name, group = %self.group, "baseline component released");
    }
}

/// The fixed catalogue, in registration order.
///
/// `project-settings-ready` is always last: it marks the point where
/// project settings may be read by extensions.
pub const BASELINE_COMPONENTS: &[BaselineComponent] = &[
    BaselineComponent::new("resource-creation-lock", Core),
    BaselineComponent::new("persistence-manager", Core),
    BaselineComponent::new("dependency-persister", Core),
    BaselineComponent::new("event-persister", Core),
    BaselineComponent::new("link-persister", Core),
    BaselineComponent::new("measure-persister", Core),
    BaselineComponent::new("memory-optimizer", Core),
    BaselineComponent::new("resource-persister", Core),
    BaselineComponent::new("source-persister", Core),
    BaselineComponent::new("notification-manager", Core),
    BaselineComponent::new("metric-provider", Core),
    BaselineComponent::new("project-configurator", Core),
    BaselineComponent::new("index", Core),
    BaselineComponent::new("file-lines-context-factory", Core),
    BaselineComponent::new("project-lock", Core),
    BaselineComponent::new("last-snapshots", Core),
    BaselineComponent::new("caches", Core),
    BaselineComponent::new("snapshot-cache", Core),
    BaselineComponent::new("resource-cache", Core),
    BaselineComponent::new("component-data-cache", Core),
    BaselineComponent::new("component-data-persister", Core),
    BaselineComponent::new("issue-updater", Issues),
    BaselineComponent::new("function-executor", Issues),
    BaselineComponent::new("issue-workflow", Issues),
    BaselineComponent::new("deprecated-violations", Issues),
    BaselineComponent::new("issue-cache", Issues),
    BaselineComponent::new("scan-issue-storage", Issues),
    BaselineComponent::new("issue-persister", Issues),
    BaselineComponent::new("issue-notifications", Issues),
    BaselineComponent::new("test-plan-perspective-loader", Tests),
    BaselineComponent::new("testable-perspective-loader", Tests),
    BaselineComponent::new("test-plan-builder", Tests),
    BaselineComponent::new("testable-builder", Tests),
    BaselineComponent::new("scan-graph", Tests),
    BaselineComponent::new("graph-persister", Tests),
    BaselineComponent::new("highlightable-builder", Lang),
    BaselineComponent::new("symbolizable-builder", Lang),
    BaselineComponent::new("project-settings-ready", Core),
];

/// Bind every baseline component into `scope` by name.
///
/// Returns the number of components bound.
///
/// # Errors
///
/// Returns [`ScopeError::AlreadyBound`] if the scope already holds a
/// baseline component with the same name.
pub fn register_baseline(scope: &mut Scope<'_>) -> Result<usize, ScopeError> {
    for component in BASELINE_COMPONENTS {
        scope.bind_named_component(component.name, *component)?;
    }
    tracing::debug!(
        scope = scope.label(),
        count = BASELINE_COMPONENTS.len(),
        "baseline components registered"
    );
    Ok(BASELINE_COMPONENTS.len())
}
