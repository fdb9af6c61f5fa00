//! Scan session orchestration -- assembly and execution of one session.
//!
//! The [`ScanSession`] is the central coordinator of `strata-batch`.
//! It owns the session scope and drives two ordered, non re-entrant phases.
//!
//! # Assemble
//!
//! 1. Resolve the project tree ([`ReactorResolver`])
//! 2. Register the baseline components
//! 3. Bind the no-op build tool adapter unless one is already visible
//! 4. Discover and install eligible batch extensions
//! 5. Bind the [`PhaseProfiler`] when diagnostics profiling is enabled
//!
//! # Execute
//!
//! Walk the resolved tree with the [`ScanSequencer`], one child scope per module.
//!
//! Any failure moves the session to [`SessionPhase::Failed`]; a failed
//! session cannot be assembled or executed again. Dropping the session
//! releases every session component in reverse binding order.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};
use uuid::Uuid;

use strata_core::config::ScanConfig;
use strata_core::error::{ScanError, StrataError};
use strata_core::extension::{
    self, BatchExtensionMatcher, ExtensionInstaller, StaticExtensionInstaller,
};
use strata_core::metrics as m;
use strata_core::pipeline::{BuildToolExecutor, ModuleExecutor, NoopBuildToolExecutor};
use strata_core::scope::Scope;
use strata_core::types::ProjectTree;

use crate::components::register_baseline;
use crate::profiling::PhaseProfiler;
use crate::reactor::ReactorResolver;
use crate::sequencer::ScanSequencer;

/// Label of the session scope.
pub const SESSION_SCOPE: &str = "session";

/// Lifecycle state of a [`ScanSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Built, nothing bound yet.
    Created,
    /// Tree resolved and session components installed.
    Assembled,
    /// Every module scanned successfully.
    Completed,
    /// A phase failed; the session is unusable.
    Failed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Assembled => write!(f, "assembled"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Result of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Session id (uuid v4).
    pub session_id: String,
    /// Root module key.
    pub project: String,
    /// Module keys in execution order.
    pub scanned: Vec<String>,
    /// Extension names in installation order.
    pub extensions: Vec<String>,
    /// Wall-clock time from session creation to completion.
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "session     {}", self.session_id)?;
        writeln!(f, "project     {}", self.project)?;
        writeln!(f, "modules     {} ({})", self.scanned.len(), self.scanned.join(", "))?;
        if self.extensions.is_empty() {
            writeln!(f, "extensions  none")?;
        } else {
            writeln!(f, "extensions  {}", self.extensions.join(", "))?;
        }
        write!(f, "elapsed     {} ms", self.elapsed.as_millis())
    }
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

/// One scan session over a project tree.
///
/// `'p` is the lifetime of the optional parent scope the session scope
/// reads through.
pub struct ScanSession<'p> {
    id: Uuid,
    config: ScanConfig,
    installer: Box<dyn ExtensionInstaller>,
    scope: Scope<'p>,
    phase: SessionPhase,
    extensions: Vec<String>,
    created_at: Instant,
    span: tracing::Span,
}

impl<'p> ScanSession<'p> {
    /// Create a builder for a new session.
    pub fn builder() -> ScanSessionBuilder<'p> {
        ScanSessionBuilder::new()
    }

    /// Session id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Configuration the session was built with.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// The session scope.
    pub fn scope(&self) -> &Scope<'p> {
        &self.scope
    }

    /// Mutable access to the session scope.
    ///
    /// Components bound here before [`assemble`](Self::assemble) take part in
    /// the fallback chains: a bound `Box<dyn ProjectBootstrapper>` replaces
    /// the default bootstrapper, a bound `Box<dyn BuildToolExecutor>`
    /// replaces the no-op adapter.
    pub fn scope_mut(&mut self) -> &mut Scope<'p> {
        &mut self.scope
    }

    /// Names of the installed extensions, in installation order.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// The resolved project tree, once assembled.
    pub fn project_tree(&self) -> Option<&ProjectTree> {
        self.scope.lookup::<ProjectTree>()
    }

    /// Run the assembly phase.
    ///
    /// # Errors
    ///
    /// - [`ScanError::InvalidPhase`] unless the session is [`SessionPhase::Created`]
    /// - any resolution, binding or installation error (the session becomes
    ///   [`SessionPhase::Failed`])
    pub fn assemble(&mut self) -> Result<(), StrataError> {
        self.expect_phase(SessionPhase::Created, "assemble")?;
        let span = self.span.clone();
        let _entered = span.enter();

        let started = Instant::now();
        let result = self.assemble_steps();
        record_phase_duration("assemble", started.elapsed());

        match result {
            Ok(()) => {
                self.phase = SessionPhase::Assembled;
                tracing::info!(extensions = self.extensions.len(), "session assembled");
                Ok(())
            }
            Err(e) => Err(self.fail("assemble", e)),
        }
    }

    fn assemble_steps(&mut self) -> Result<(), StrataError> {
        let tree = ReactorResolver::new().resolve(&mut self.scope, &self.config)?;
        tracing::debug!(project = tree.root().key(), "reactor ready");

        register_baseline(&mut self.scope)?;

        if self.scope.contains::<Box<dyn BuildToolExecutor>>() {
            tracing::debug!("build tool adapter already bound");
        } else {
            let noop: Box<dyn BuildToolExecutor> = Box::new(NoopBuildToolExecutor);
            self.scope.bind(noop)?;
            tracing::debug!("no build tool adapter bound, using no-op substitute");
        }

        let matcher = BatchExtensionMatcher;
        let eligible = extension::select(&self.installer.discover(&matcher), &matcher);
        self.extensions = extension::install(&mut self.scope, eligible)?;
        metrics::counter!(m::EXTENSIONS_INSTALLED_TOTAL).increment(self.extensions.len() as u64);

        if self.config.diagnostics.profiling {
            self.scope
                .bind_component(PhaseProfiler::new(self.config.diagnostics.slowest_modules))?;
            tracing::debug!("phase profiler registered");
        }

        Ok(())
    }

    /// Run the execution phase with `executor` as the per-module analysis.
    ///
    /// # Errors
    ///
    /// - [`ScanError::InvalidPhase`] unless the session is [`SessionPhase::Assembled`]
    /// - the first module failure, as [`ScanError::ModuleFailed`] or
    ///   [`ScanError::ModuleAborted`]
    pub fn execute(&mut self, executor: &dyn ModuleExecutor) -> Result<ScanSummary, StrataError> {
        self.expect_phase(SessionPhase::Assembled, "execute")?;
        let span = self.span.clone();
        let _entered = span.enter();

        let started = Instant::now();
        let result = self.execute_steps(executor);
        record_phase_duration("execute", started.elapsed());

        match result {
            Ok(summary) => {
                self.phase = SessionPhase::Completed;
                metrics::counter!(m::SESSIONS_TOTAL, m::LABEL_RESULT => "success").increment(1);
                tracing::info!(
                    modules = summary.scanned.len(),
                    elapsed_ms = summary.elapsed.as_millis() as u64,
                    "session completed"
                );
                Ok(summary)
            }
            Err(e) => Err(self.fail("execute", e)),
        }
    }

    fn execute_steps(&self, executor: &dyn ModuleExecutor) -> Result<ScanSummary, StrataError> {
        let tree = self.scope.require::<ProjectTree>()?;
        let scanned = ScanSequencer::new(executor).scan(tree.root(), &self.scope)?;
        Ok(ScanSummary {
            session_id: self.id.to_string(),
            project: tree.root().key().to_owned(),
            scanned,
            extensions: self.extensions.clone(),
            elapsed: self.created_at.elapsed(),
        })
    }

    /// Assemble and execute, then release the session.
    pub fn run(mut self, executor: &dyn ModuleExecutor) -> Result<ScanSummary, StrataError> {
        self.assemble()?;
        self.execute(executor)
    }

    fn expect_phase(&self, expected: SessionPhase, operation: &str) -> Result<(), StrataError> {
        if self.phase == expected {
            return Ok(());
        }
        Err(ScanError::InvalidPhase {
            operation: operation.to_owned(),
            phase: self.phase.to_string(),
        }
        .into())
    }

    fn fail(&mut self, operation: &str, error: StrataError) -> StrataError {
        self.phase = SessionPhase::Failed;
        metrics::counter!(m::SESSIONS_TOTAL, m::LABEL_RESULT => "failure").increment(1);
        tracing::error!(phase = operation, error = %error, "session failed");
        error
    }
}

impl fmt::Debug for ScanSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSession")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("scope", &self.scope)
            .field("extensions", &self.extensions)
            .finish()
    }
}

fn record_phase_duration(phase: &'static str, elapsed: Duration) {
    metrics::histogram!(m::SESSION_PHASE_DURATION_SECONDS, m::LABEL_PHASE => phase)
        .record(elapsed.as_secs_f64());
}

/// Builder for [`ScanSession`].
pub struct ScanSessionBuilder<'p> {
    config: ScanConfig,
    installer: Option<Box<dyn ExtensionInstaller>>,
    parent: Option<&'p Scope<'p>>,
}

impl<'p> ScanSessionBuilder<'p> {
    /// Create a builder with default configuration and no extensions.
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
            installer: None,
            parent: None,
        }
    }

    /// Set the session configuration.
    pub fn config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the extension installer.
    ///
    /// Defaults to an empty [`StaticExtensionInstaller`].
    pub fn installer(mut self, installer: impl ExtensionInstaller + 'static) -> Self {
        self.installer = Some(Box::new(installer));
        self
    }

    /// Nest the session scope under `parent`.
    ///
    /// Components bound in the parent (a pre-built project tree, a custom
    /// bootstrapper, a build tool adapter) are visible to the session.
    pub fn parent(mut self, parent: &'p Scope<'p>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Build the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn build(self) -> Result<ScanSession<'p>, StrataError> {
        self.config.validate()?;

        let id = Uuid::new_v4();
        let scope = match self.parent {
            Some(parent) => parent.child(SESSION_SCOPE),
            None => Scope::new(SESSION_SCOPE),
        };
        let span = tracing::info_span!("scan_session", session_id = %id);
        span.in_scope(|| tracing::debug!(parent = ?self.parent.map(Scope::label), "session created"));

        Ok(ScanSession {
            id,
            config: self.config,
            installer: self
                .installer
                .unwrap_or_else(|| Box::new(StaticExtensionInstaller::new())),
            scope,
            phase: SessionPhase::Created,
            extensions: Vec::new(),
            created_at: Instant::now(),
            span,
        })
    }
}

impl Default for ScanSessionBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}
