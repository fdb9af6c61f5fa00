//! Strata batch library.
//!
//! This library exposes the session orchestration for embedding and
//! integration testing. The `strata-batch` binary (main.rs) is a thin
//! wrapper that loads configuration and runs one session.

pub mod bootstrap;
pub mod cli;
pub mod components;
pub mod executor;
pub mod logging;
pub mod orchestrator;
pub mod profiling;
pub mod reactor;
pub mod sequencer;

pub use bootstrap::DefaultProjectBootstrapper;
pub use orchestrator::{ScanSession, ScanSessionBuilder, ScanSummary, SessionPhase};
pub use profiling::PhaseProfiler;
pub use reactor::ReactorResolver;
pub use sequencer::ScanSequencer;
