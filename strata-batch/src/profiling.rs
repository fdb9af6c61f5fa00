//! Phase-timing diagnostics.
//!
//! When `[diagnostics] profiling = true`, the session binds a
//! [`PhaseProfiler`]. The scan sequencer records how long every module
//! execution took, and when the session scope is released the profiler
//! logs a sum-up (total time plus the slowest modules) and emits one
//! histogram sample per recorded phase.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use strata_core::metrics as m;
use strata_core::pipeline::Component;

/// Phase label used for per-module executions.
pub const MODULE_PHASE: &str = "module";

/// One recorded measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTiming {
    pub module: String,
    pub phase: String,
    pub elapsed: Duration,
}

/// Collects per-module phase timings for one session.
///
/// Recording takes `&self` so the profiler can be reached through a
/// shared scope lookup.
#[derive(Debug)]
pub struct PhaseProfiler {
    timings: Mutex<Vec<PhaseTiming>>,
    slowest: usize,
}

impl PhaseProfiler {
    /// Create a profiler that lists the `slowest` modules in its sum-up.
    pub fn new(slowest: usize) -> Self {
        Self {
            timings: Mutex::new(Vec::new()),
            slowest,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PhaseTiming>> {
        self.timings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one measurement.
    pub fn record(&self, module: &str, phase: &str, elapsed: Duration) {
        tracing::trace!(module, phase, elapsed_ms = elapsed.as_millis() as u64, "phase timed");
        self.lock().push(PhaseTiming {
            module: module.to_owned(),
            phase: phase.to_owned(),
            elapsed,
        });
    }

    /// All measurements in recording order.
    pub fn timings(&self) -> Vec<PhaseTiming> {
        self.lock().clone()
    }

    /// Sum of every recorded measurement.
    pub fn total(&self) -> Duration {
        self.lock().iter().map(|t| t.elapsed).sum()
    }

    /// Total time per module, in order of first appearance.
    pub fn by_module(&self) -> Vec<(String, Duration)> {
        let timings = self.lock();
        let mut order: Vec<(String, Duration)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for timing in timings.iter() {
            match index.get(timing.module.as_str()) {
                Some(&i) => order[i].1 += timing.elapsed,
                None => {
                    index.insert(timing.module.as_str(), order.len());
                    order.push((timing.module.clone(), timing.elapsed));
                }
            }
        }
        order
    }

    /// The `n` modules with the largest total time, slowest first.
    ///
    /// Ties keep their first-appearance order.
    pub fn slowest(&self, n: usize) -> Vec<(String, Duration)> {
        let mut modules = self.by_module();
        modules.sort_by(|a, b| b.1.cmp(&a.1));
        modules.truncate(n);
        modules
    }

    fn log_sum_up(&self) {
        let modules = self.by_module();
        let total = self.total();
        tracing::info!(
            modules = modules.len(),
            total_ms = total.as_millis() as u64,
            "phase timing sum-up"
        );
        for (rank, (module, elapsed)) in self.slowest(self.slowest).into_iter().enumerate() {
            let share = if total.is_zero() {
                0.0
            } else {
                elapsed.as_secs_f64() / total.as_secs_f64() * 100.0
            };
            tracing::info!(
                rank = rank + 1,
                module = %module,
                elapsed_ms = elapsed.as_millis() as u64,
                share_pct = %format!("{share:.1}"),
                "slow module"
            );
        }
    }

    fn emit_metrics(&self) {
        for timing in self.lock().iter() {
            metrics::histogram!(
                m::SCAN_MODULE_DURATION_SECONDS,
                m::LABEL_MODULE => timing.module.clone(),
                m::LABEL_PHASE => timing.phase.clone()
            )
            .record(timing.elapsed.as_secs_f64());
        }
    }
}

impl Default for PhaseProfiler {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Component for PhaseProfiler {
    fn release(&self) {
        self.log_sum_up();
        self.emit_metrics();
    }
}
