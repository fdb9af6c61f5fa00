//! E2E integration tests for strata-batch.
//!
//! These tests drive complete scan sessions (assemble + execute) with
//! test bootstrappers, executors and extensions, and check tree
//! resolution, extension filtering, traversal order, scope isolation
//! and failure handling.
//!
//! # Test Structure
//!
//! - `helpers/` -- Shared test utilities (config builder, fixtures, mock extensions)
//! - `scenarios/` -- Test files organized by scenario
//!
//! # Running
//!
//! ```bash
//! cargo test -p strata-batch --test e2e
//! ```

mod helpers;
mod scenarios;
