//! Shared E2E test helpers.
//!
//! Provides reusable utilities for building test configurations,
//! test bootstrappers and executors, and mock extensions with
//! observable release.

pub mod config;
pub mod extensions;
pub mod fixtures;
