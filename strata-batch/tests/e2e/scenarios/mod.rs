//! E2E test scenarios.
//!
//! Each module covers one area of session behavior.

mod extensions;
mod lifecycle;
