//! Test configuration builder for E2E tests.
//!
//! Provides [`TestConfigBuilder`] for creating `ScanConfig` instances
//! with a project layout described through properties.

use std::io::Write;
use std::path::PathBuf;

use strata_core::config::ScanConfig;

/// Builder for constructing test-friendly `ScanConfig` instances.
///
/// By default no project properties are set and profiling is off.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .project("shop")
///     .modules("project", "core,web")
///     .profiling(true)
///     .build();
/// ```
#[allow(dead_code)]
pub struct TestConfigBuilder {
    config: ScanConfig,
}

#[allow(dead_code)]
impl TestConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
        }
    }

    /// Set `project.key`.
    pub fn project(self, key: &str) -> Self {
        self.property("project.key", key)
    }

    /// Set `<id>.modules`.
    pub fn modules(self, id: &str, modules: &str) -> Self {
        self.property(&format!("{id}.modules"), modules)
    }

    /// Set an arbitrary property.
    pub fn property(mut self, key: &str, value: &str) -> Self {
        self.config.set_property(key, value);
        self
    }

    /// Enable or disable the phase profiler.
    pub fn profiling(mut self, enabled: bool) -> Self {
        self.config.diagnostics.profiling = enabled;
        self
    }

    /// Set the log level.
    pub fn log_level(mut self, level: &str) -> Self {
        self.config.general.log_level = level.to_owned();
        self
    }

    /// Set the log format.
    pub fn log_format(mut self, format: &str) -> Self {
        self.config.general.log_format = format.to_owned();
        self
    }

    /// Build and return the `ScanConfig`.
    ///
    /// Note: This does NOT call `validate()`.
    pub fn build(self) -> ScanConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The `P -> [A -> [D], B]` layout used across scenarios.
///
/// Module keys are `p`, `a`, `d` and `b`.
#[allow(dead_code)]
pub fn pabd_config() -> ScanConfig {
    TestConfigBuilder::new()
        .project("p")
        .modules("project", "a,b")
        .modules("a", "d")
        .property("a.key", "a")
        .property("b.key", "b")
        .property("d.key", "d")
        .build()
}

/// Write a `ScanConfig` to a temporary TOML file and return its path.
///
/// The caller must keep the returned `NamedTempFile` alive for the duration of the test.
///
/// # Panics
///
/// Panics if serialization or file writing fails.
#[allow(dead_code)]
pub fn write_config_to_tempfile(config: &ScanConfig) -> (tempfile::NamedTempFile, PathBuf) {
    let toml_str = toml::to_string_pretty(config).expect("failed to serialize config to TOML");
    let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
    file.write_all(toml_str.as_bytes())
        .expect("failed to write config to temp file");
    file.flush().expect("failed to flush temp file");
    let path = file.path().to_path_buf();
    (file, path)
}
