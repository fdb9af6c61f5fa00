//! Mock extensions for E2E tests.
//!
//! [`MockExtension`] reports its release into an [`EventLog`] so tests can
//! check that installed extensions are released with the session scope.

use std::sync::Arc;

use strata_core::extension::{
    Capability, Extension, ExtensionDescriptor, InstantiationStrategy, StaticExtensionInstaller,
};

use super::fixtures::EventLog;

/// A mock extension with a configurable descriptor.
pub struct MockExtension {
    descriptor: ExtensionDescriptor,
    log: Option<EventLog>,
}

#[allow(dead_code)]
impl MockExtension {
    pub fn new(name: &str, capability: Capability, strategy: InstantiationStrategy) -> Self {
        Self {
            descriptor: ExtensionDescriptor::new(name, strategy).with_capability(capability),
            log: None,
        }
    }

    /// A batch-side, once-per-session extension (eligible for installation).
    pub fn batch(name: &str) -> Self {
        Self::new(name, Capability::Batch, InstantiationStrategy::PerBatch)
    }

    /// Log `released:<name>` when released.
    pub fn logging_to(mut self, log: &EventLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    pub fn shared(self) -> Arc<dyn Extension> {
        Arc::new(self)
    }
}

impl Extension for MockExtension {
    fn descriptor(&self) -> &ExtensionDescriptor {
        &self.descriptor
    }

    fn release(&self) {
        if let Some(log) = &self.log {
            log.lock()
                .expect("event log poisoned")
                .push(format!("released:{}", self.descriptor.name));
        }
    }
}

/// Build an installer with the given extensions registered in order.
///
/// # Panics
///
/// Panics if two extensions share a name.
#[allow(dead_code)]
pub fn installer_with(extensions: Vec<MockExtension>) -> StaticExtensionInstaller {
    let mut installer = StaticExtensionInstaller::new();
    for extension in extensions {
        installer
            .register(extension.shared())
            .expect("extension names must be unique");
    }
    installer
}
