//! Extension selection and installation during assembly.
//!
//! Only extensions tagged batch-side with the per-batch strategy are
//! installed into the session scope, in discovery order, and they are
//! released with it.

use crate::helpers::config::*;
use crate::helpers::extensions::*;
use crate::helpers::fixtures::*;

use strata_batch::orchestrator::ScanSession;
use strata_core::error::StrataError;
use strata_core::extension::{Capability, InstalledExtension, InstantiationStrategy};
use strata_core::pipeline::ModuleExecutor;
use strata_core::scope::Scope;
use strata_core::types::Module;

/// X (Batch, PER_BATCH), Y (Batch, PER_MODULE), Z (Server, PER_BATCH) -> only X.
#[test]
fn test_e2e_only_batch_per_batch_installed() {
    let installer = installer_with(vec![
        MockExtension::new("x", Capability::Batch, InstantiationStrategy::PerBatch),
        MockExtension::new("y", Capability::Batch, InstantiationStrategy::PerModule),
        MockExtension::new("z", Capability::Server, InstantiationStrategy::PerBatch),
    ]);
    let mut session = ScanSession::builder()
        .config(pabd_config())
        .installer(installer)
        .build()
        .unwrap();

    session.assemble().unwrap();

    assert_eq!(session.extensions(), ["x"]);
    let scope = session.scope();
    assert!(scope.contains_named::<InstalledExtension>("x"));
    assert!(!scope.contains_named::<InstalledExtension>("y"));
    assert!(!scope.contains_named::<InstalledExtension>("z"));
}

/// Installation order follows discovery (registration) order.
#[test]
fn test_e2e_installation_preserves_discovery_order() {
    let installer = installer_with(vec![
        MockExtension::batch("duplication"),
        MockExtension::new("per-analysis", Capability::Batch, InstantiationStrategy::PerAnalysis),
        MockExtension::batch("coverage"),
        MockExtension::batch("complexity"),
    ]);
    let summary = ScanSession::builder()
        .config(pabd_config())
        .installer(installer)
        .build()
        .unwrap()
        .run(&RecordingExecutor::new())
        .unwrap();

    assert_eq!(summary.extensions, vec!["duplication", "coverage", "complexity"]);
}

/// Installed extensions are released in reverse installation order when the session ends.
#[test]
fn test_e2e_extensions_released_in_reverse_order() {
    let log = EventLog::default();
    let installer = installer_with(vec![
        MockExtension::batch("first").logging_to(&log),
        MockExtension::new("skipped", Capability::Server, InstantiationStrategy::PerBatch)
            .logging_to(&log),
        MockExtension::batch("second").logging_to(&log),
    ]);
    let mut session = ScanSession::builder()
        .config(pabd_config())
        .installer(installer)
        .build()
        .unwrap();
    // bound before assembly, so released after every extension
    session
        .scope_mut()
        .bind_component(ReleaseProbe::new("pre-bound", &log))
        .unwrap();

    session.run(&RecordingExecutor::new()).unwrap();

    assert_eq!(
        snapshot(&log),
        vec!["released:second", "released:first", "released:pre-bound"]
    );
}

/// Session-scoped extensions are visible from every module scope.
#[test]
fn test_e2e_extensions_visible_to_modules() {
    struct RequiresExtension;

    impl ModuleExecutor for RequiresExtension {
        fn execute(&self, module: &Module, scope: &mut Scope<'_>) -> Result<(), StrataError> {
            assert!(
                scope.contains_named::<InstalledExtension>("coverage"),
                "module {} cannot see the session extension",
                module.key()
            );
            Ok(())
        }
    }

    let summary = ScanSession::builder()
        .config(pabd_config())
        .installer(installer_with(vec![MockExtension::batch("coverage")]))
        .build()
        .unwrap()
        .run(&RequiresExtension)
        .unwrap();
    assert_eq!(summary.scanned.len(), 4);
}

/// No installer configured -> no extensions, session still runs.
#[test]
fn test_e2e_no_installer_means_no_extensions() {
    let summary = ScanSession::builder()
        .config(pabd_config())
        .build()
        .unwrap()
        .run(&RecordingExecutor::new())
        .unwrap();
    assert!(summary.extensions.is_empty());
}
