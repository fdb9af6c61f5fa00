//! Default project bootstrapper -- builds the module tree from flat properties.
//!
//! Used by the reactor resolver when no bootstrapper is bound in the session
//! scope. The tree is described entirely by dotted property keys:
//!
//! ```text
//! project.key      = shop              (required)
//! project.name     = Shop
//! project.base_dir = /work/shop
//! project.modules  = core,web
//!
//! web.modules      = api,ui            (nested modules)
//! api.key          = shop:web-api      (default: <parent key>:<id>)
//! api.language     = rust              (copied into the module properties)
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use strata_core::error::{StrataError, TreeError};
use strata_core::pipeline::ProjectBootstrapper;
use strata_core::types::{Module, ProjectTree};

/// Name reported in diagnostics and in `InvalidProjectTree` errors.
pub const DEFAULT_BOOTSTRAPPER_NAME: &str = "default-project-bootstrapper";

/// Property id of the root module.
const ROOT_ID: &str = "project";

/// Per-module keys consumed by the bootstrapper itself.
const RESERVED: &[&str] = &["key", "name", "base_dir", "modules"];

/// Ids on the current descent and every module key produced so far.
#[derive(Debug, Default)]
struct BuildState {
    path: Vec<String>,
    keys: HashSet<String>,
}

/// Builds a [`ProjectTree`] from `project.*` and `<module>.*` properties.
#[derive(Debug, Clone, Default)]
pub struct DefaultProjectBootstrapper {
    properties: BTreeMap<String, String>,
}

impl DefaultProjectBootstrapper {
    /// Create a bootstrapper over the given flat properties.
    pub fn new(properties: BTreeMap<String, String>) -> Self {
        Self { properties }
    }

    fn property(&self, id: &str, field: &str) -> Option<&str> {
        self.properties
            .get(&format!("{id}.{field}"))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn module_ids(&self, id: &str) -> Vec<&str> {
        self.property(id, "modules")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Properties of the form `<id>.<prop>` that are not reserved keys.
    fn extra_properties<'a>(&'a self, id: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        let prefix = format!("{id}.");
        self.properties.iter().filter_map(move |(key, value)| {
            let prop = key.strip_prefix(prefix.as_str())?;
            if prop.is_empty() || RESERVED.contains(&prop) {
                return None;
            }
            Some((prop, value.as_str()))
        })
    }

    /// Build `id` and its subtree.
    ///
    /// A key is rejected the moment it repeats, so a malformed module list
    /// fails after at most one module per distinct key.
    fn build_module(
        &self,
        id: &str,
        key: String,
        base_dir: Option<PathBuf>,
        state: &mut BuildState,
    ) -> Result<Module, TreeError> {
        if state.path.iter().any(|visited| visited == id) {
            state.path.push(id.to_owned());
            return Err(TreeError::CyclicModule {
                path: state.path.join(" -> "),
            });
        }
        if !state.keys.insert(key.clone()) {
            return Err(TreeError::DuplicateModule { key });
        }

        let mut module = Module::new(key.clone()).with_name(self.property(id, "name").unwrap_or(id));
        if let Some(dir) = &base_dir {
            module = module.with_base_dir(dir.clone());
        }
        for (prop, value) in self.extra_properties(id) {
            module = module.with_property(prop, value);
        }

        state.path.push(id.to_owned());
        for child_id in self.module_ids(id) {
            let child_key = self
                .property(child_id, "key")
                .map(str::to_owned)
                .unwrap_or_else(|| format!("{key}:{child_id}"));
            let child_dir = self.child_base_dir(child_id, base_dir.as_deref());
            let child = self.build_module(child_id, child_key, child_dir, state)?;
            module = module.with_child(child);
        }
        state.path.pop();

        Ok(module)
    }

    /// Relative `base_dir` values resolve against the parent's directory.
    fn child_base_dir(&self, id: &str, parent_dir: Option<&Path>) -> Option<PathBuf> {
        match (self.property(id, "base_dir"), parent_dir) {
            (Some(dir), Some(parent)) => Some(parent.join(dir)),
            (Some(dir), None) => Some(PathBuf::from(dir)),
            (None, Some(parent)) => Some(parent.join(id)),
            (None, None) => None,
        }
    }
}

impl ProjectBootstrapper for DefaultProjectBootstrapper {
    fn name(&self) -> &str {
        DEFAULT_BOOTSTRAPPER_NAME
    }

    fn bootstrap(&self) -> Result<Option<ProjectTree>, StrataError> {
        let Some(key) = self.property(ROOT_ID, "key") else {
            tracing::debug!("no project.key property, cannot build a project tree");
            return Ok(None);
        };

        let base_dir = self.property(ROOT_ID, "base_dir").map(PathBuf::from);
        let mut state = BuildState::default();
        let root = self.build_module(ROOT_ID, key.to_owned(), base_dir, &mut state)?;
        let tree = ProjectTree::new(root)?;

        tracing::debug!(
            bootstrapper = DEFAULT_BOOTSTRAPPER_NAME,
            project = key,
            modules = tree.len(),
            "project tree built from properties"
        );
        Ok(Some(tree))
    }
}
