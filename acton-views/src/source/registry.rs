//! Startup-scanned view registry

use super::{Presence, ViewSource};
use crate::error::{ViewError, ViewResult};
use crate::view::{jinja, JinjaView, View};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Registry mapping view ids to views
///
/// File views are compiled once when the registry is scanned; function views
/// can be inserted in code. Registration needs `&mut self`, so once the
/// registry is moved into an engine its contents are fixed. Lookups never
/// touch the disk, so probes always succeed with either `Found` or `Missing`.
///
/// Ids are kept sorted, so discovery returns fragments by file name.
///
/// The registry is not `Clone`; no handle can outlive the move into an engine:
///
/// ```rust,compile_fail
/// use acton_views::prelude::*;
///
/// let registry = ViewRegistry::new();
/// let _kept = registry.clone();
/// ```
#[derive(Default)]
pub struct ViewRegistry {
    views: BTreeMap<PathBuf, Arc<dyn View>>,
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("views", &self.ids())
            .finish()
    }
}

impl ViewRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan directories for view files and compile them
    ///
    /// Every file ending in `.{extension}` under each root (recursively)
    /// becomes a [`JinjaView`] registered under its id. Roots that do not
    /// exist are skipped. Overlapping roots register each file once.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or fails to compile.
    pub fn scan<P: AsRef<Path>>(roots: &[P], extension: &str) -> ViewResult<Self> {
        let mut env = jinja::environment();
        let mut found = BTreeMap::new();

        for root in roots {
            let root = root.as_ref();
            if !root.is_dir() {
                tracing::debug!(root = %root.display(), "Skipping missing view directory");
                continue;
            }

            for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
                let entry = entry.map_err(|err| ViewError::Load {
                    path: err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf),
                    source: err.into(),
                })?;
                let path = entry.path();
                if !entry.file_type().is_file()
                    || path.extension().and_then(|ext| ext.to_str()) != Some(extension)
                {
                    continue;
                }

                let id = path.with_extension("");
                if found.contains_key(&id) {
                    continue;
                }

                let source = std::fs::read_to_string(path).map_err(|source| ViewError::Load {
                    path: path.to_path_buf(),
                    source,
                })?;
                let name = path.display().to_string();
                jinja::add_source(&mut env, name.clone(), source)?;
                found.insert(id, name);
            }
        }

        let env = Arc::new(env);
        let mut registry = Self::new();
        for (id, name) in found {
            tracing::trace!(id = %id.display(), "Registered file view");
            registry.insert(id, JinjaView::shared(Arc::clone(&env), name));
        }
        Ok(registry)
    }

    /// Register a view under an id, replacing any previous one
    pub fn insert(&mut self, id: impl Into<PathBuf>, view: impl View + 'static) {
        self.views.insert(id.into(), Arc::new(view));
    }

    /// Whether a view is registered under `id`
    #[must_use]
    pub fn contains(&self, id: &Path) -> bool {
        self.views.contains_key(id)
    }

    /// All registered ids, sorted
    #[must_use]
    pub fn ids(&self) -> Vec<PathBuf> {
        self.views.keys().cloned().collect()
    }

    /// Number of registered views
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// True when nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[async_trait]
impl ViewSource for ViewRegistry {
    async fn load(&self, id: &Path) -> ViewResult<Arc<dyn View>> {
        self.views
            .get(id)
            .cloned()
            .ok_or_else(|| ViewError::NotFound(id.to_path_buf()))
    }

    async fn discover(&self, dir: &Path) -> ViewResult<Vec<PathBuf>> {
        Ok(self
            .views
            .keys()
            .filter(|id| id.parent() == Some(dir))
            .cloned()
            .collect())
    }

    async fn probe(&self, id: &Path) -> ViewResult<Presence> {
        Ok(if self.contains(id) {
            Presence::Found
        } else {
            Presence::Missing
        })
    }
}
