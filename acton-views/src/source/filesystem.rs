//! Views read straight from disk

use super::{file_path, Presence, ViewSource};
use crate::error::{ViewError, ViewResult};
use crate::view::{JinjaView, View};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// View source that reads and compiles view files on every call
///
/// Edits on disk show up on the next render without restarting, at the
/// cost of one read and compile per view per render.
#[derive(Debug, Clone)]
pub struct FileSystemViews {
    extension: String,
}

impl FileSystemViews {
    /// Create a source for files ending in `.{extension}`
    #[must_use]
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

#[async_trait]
impl ViewSource for FileSystemViews {
    async fn load(&self, id: &Path) -> ViewResult<Arc<dyn View>> {
        let path = file_path(id, &self.extension);
        let source = fs::read_to_string(&path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ViewError::NotFound(id.to_path_buf())
            } else {
                ViewError::Load { path: path.clone(), source }
            }
        })?;

        let view = JinjaView::compile(path.display().to_string(), source)?;
        Ok(Arc::new(view))
    }

    async fn discover(&self, dir: &Path) -> ViewResult<Vec<PathBuf>> {
        let discover_err = |source: std::io::Error| ViewError::Discover {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(discover_err(err)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(discover_err)? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            // follows symlinks, unlike DirEntry::file_type
            if !fs::metadata(&path).await.map_err(discover_err)?.is_file() {
                continue;
            }
            ids.push(path.with_extension(""));
        }

        Ok(ids)
    }

    async fn probe(&self, id: &Path) -> ViewResult<Presence> {
        let path = file_path(id, &self.extension);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Presence::Found),
            Ok(_) => Ok(Presence::Missing),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Presence::Missing),
            Err(source) => Err(ViewError::Probe { path, source }),
        }
    }
}
