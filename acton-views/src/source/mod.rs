//! View sources
//!
//! A [`ViewSource`] is everything the composer and the directory resolver need
//! from the outside world: loading a view by id, listing the fragments in an
//! includes directory, and checking whether a view exists.
//!
//! View ids are absolute paths without the view file extension, for example
//! `/srv/views/hello/index` for `/srv/views/hello/index.html`.
//!
//! Two implementations ship with the crate:
//! - [`ViewRegistry`] scans the view directories once at startup
//! - [`FileSystemViews`] reads from disk on every call (development)

use crate::error::ViewResult;
use crate::view::View;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod filesystem;
mod registry;

pub use filesystem::FileSystemViews;
pub use registry::ViewRegistry;

/// Outcome of an existence check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// A view exists under the id
    Found,
    /// Nothing exists under the id
    Missing,
}

impl Presence {
    /// True for [`Presence::Found`]
    #[must_use]
    pub const fn is_found(self) -> bool {
        matches!(self, Self::Found)
    }
}

/// Abstraction over where views come from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ViewSource: Send + Sync {
    /// Load the view registered under `id`
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ViewError::NotFound`] for an unknown id and a
    /// load or compile error when the view exists but cannot be used.
    async fn load(&self, id: &Path) -> ViewResult<Arc<dyn View>>;

    /// Ids of the views directly inside `dir`
    ///
    /// Not recursive. A directory that does not exist has no views.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ViewError::Discover`] if listing fails.
    async fn discover(&self, dir: &Path) -> ViewResult<Vec<PathBuf>>;

    /// Check whether a view exists under `id`
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ViewError::Probe`] when the check fails for
    /// any reason other than the view not existing.
    async fn probe(&self, id: &Path) -> ViewResult<Presence>;
}

/// Append the view file extension to an id
pub(crate) fn file_path(id: &Path, extension: &str) -> PathBuf {
    let mut path = id.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}
