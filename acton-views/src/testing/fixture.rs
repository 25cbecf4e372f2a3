//! On-disk view fixtures

use std::path::Path;
use tempfile::TempDir;

/// Temporary views directory, removed on drop
///
/// ```rust,ignore
/// let fixture = ViewFixture::new()
///     .with_view("index.html", "<h1>Home</h1>")
///     .with_view("includes/head.html", "<meta charset=\"utf-8\">");
/// ```
pub struct ViewFixture {
    dir: TempDir,
}

impl ViewFixture {
    /// Create an empty views directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp views dir"),
        }
    }

    /// Add a file, creating parent directories
    #[must_use]
    pub fn with_view(self, relative: &str, contents: &str) -> Self {
        self.write(relative, contents);
        self
    }

    /// Write or overwrite a file
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create view dir");
        }
        std::fs::write(path, contents).expect("failed to write view");
    }

    /// Root of the views directory
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
