//! Error types and error handling
//!
//! Only one condition is recovered inside the crate: a directory request whose
//! index view does not exist becomes a not-found render. Every other failure is
//! returned as a [`ViewError`] and surfaces through the host's error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::path::PathBuf;
use thiserror::Error;

/// View engine error type
#[derive(Debug, Error)]
pub enum ViewError {
    /// No view is registered under the requested id
    #[error("View not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading a view file failed
    #[error("Failed to load view '{}': {source}", path.display())]
    Load {
        /// View file that could not be read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// View source is malformed and could not be compiled
    #[error("Failed to compile view '{name}': {source}")]
    Compile {
        /// Template name handed to the compiler
        name: String,
        /// Compiler error
        source: minijinja::Error,
    },

    /// A view's render function failed
    #[error("Failed to render view '{view}': {message}")]
    Render {
        /// View that failed
        view: String,
        /// Failure description
        message: String,
    },

    /// Listing an includes directory failed
    #[error("Failed to discover includes in '{}': {source}", path.display())]
    Discover {
        /// Directory being listed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Existence check failed for a reason other than "does not exist"
    #[error("Failed to probe '{}': {source}", path.display())]
    Probe {
        /// Path that was checked
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for view operations
pub type ViewResult<T> = Result<T, ViewError>;

impl ViewError {
    /// Render failure raised from inside a view
    ///
    /// Function views use this to report a failure; the composer passes it
    /// through unchanged.
    #[must_use]
    pub fn render(view: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            view: view.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "View rendering error");
        (StatusCode::INTERNAL_SERVER_ERROR, "View rendering failed").into_response()
    }
}
