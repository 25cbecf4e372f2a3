//! Renderable views
//!
//! A view is the unit the composer invokes: it receives the page data and the
//! shared [`RenderState`] and returns ordered [`Chunks`] of HTML.
//!
//! Two kinds ship with the crate:
//! - function views built with [`from_fn`], registered in code
//! - [`JinjaView`], a minijinja template file loaded from the views directory
//!
//! # Examples
//!
//! ```rust
//! use acton_views::{chunks, view::{from_fn, View, RenderState}};
//! use serde_json::json;
//!
//! let hello = from_fn(|data, state| {
//!     let name = data["name"].as_str().unwrap_or_default();
//!     Ok(chunks!["<h1>", name, "</h1>", state.include("head").unwrap_or_default()])
//! });
//!
//! let mut state = RenderState::default();
//! let html = hello.render(&json!({"name": "world"}), &mut state).unwrap().into_html();
//! assert_eq!(html, "<h1>world</h1>");
//! ```

use crate::error::ViewResult;
use serde_json::Value;
use std::fmt;

mod chunks;
pub(crate) mod jinja;
mod state;

pub use chunks::{html, Chunks};
pub use jinja::JinjaView;
pub use state::{RenderState, INCLUDES_KEY};

/// A renderable template module
pub trait View: Send + Sync {
    /// Render the view with page data and the shared state
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot produce its output.
    fn render(&self, data: &Value, state: &mut RenderState) -> ViewResult<Chunks>;
}

/// View backed by a plain function
#[derive(Clone)]
pub struct FnView<F> {
    f: F,
}

impl<F> fmt::Debug for FnView<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnView").finish_non_exhaustive()
    }
}

/// Wrap a function as a [`View`]
pub const fn from_fn<F>(f: F) -> FnView<F>
where
    F: Fn(&Value, &mut RenderState) -> ViewResult<Chunks> + Send + Sync,
{
    FnView { f }
}

impl<F> View for FnView<F>
where
    F: Fn(&Value, &mut RenderState) -> ViewResult<Chunks> + Send + Sync,
{
    fn render(&self, data: &Value, state: &mut RenderState) -> ViewResult<Chunks> {
        (self.f)(data, state)
    }
}
