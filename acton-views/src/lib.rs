//! acton-views: File-based view engine for axum applications
//!
//! Renders a view together with every fragment in an includes directory, and
//! serves directory-style requests from `index` views with a not-found
//! fallback.
//!
//! - **Composition**: all includes render first, one at a time, into a shared
//!   state; the page view then sees them under `state.includes`
//! - **Directory indexes**: `/docs` renders `docs/index`, a missing index
//!   renders the not-found view with 404
//! - **Views**: minijinja files on disk, or plain functions registered in code
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use acton_views::prelude::*;
//! use axum::{extract::State, http::StatusCode, response::Response, routing::get, Router};
//! use serde_json::json;
//! use tower::Layer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     acton_views::observability::init()?;
//!
//!     // Scans ./public and ./public/includes for *.html views
//!     let engine = ViewEngine::builder("./public").build()?;
//!
//!     let app = Router::new()
//!         .route("/hello", get(hello))
//!         .fallback_service(StaticIndexLayer::new(engine.clone()).layer(
//!             tower::service_fn(|_req: axum::extract::Request| async {
//!                 Ok::<_, std::convert::Infallible>("static")
//!             }),
//!         ))
//!         .with_state(engine);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//!
//! async fn hello(State(views): State<ViewEngine>, RequestState(state): RequestState) -> Response {
//!     let options = RenderOptions::with_data(json!({"name": "world"})).state(state);
//!     views.render_response("hello/index", options, StatusCode::OK).await
//! }
//! ```

// Lint configuration is handled at the workspace level in Cargo.toml

pub mod compose;
pub mod config;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod observability;
pub mod source;
pub mod view;

#[cfg(test)]
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use acton_views::prelude::*;
    //! ```

    pub use crate::chunks;

    // Engine
    pub use crate::engine::{RenderOptions, RequestStateFn, ViewEngine, ViewEngineBuilder};

    // Configuration
    pub use crate::config::{DiscoveryOrder, ViewSettings, ViewsConfig};

    // Views
    pub use crate::view::{from_fn, html, Chunks, FnView, JinjaView, RenderState, View};

    // Sources
    pub use crate::source::{FileSystemViews, Presence, ViewRegistry, ViewSource};

    // Middleware and extractors
    pub use crate::extractors::RequestState;
    pub use crate::middleware::{StaticIndexLayer, StaticIndexMiddleware};

    // Error types
    pub use crate::error::{ViewError, ViewResult};

    // Re-export key dependencies
    pub use axum;
    pub use minijinja;
}
