//! Directory index middleware
//!
//! Requests for extensionless paths are served by the index view of the
//! matching directory: `/` renders `index`, `/docs/guide` renders
//! `docs/guide/index`. When that view does not exist the configured
//! not-found view is rendered with a 404 status. Paths with an extension are
//! handed to the wrapped service untouched.
//!
//! The layer is meant to wrap the router's fallback, so explicit routes keep
//! priority over directory indexes:
//!
//! ```rust,no_run
//! use acton_views::prelude::*;
//! use axum::{routing::get, Router};
//! use tower::Layer;
//! use tower_http::services::ServeDir;
//!
//! # fn example() -> anyhow::Result<()> {
//! let engine = ViewEngine::builder("./public").build()?;
//!
//! let app: Router = Router::new()
//!     .route("/health", get(|| async { "ok" }))
//!     .fallback_service(StaticIndexLayer::new(engine).layer(ServeDir::new("./static")));
//! # Ok(())
//! # }
//! ```

use crate::engine::ViewEngine;
use crate::error::ViewResult;
use axum::{
    extract::Request,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::{Map, Value};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// What an extensionless request should render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexTarget {
    /// Logical path of the candidate index view
    View(String),
    /// The path cannot name a view; render the not-found view
    NotFound,
}

/// Map a request path to the index view it asks for
///
/// Returns `None` when the path has a file extension: such requests are
/// not handled here. One leading and one trailing `/` are ignored. Paths
/// with empty, `.` or `..` segments never name a view.
#[must_use]
pub fn resolve_index(path: &str, basename: &str) -> Option<IndexTarget> {
    if Path::new(path).extension().is_some() {
        return None;
    }

    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Some(IndexTarget::View(basename.to_string()));
    }

    if trimmed
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Some(IndexTarget::NotFound);
    }

    Some(IndexTarget::View(format!("{trimmed}/{basename}")))
}

/// Render the response for an index target
///
/// An existing candidate renders with 200; a missing one renders the
/// not-found view with 404. Both go through the full include pipeline with
/// the same base state.
///
/// # Errors
///
/// Returns probe failures other than "not found", and any render error.
pub async fn serve_index(
    engine: &ViewEngine,
    target: IndexTarget,
    base_state: Map<String, Value>,
) -> ViewResult<Response> {
    let data = Value::Object(Map::new());

    if let IndexTarget::View(candidate) = &target {
        if engine.probe(candidate).await?.is_found() {
            tracing::debug!(view = %candidate, "Serving directory index");
            let html = engine.render(candidate, &data, base_state).await?;
            return Ok(Html(html).into_response());
        }
    }

    let not_found = &engine.settings().not_found_view;
    tracing::debug!(?target, view = %not_found, "No index view, serving not-found view");
    let html = engine.render(not_found, &data, base_state).await?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

/// Layer for the directory index middleware
#[derive(Debug, Clone)]
pub struct StaticIndexLayer {
    engine: ViewEngine,
}

impl StaticIndexLayer {
    /// Create a layer serving indexes from the engine's views
    #[must_use]
    pub const fn new(engine: ViewEngine) -> Self {
        Self { engine }
    }
}

impl<S> Layer<S> for StaticIndexLayer {
    type Service = StaticIndexMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        StaticIndexMiddleware {
            inner,
            engine: self.engine.clone(),
        }
    }
}

/// Middleware serving directory index views
///
/// Each request results in exactly one of: a call to the wrapped service,
/// an index render, a not-found render, or a 500 when the existence check
/// or a render fails.
#[derive(Debug, Clone)]
pub struct StaticIndexMiddleware<S> {
    inner: S,
    engine: ViewEngine,
}

impl<S> Service<Request> for StaticIndexMiddleware<S>
where
    S: Service<Request> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let target = resolve_index(req.uri().path(), &self.engine.settings().index_basename);

        let Some(target) = target else {
            let future = self.inner.call(req);
            return Box::pin(async move { future.await.map(IntoResponse::into_response) });
        };

        let engine = self.engine.clone();
        Box::pin(async move {
            let (parts, _body) = req.into_parts();
            let base_state = engine.request_state(&parts);

            Ok(serve_index(&engine, target, base_state)
                .await
                .unwrap_or_else(IntoResponse::into_response))
        })
    }
}
