//! Directory index example
//!
//! Demonstrates:
//! - Building a view engine over `demos/views`
//! - Rendering a view from a route handler with request state
//! - Directory index routing with a not-found view
//! - Static files as the pass-through target
//!
//! Run with: `cargo run --example static_index`

use acton_views::{observability, prelude::*};
use axum::{extract::State, http::StatusCode, response::Response, routing::get, Router};
use serde_json::json;
use std::path::PathBuf;
use tower::Layer;
use tower_http::services::ServeDir;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init()?;

    let demos = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos");

    let engine = ViewEngine::builder(demos.join("views"))
        .hot_reload(true)
        .request_state(|parts| {
            let mut state = serde_json::Map::new();
            state.insert("path".to_string(), json!(parts.uri.path()));
            state
        })
        .build()?;

    tracing::info!(
        views_dir = %engine.settings().views_dir.display(),
        includes_dir = %engine.includes_dir().display(),
        "View engine ready"
    );

    let app = Router::new()
        .route("/hello", get(hello))
        .fallback_service(
            StaticIndexLayer::new(engine.clone()).layer(ServeDir::new(demos.join("static"))),
        )
        .with_state(engine);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:2222").await?;
    tracing::info!("Server listening on http://127.0.0.1:2222");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Render the hello page with page data
async fn hello(State(views): State<ViewEngine>, RequestState(state): RequestState) -> Response {
    let options = RenderOptions::with_data(json!({"name": "world"})).state(state);
    views.render_response("hello/index", options, StatusCode::OK).await
}
