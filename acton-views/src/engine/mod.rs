//! View engine
//!
//! [`ViewEngine`] owns the configuration captured at startup and the
//! [`ViewSource`] views are loaded from. It is cheap to clone and is meant to
//! live in axum state; nothing about it can change after [`ViewEngineBuilder::build`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use acton_views::prelude::*;
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = ViewEngine::builder("./public")
//!     .not_found_view("404/index")
//!     .request_state(|parts| {
//!         let mut state = serde_json::Map::new();
//!         state.insert("path".to_string(), json!(parts.uri.path()));
//!         state
//!     })
//!     .build()?;
//!
//! let html = engine
//!     .render("hello/index", &json!({"name": "world"}), serde_json::Map::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::compose::Composer;
use crate::config::{DiscoveryOrder, ViewSettings, ViewsConfig};
use crate::error::{ViewError, ViewResult};
use crate::source::{FileSystemViews, Presence, ViewRegistry, ViewSource};
use axum::{
    http::{request::Parts, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Builds the base state for a request
///
/// Whatever it returns is merged into the shared state of every render
/// made on behalf of that request.
pub type RequestStateFn = Arc<dyn Fn(&Parts) -> Map<String, Value> + Send + Sync>;

/// Data and base state for a single render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    /// Page data handed to every view
    pub data: Value,
    /// Values merged into the shared state before rendering
    pub state: Map<String, Value>,
}

impl RenderOptions {
    /// Options carrying page data only
    #[must_use]
    pub fn with_data(data: Value) -> Self {
        Self {
            data,
            state: Map::new(),
        }
    }

    /// Add base state values
    #[must_use]
    pub fn state(mut self, state: Map<String, Value>) -> Self {
        self.state = state;
        self
    }
}

struct EngineInner {
    settings: ViewSettings,
    includes_dir: PathBuf,
    source: Arc<dyn ViewSource>,
    request_state: Option<RequestStateFn>,
}

/// File-based view engine
#[derive(Clone)]
pub struct ViewEngine {
    inner: Arc<EngineInner>,
}

impl fmt::Debug for ViewEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewEngine")
            .field("settings", &self.inner.settings)
            .field("includes_dir", &self.inner.includes_dir)
            .field("source", &"ViewSource")
            .field("request_state", &self.inner.request_state.is_some())
            .finish()
    }
}

impl ViewEngine {
    /// Start building an engine rooted at `views_dir`
    #[must_use]
    pub fn builder(views_dir: impl Into<PathBuf>) -> ViewEngineBuilder {
        ViewEngineBuilder::new(ViewSettings::new(views_dir))
    }

    /// Build an engine from loaded configuration
    ///
    /// # Errors
    ///
    /// See [`ViewEngineBuilder::build`].
    pub fn from_config(config: &ViewsConfig) -> ViewResult<Self> {
        ViewEngineBuilder::new(config.views.clone()).build()
    }

    /// Settings captured at build time
    #[must_use]
    pub fn settings(&self) -> &ViewSettings {
        &self.inner.settings
    }

    /// Directory include fragments are discovered in
    #[must_use]
    pub fn includes_dir(&self) -> &Path {
        &self.inner.includes_dir
    }

    /// View id for a logical path
    #[must_use]
    pub fn view_id(&self, logical: &str) -> PathBuf {
        self.inner.settings.view_id(logical)
    }

    /// Base state for a request, empty without a request-state function
    #[must_use]
    pub fn request_state(&self, parts: &Parts) -> Map<String, Value> {
        self.inner
            .request_state
            .as_ref()
            .map(|build| build(parts))
            .unwrap_or_default()
    }

    /// Check whether a view exists at a logical path
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Probe`] when existence cannot be determined.
    pub async fn probe(&self, logical: &str) -> ViewResult<Presence> {
        self.inner.source.probe(&self.view_id(logical)).await
    }

    /// Render a view and all includes to one HTML string
    ///
    /// # Errors
    ///
    /// Returns any load or render error from the view or an include.
    pub async fn render(
        &self,
        logical: &str,
        data: &Value,
        base_state: Map<String, Value>,
    ) -> ViewResult<String> {
        let composer = Composer::new(
            self.inner.source.as_ref(),
            &self.inner.includes_dir,
            self.inner.settings.discovery_order,
        );
        composer.compose(&self.view_id(logical), data, base_state).await
    }

    /// Render and hand the outcome to a callback
    ///
    /// The callback runs exactly once, with the HTML or with the error.
    pub async fn render_with<F>(&self, logical: &str, options: RenderOptions, callback: F)
    where
        F: FnOnce(ViewResult<String>),
    {
        let result = self.render(logical, &options.data, options.state).await;
        callback(result);
    }

    /// Render a view as an HTML response with the given status
    ///
    /// Render failures become a 500 response.
    pub async fn render_response(
        &self,
        logical: &str,
        options: RenderOptions,
        status: StatusCode,
    ) -> Response {
        match self.render(logical, &options.data, options.state).await {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => err.into_response(),
        }
    }
}

/// Builder for [`ViewEngine`]
pub struct ViewEngineBuilder {
    settings: ViewSettings,
    source: Option<Arc<dyn ViewSource>>,
    request_state: Option<RequestStateFn>,
}

impl fmt::Debug for ViewEngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewEngineBuilder")
            .field("settings", &self.settings)
            .field("source", &self.source.is_some())
            .field("request_state", &self.request_state.is_some())
            .finish()
    }
}

impl ViewEngineBuilder {
    /// Builder starting from existing settings
    #[must_use]
    pub const fn new(settings: ViewSettings) -> Self {
        Self {
            settings,
            source: None,
            request_state: None,
        }
    }

    /// Directory of include fragments (default `{views_dir}/includes`)
    ///
    /// Relative directories are resolved against the views directory.
    #[must_use]
    pub fn includes_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.includes_dir = Some(dir.into());
        self
    }

    /// Logical path of the not-found view (default `404/index`)
    ///
    /// Always relative to the views directory; a leading `/` is ignored.
    #[must_use]
    pub fn not_found_view(mut self, view: impl Into<String>) -> Self {
        self.settings.not_found_view = view.into();
        self
    }

    /// File name served for directory requests (default `index`)
    #[must_use]
    pub fn index_basename(mut self, basename: impl Into<String>) -> Self {
        self.settings.index_basename = basename.into();
        self
    }

    /// View file extension (default `html`)
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.settings.extension = extension.into();
        self
    }

    /// Include rendering order (default lexicographic)
    #[must_use]
    pub const fn discovery_order(mut self, order: DiscoveryOrder) -> Self {
        self.settings.discovery_order = order;
        self
    }

    /// Read views from disk on every render instead of scanning once
    #[must_use]
    pub const fn hot_reload(mut self, enabled: bool) -> Self {
        self.settings.hot_reload = enabled;
        self
    }

    /// Function building per-request base state
    #[must_use]
    pub fn request_state<F>(mut self, build: F) -> Self
    where
        F: Fn(&Parts) -> Map<String, Value> + Send + Sync + 'static,
    {
        self.request_state = Some(Arc::new(build));
        self
    }

    /// Use a custom view source instead of the views directory
    #[must_use]
    pub fn source(mut self, source: impl ViewSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Validate settings and build the engine
    ///
    /// Without an explicit source, views come from [`FileSystemViews`] when
    /// hot reload is on and from a [`ViewRegistry`] scanned now otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Config`] for invalid settings or a missing views
    /// directory, and scan errors from [`ViewRegistry::scan`].
    pub fn build(self) -> ViewResult<ViewEngine> {
        let mut settings = self.settings;
        settings.not_found_view = settings.not_found_view.trim_start_matches('/').to_string();
        validate(&settings)?;
        let includes_dir = settings.resolved_includes_dir();

        let source: Arc<dyn ViewSource> = match self.source {
            Some(source) => source,
            None if settings.hot_reload => Arc::new(FileSystemViews::new(settings.extension.clone())),
            None => {
                if !settings.views_dir.is_dir() {
                    return Err(ViewError::Config(format!(
                        "views directory {} does not exist",
                        settings.views_dir.display()
                    )));
                }
                let registry = ViewRegistry::scan(
                    &[settings.views_dir.as_path(), includes_dir.as_path()],
                    &settings.extension,
                )?;
                tracing::debug!(views = registry.len(), "Scanned view directories");
                Arc::new(registry)
            }
        };

        tracing::debug!(
            views_dir = %settings.views_dir.display(),
            includes_dir = %includes_dir.display(),
            not_found_view = %settings.not_found_view,
            hot_reload = settings.hot_reload,
            "View engine configured"
        );

        Ok(ViewEngine {
            inner: Arc::new(EngineInner {
                settings,
                includes_dir,
                source,
                request_state: self.request_state,
            }),
        })
    }
}

fn validate(settings: &ViewSettings) -> ViewResult<()> {
    if settings.not_found_view.trim().is_empty() {
        return Err(ViewError::Config("not_found_view must not be empty".to_string()));
    }
    if settings.index_basename.is_empty() || settings.index_basename.contains('/') {
        return Err(ViewError::Config(format!(
            "index_basename must be a plain file name, got {:?}",
            settings.index_basename
        )));
    }
    if settings.extension.is_empty() || settings.extension.starts_with('.') {
        return Err(ViewError::Config(format!(
            "extension must be given without a leading dot, got {:?}",
            settings.extension
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ViewFixture;
    use crate::view::{from_fn, Chunks};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use std::sync::Mutex;

    fn hello_registry() -> ViewRegistry {
        let mut registry = ViewRegistry::new();
        registry.insert("/views/includes/head", from_fn(|_, _| Ok(Chunks::from("<meta>"))));
        registry.insert(
            "/views/hello/index",
            from_fn(|data, state| {
                Ok(crate::chunks![
                    "<h1>",
                    data["name"].as_str().unwrap_or_default(),
                    "</h1>",
                    state.include("head").unwrap_or_default()
                ])
            }),
        );
        registry
    }

    fn engine() -> ViewEngine {
        ViewEngine::builder("/views")
            .source(hello_registry())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let engine = engine();
        assert_eq!(engine.includes_dir(), Path::new("/views/includes"));
        assert_eq!(engine.settings().not_found_view, "404/index");
        assert_eq!(engine.settings().index_basename, "index");
        assert_eq!(engine.view_id("hello/index"), PathBuf::from("/views/hello/index"));
    }

    #[test]
    fn test_builder_rejects_invalid_settings() {
        let err = ViewEngine::builder("/views")
            .source(ViewRegistry::new())
            .index_basename("a/b")
            .build()
            .unwrap_err();
        assert!(matches!(err, ViewError::Config(_)));

        let err = ViewEngine::builder("/views")
            .source(ViewRegistry::new())
            .extension(".html")
            .build()
            .unwrap_err();
        assert!(matches!(err, ViewError::Config(_)));
    }

    #[test]
    fn test_build_without_views_dir_fails() {
        let err = ViewEngine::builder("/definitely/not/a/views/dir")
            .hot_reload(false)
            .build()
            .unwrap_err();
        assert!(matches!(err, ViewError::Config(_)));
    }

    #[tokio::test]
    async fn test_render() {
        let html = engine()
            .render("hello/index", &json!({"name": "world"}), Map::new())
            .await
            .unwrap();
        assert_eq!(html, "<h1>world</h1><meta>");
    }

    #[tokio::test]
    async fn test_render_with_callback_success_and_failure() {
        let engine = engine();
        let outcome = Mutex::new(Vec::new());

        engine
            .render_with(
                "hello/index",
                RenderOptions::with_data(json!({"name": "cb"})),
                |result| outcome.lock().unwrap().push(result.map_err(|e| e.to_string())),
            )
            .await;
        engine
            .render_with("missing/index", RenderOptions::default(), |result| {
                outcome.lock().unwrap().push(result.map_err(|e| e.to_string()));
            })
            .await;

        let outcome = outcome.into_inner().unwrap();
        assert_eq!(outcome[0], Ok("<h1>cb</h1><meta>".to_string()));
        assert!(outcome[1].is_err());
    }

    #[tokio::test]
    async fn test_render_response_status() {
        let response = engine()
            .render_response(
                "hello/index",
                RenderOptions::with_data(json!({"name": "x"})),
                StatusCode::CREATED,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = engine()
            .render_response("nope", RenderOptions::default(), StatusCode::OK)
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_request_state() {
        let engine = ViewEngine::builder("/views")
            .source(ViewRegistry::new())
            .request_state(|parts| {
                let mut state = Map::new();
                state.insert("path".to_string(), json!(parts.uri.path()));
                state
            })
            .build()
            .unwrap();

        let (parts, ()) = Request::get("/docs").body(()).unwrap().into_parts();
        assert_eq!(engine.request_state(&parts).get("path"), Some(&json!("/docs")));

        let plain = self::engine();
        let (parts, _) = Request::get("/").body(Body::empty()).unwrap().into_parts();
        assert!(plain.request_state(&parts).is_empty());
    }

    #[tokio::test]
    async fn test_not_found_view_stays_under_views_dir() {
        let fixture = ViewFixture::new().with_view("404/index.html", "missing");

        let engine = ViewEngine::builder(fixture.root())
            .not_found_view("/404/index")
            .hot_reload(true)
            .build()
            .unwrap();
        assert_eq!(engine.settings().not_found_view, "404/index");

        let html = engine
            .render(&engine.settings().not_found_view, &json!({}), Map::new())
            .await
            .unwrap();
        assert_eq!(html, "missing");

        let err = ViewEngine::builder(fixture.root())
            .not_found_view("/")
            .build()
            .unwrap_err();
        assert!(matches!(err, ViewError::Config(_)));
    }

    #[tokio::test]
    async fn test_concurrent_renders_keep_their_own_state() {
        let fixture = ViewFixture::new()
            .with_view("includes/who.html", "{{ state.user }}")
            .with_view("page.html", "{{ state.includes.who }}:{{ state.user }}");
        let engine = ViewEngine::builder(fixture.root())
            .hot_reload(true)
            .build()
            .unwrap();

        let base = |user: &str| {
            let mut state = Map::new();
            state.insert("user".to_string(), json!(user));
            state
        };
        let ctx_ada = json!({});
        let ctx_bob = json!({});
        let (ada, bob) = tokio::join!(
            engine.render("page", &ctx_ada, base("ada")),
            engine.render("page", &ctx_bob, base("bob")),
        );

        assert_eq!(ada.unwrap(), "ada:ada");
        assert_eq!(bob.unwrap(), "bob:bob");
    }

    #[tokio::test]
    async fn test_scanned_engine_renders_files() {
        let fixture = ViewFixture::new()
            .with_view("includes/head.html", "<title>{{ data.title }}</title>")
            .with_view("index.html", "{{ state.includes.head }}<main>{{ data.title }}</main>");

        let engine = ViewEngine::builder(fixture.root())
            .hot_reload(false)
            .build()
            .unwrap();
        let html = engine
            .render("index", &json!({"title": "Home"}), Map::new())
            .await
            .unwrap();
        assert_eq!(html, "<title>Home</title><main>Home</main>");
    }
}
