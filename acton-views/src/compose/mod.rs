//! Template composition
//!
//! [`Composer::compose`] renders every fragment in the includes directory into
//! the shared state, then renders the top-level view with all fragments
//! available under `state.includes`.
//!
//! Fragments render one after another in the configured [`DiscoveryOrder`].
//! A fragment sees the fragments rendered before it and never the ones after
//! it; the top-level view always sees all of them.

use crate::config::DiscoveryOrder;
use crate::error::ViewResult;
use crate::source::ViewSource;
use crate::view::RenderState;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Renders a view together with its includes
pub struct Composer<'a, S: ?Sized> {
    source: &'a S,
    includes_dir: &'a Path,
    order: DiscoveryOrder,
}

impl<'a, S: ViewSource + ?Sized> Composer<'a, S> {
    /// Create a composer over a view source and includes directory
    #[must_use]
    pub const fn new(source: &'a S, includes_dir: &'a Path, order: DiscoveryOrder) -> Self {
        Self {
            source,
            includes_dir,
            order,
        }
    }

    /// Render the view `id` to one HTML string
    ///
    /// `base_state` seeds the shared state; its `includes` key, if any, is
    /// replaced by the rendered fragments.
    ///
    /// # Errors
    ///
    /// Returns the first load or render error from a fragment or the view
    /// itself, unchanged.
    pub async fn compose(
        &self,
        id: &Path,
        data: &Value,
        base_state: Map<String, Value>,
    ) -> ViewResult<String> {
        let mut state = RenderState::new(base_state);
        self.render_includes(data, &mut state).await?;
        self.render_one(id, data, &mut state).await
    }

    /// Render every discovered fragment into `state`, in order
    ///
    /// # Errors
    ///
    /// Returns discovery, load and render errors.
    pub async fn render_includes(&self, data: &Value, state: &mut RenderState) -> ViewResult<()> {
        for fragment in self.fragments().await? {
            let Some(name) = fragment_name(&fragment) else {
                continue;
            };
            let html = self.render_one(&fragment, data, state).await?;
            state.set_include(name, html);
        }
        Ok(())
    }

    /// Discovered fragment ids in render order
    async fn fragments(&self) -> ViewResult<Vec<PathBuf>> {
        let mut fragments = self.source.discover(self.includes_dir).await?;
        if self.order == DiscoveryOrder::Lexicographic {
            fragments.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        }
        Ok(fragments)
    }

    async fn render_one(&self, id: &Path, data: &Value, state: &mut RenderState) -> ViewResult<String> {
        tracing::debug!(view = %id.display(), "Rendering view");
        let view = self.source.load(id).await?;
        Ok(view.render(data, state)?.into_html())
    }
}

/// Key a fragment is stored under: its file name
fn fragment_name(id: &Path) -> Option<String> {
    id.file_name().map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewError;
    use crate::source::{MockViewSource, ViewRegistry};
    use crate::view::{from_fn, Chunks, View};
    use serde_json::json;
    use std::sync::Arc;

    const INCLUDES: &str = "/views/includes";

    fn registry_with_head() -> ViewRegistry {
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

    #[tokio::test]
    async fn test_compose_hello_world() {
        let registry = registry_with_head();
        let composer = Composer::new(&registry, Path::new(INCLUDES), DiscoveryOrder::default());

        let html = composer
            .compose(
                Path::new("/views/hello/index"),
                &json!({"name": "world"}),
                Map::new(),
            )
            .await
            .unwrap();
        assert_eq!(html, "<h1>world</h1><meta>");
    }

    #[tokio::test]
    async fn test_fragments_see_only_earlier_siblings() {
        let mut registry = ViewRegistry::new();
        let seen = |label: &'static str| {
            from_fn(move |_, state: &mut RenderState| {
                let names: Vec<&str> = state.includes().keys().map(String::as_str).collect();
                Ok(Chunks::from(format!("{label}[{}]", names.join(","))))
            })
        };
        registry.insert("/views/includes/a", seen("a"));
        registry.insert("/views/includes/b", seen("b"));
        registry.insert("/views/includes/c", seen("c"));
        registry.insert("/views/page", seen("page"));

        let composer = Composer::new(&registry, Path::new(INCLUDES), DiscoveryOrder::Lexicographic);
        let mut state = RenderState::default();
        composer.render_includes(&json!({}), &mut state).await.unwrap();

        assert_eq!(state.include("a"), Some("a[]"));
        assert_eq!(state.include("b"), Some("b[a]"));
        assert_eq!(state.include("c"), Some("c[a,b]"));

        let html = composer
            .compose(Path::new("/views/page"), &json!({}), Map::new())
            .await
            .unwrap();
        assert_eq!(html, "page[a,b,c]");
    }

    #[tokio::test]
    async fn test_base_state_is_visible_and_includes_key_reserved() {
        let mut registry = ViewRegistry::new();
        registry.insert(
            "/views/includes/greeting",
            from_fn(|_, state| {
                let user = state.get("user").and_then(Value::as_str).unwrap_or("anon");
                Ok(Chunks::from(format!("hi {user}")))
            }),
        );
        registry.insert(
            "/views/index",
            from_fn(|_, state| {
                Ok(crate::chunks![
                    state.include("greeting").unwrap_or_default(),
                    "|",
                    state.includes().len()
                ])
            }),
        );

        let mut base = Map::new();
        base.insert("user".to_string(), json!("ada"));
        base.insert("includes".to_string(), json!({"bogus": "x"}));

        let composer = Composer::new(&registry, Path::new(INCLUDES), DiscoveryOrder::default());
        let html = composer
            .compose(Path::new("/views/index"), &json!({}), base)
            .await
            .unwrap();
        assert_eq!(html, "hi ada|1");
    }

    #[tokio::test]
    async fn test_compose_is_idempotent() {
        let registry = registry_with_head();
        let composer = Composer::new(&registry, Path::new(INCLUDES), DiscoveryOrder::default());
        let data = json!({"name": "again"});

        let first = composer
            .compose(Path::new("/views/hello/index"), &data, Map::new())
            .await
            .unwrap();
        let second = composer
            .compose(Path::new("/views/hello/index"), &data, Map::new())
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_source_order_is_kept() {
        let mut source = MockViewSource::new();
        source.expect_discover().returning(|_| {
            Ok(vec![
                PathBuf::from("/views/includes/zeta"),
                PathBuf::from("/views/includes/alpha"),
            ])
        });
        source.expect_load().returning(|id| {
            let label = id.file_name().unwrap().to_string_lossy().into_owned();
            let view: Arc<dyn View> = Arc::new(from_fn(move |_, state: &mut RenderState| {
                let before: Vec<&str> = state.includes().keys().map(String::as_str).collect();
                Ok(Chunks::from(format!("{label}:{}", before.join(","))))
            }));
            Ok(view)
        });

        let composer = Composer::new(&source, Path::new(INCLUDES), DiscoveryOrder::Source);
        let mut state = RenderState::default();
        composer.render_includes(&json!({}), &mut state).await.unwrap();

        assert_eq!(state.include("zeta"), Some("zeta:"));
        assert_eq!(state.include("alpha"), Some("alpha:zeta"));
    }

    #[tokio::test]
    async fn test_fragment_error_stops_composition() {
        let mut registry = registry_with_head();
        registry.insert(
            "/views/includes/broken",
            from_fn(|_, _| Err(ViewError::render("includes/broken", "boom"))),
        );
        let composer = Composer::new(&registry, Path::new(INCLUDES), DiscoveryOrder::default());

        let err = composer
            .compose(Path::new("/views/hello/index"), &json!({}), Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ViewError::Render { .. }));
    }

    #[tokio::test]
    async fn test_missing_view_is_load_error() {
        let registry = registry_with_head();
        let composer = Composer::new(&registry, Path::new(INCLUDES), DiscoveryOrder::default());

        let err = composer
            .compose(Path::new("/views/nope"), &json!({}), Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ViewError::NotFound(_)));
    }
}
