//! minijinja-backed file views

use super::{Chunks, RenderState, View};
use crate::error::{ViewError, ViewResult};
use minijinja::{context, Environment, Value as TemplateValue};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Template environment shared by file views
pub(crate) fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env
}

/// Add one template source to an environment
pub(crate) fn add_source(
    env: &mut Environment<'static>,
    name: String,
    source: String,
) -> ViewResult<()> {
    env.add_template_owned(name.clone(), source)
        .map_err(|source| ViewError::Compile { name, source })
}

/// View rendered from a minijinja template
///
/// The template sees two variables: `data` (the page data) and `state`
/// (custom state values plus `state.includes`). Templates whose name ends in
/// `.html` are autoescaped; rendered includes are already safe.
#[derive(Clone)]
pub struct JinjaView {
    env: Arc<Environment<'static>>,
    name: String,
}

impl fmt::Debug for JinjaView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JinjaView").field("name", &self.name).finish()
    }
}

impl JinjaView {
    /// Compile a standalone view from source
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Compile`] if the source is not a valid template.
    pub fn compile(name: impl Into<String>, source: impl Into<String>) -> ViewResult<Self> {
        let name = name.into();
        let mut env = environment();
        add_source(&mut env, name.clone(), source.into())?;
        Ok(Self {
            env: Arc::new(env),
            name,
        })
    }

    /// View over a template already present in a shared environment
    pub(crate) const fn shared(env: Arc<Environment<'static>>, name: String) -> Self {
        Self { env, name }
    }

    /// Template name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl View for JinjaView {
    fn render(&self, data: &Value, state: &mut RenderState) -> ViewResult<Chunks> {
        let render_err = |err: minijinja::Error| ViewError::render(self.name(), err.to_string());

        let template = self.env.get_template(&self.name).map_err(render_err)?;
        let html = template
            .render(context! {
                data => TemplateValue::from_serialize(data),
                state => state.to_template_value(),
            })
            .map_err(render_err)?;

        Ok(Chunks::from(html))
    }
}
