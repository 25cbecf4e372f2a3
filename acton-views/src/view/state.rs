//! Per-render shared state

use minijinja::Value as TemplateValue;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Reserved state key holding rendered include fragments
pub const INCLUDES_KEY: &str = "includes";

/// Mutable state shared by every view invoked during one top-level render
///
/// Holds request-derived values plus the reserved `includes` map. Views may
/// read and write custom values; the includes map is only written by the
/// composer, one fragment at a time, so a fragment sees exactly the
/// fragments rendered before it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderState {
    values: Map<String, Value>,
    includes: BTreeMap<String, String>,
}

impl RenderState {
    /// Fresh state seeded with base values
    ///
    /// A base value stored under `includes` is dropped: the reserved key
    /// always starts empty.
    #[must_use]
    pub fn new(mut base: Map<String, Value>) -> Self {
        base.remove(INCLUDES_KEY);
        Self {
            values: base,
            includes: BTreeMap::new(),
        }
    }

    /// Custom state value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Store a custom state value, returning the previous one
    ///
    /// Writes to the reserved `includes` key are ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        if key == INCLUDES_KEY {
            return None;
        }
        self.values.insert(key, value.into())
    }

    /// Rendered fragment by name
    #[must_use]
    pub fn include(&self, name: &str) -> Option<&str> {
        self.includes.get(name).map(String::as_str)
    }

    /// Every fragment rendered so far, keyed by name
    #[must_use]
    pub const fn includes(&self) -> &BTreeMap<String, String> {
        &self.includes
    }

    pub(crate) fn set_include(&mut self, name: String, html: String) {
        self.includes.insert(name, html);
    }

    /// Template context form of the state
    ///
    /// Fragments are marked safe so autoescaping templates emit them verbatim.
    #[must_use]
    pub fn to_template_value(&self) -> TemplateValue {
        let mut map: BTreeMap<String, TemplateValue> = self
            .values
            .iter()
            .map(|(key, value)| (key.clone(), TemplateValue::from_serialize(value)))
            .collect();

        let includes: BTreeMap<String, TemplateValue> = self
            .includes
            .iter()
            .map(|(name, html)| (name.clone(), TemplateValue::from_safe_string(html.clone())))
            .collect();
        map.insert(INCLUDES_KEY.to_string(), TemplateValue::from(includes));

        TemplateValue::from(map)
    }
}
