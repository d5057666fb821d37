//! iTunes category normalization.
//!
//! Configs write categories four ways:
//!
//! ```yaml
//! categories: Technology
//! categories: [Technology, Education]
//! categories: [["Society & Culture", "Personal Journals"], {name: Arts, sub: Design}]
//! categories: {name: Arts, sub: Design}
//! ```
//!
//! [`parse_categories`] classifies the raw value into a [`CategoryInput`] and
//! resolves every shape into [`CategoryPair`]s. The feed writer only ever
//! sees pairs.

use serde_yaml::{Mapping, Value};

/// A parent category with an optional subcategory, both non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPair {
    pub parent: String,
    pub sub: Option<String>,
}

impl CategoryPair {
    pub fn new(parent: impl Into<String>, sub: Option<&str>) -> Self {
        Self {
            parent: parent.into(),
            sub: sub.map(str::to_string),
        }
    }
}

/// Accepted top-level shapes of the `categories` value.
#[derive(Debug)]
pub enum CategoryInput<'a> {
    Single(&'a str),
    List(&'a [Value]),
    Entry(&'a Mapping),
    Unsupported,
}

impl<'a> CategoryInput<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Self::Single(s),
            Value::Sequence(items) => Self::List(items),
            Value::Mapping(map) => Self::Entry(map),
            _ => Self::Unsupported,
        }
    }
}

/// Normalizes any accepted shape into pairs, preserving input order.
///
/// Entries without a usable parent are dropped; siblings are unaffected.
pub fn parse_categories(value: &Value) -> Vec<CategoryPair> {
    match CategoryInput::classify(value) {
        CategoryInput::Single(name) => pair(Some(name), None).into_iter().collect(),
        CategoryInput::List(items) => items.iter().filter_map(list_item).collect(),
        CategoryInput::Entry(map) => entry(map).into_iter().collect(),
        CategoryInput::Unsupported => {
            tracing::debug!("Ignoring categories value of unsupported shape");
            Vec::new()
        }
    }
}

fn list_item(item: &Value) -> Option<CategoryPair> {
    match item {
        Value::String(name) => pair(Some(name), None),
        Value::Sequence(parts) if parts.len() >= 2 => {
            pair(parts[0].as_str(), parts[1].as_str())
        }
        Value::Mapping(map) => entry(map),
        _ => None,
    }
}

fn entry(map: &Mapping) -> Option<CategoryPair> {
    pair(
        map.get("name").and_then(Value::as_str),
        map.get("sub").and_then(Value::as_str),
    )
}

fn pair(parent: Option<&str>, sub: Option<&str>) -> Option<CategoryPair> {
    let parent = parent.map(str::trim).filter(|p| !p.is_empty())?;
    let sub = sub.map(str::trim).filter(|s| !s.is_empty());
    Some(CategoryPair::new(parent, sub))
}
