//! Travis configuration decoding.

use crate::defaults::DEFAULT_LANGUAGE;
use gridci_core::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Raw `.travis.yml` document.
///
/// Only the fields the matrix cares about are decoded eagerly; every
/// other top-level key is retained in `extra` so the language-dependent
/// version field can be looked up by its alias afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct TravisConfig {
    pub language: Option<String>,
    pub env: Option<OneOrMany>,
    pub before_install: Option<OneOrMany>,
    pub install: Option<OneOrMany>,
    pub before_script: Option<OneOrMany>,
    pub script: Option<OneOrMany>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A field that may be written as a single scalar or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Coerce to a list; scalars become one-element lists.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

impl TravisConfig {
    /// Decode a YAML document.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Declared language, falling back to the dialect default.
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Runtime versions listed under the given field name.
    ///
    /// Unquoted YAML versions such as `8.3` decode as numbers; they are
    /// rendered back to their display strings. A scalar field counts as
    /// a one-element list. Missing field or non-scalar entries yield an
    /// empty list.
    pub fn versions(&self, version_key: &str) -> Vec<String> {
        match self.extra.get(version_key) {
            Some(serde_yaml::Value::Sequence(items)) => {
                items.iter().filter_map(scalar_to_string).collect()
            }
            Some(value) => scalar_to_string(value).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
