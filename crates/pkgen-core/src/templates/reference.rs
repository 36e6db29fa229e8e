//! Template references: which templates a run should generate.
//!
//! In a config file the `templates` key accepts three shapes:
//!
//! ```yaml
//! templates: pkgpath                    # a single name
//!
//! templates: { template_file: a.tmpl }  # a single object
//!
//! templates:                            # a list mixing both
//!   - pkgpath
//!   - name: otel
//!   - template_file: ./tools/custom.tmpl
//! ```
//!
//! Decoding dispatches on the YAML node kind explicitly; numbers, booleans and
//! nested lists are rejected.

use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{PkgenError, Result};

const NAME_KEY: &str = "name";
const FILE_KEY: &str = "template_file";

/// A single template selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateReference {
    /// A template from the built-in bundle.
    Named(String),
    /// A user-supplied template file.
    File(PathBuf),
}

impl TemplateReference {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::File(_) => None,
        }
    }

    pub fn custom_file(&self) -> Option<&Path> {
        match self {
            Self::Named(_) => None,
            Self::File(path) => Some(path),
        }
    }

    /// Decode one list element: a scalar string or an object.
    fn from_element(value: &Value) -> Result<Self> {
        match value {
            Value::String(name) if !name.is_empty() => Ok(Self::named(name.as_str())),
            Value::String(_) => Err(malformed("empty template name")),
            Value::Mapping(map) => Self::from_mapping(map),
            Value::Tagged(tagged) => Self::from_element(&tagged.value),
            other => Err(malformed(format!(
                "expected a template name or object, found {}",
                kind(other)
            ))),
        }
    }

    fn from_mapping(map: &Mapping) -> Result<Self> {
        let mut name = None;
        let mut file = None;

        for (key, value) in map {
            let key = key
                .as_str()
                .ok_or_else(|| malformed("template object keys must be strings"))?;
            let value = match value {
                Value::String(s) => Some(s.as_str()),
                Value::Null => None,
                other => {
                    return Err(malformed(format!(
                        "'{key}' must be a string, found {}",
                        kind(other)
                    )))
                }
            };
            match key {
                NAME_KEY => name = value.filter(|s| !s.is_empty()),
                FILE_KEY => file = value.filter(|s| !s.is_empty()),
                other => return Err(malformed(format!("unknown template field '{other}'"))),
            }
        }

        match (name, file) {
            (Some(name), None) => Ok(Self::named(name)),
            (None, Some(file)) => Ok(Self::file(file)),
            (None, None) => Err(malformed(format!(
                "template object needs '{NAME_KEY}' or '{FILE_KEY}'"
            ))),
            (Some(_), Some(_)) => Err(malformed(format!(
                "template object sets both '{NAME_KEY}' and '{FILE_KEY}'"
            ))),
        }
    }
}

/// Ordered template references; order drives generation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateReferences(Vec<TemplateReference>);

impl TemplateReferences {
    /// Decode any of the accepted YAML shapes.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::String(_) | Value::Mapping(_) => {
                Ok(Self(vec![TemplateReference::from_element(value)?]))
            }
            Value::Sequence(items) => items
                .iter()
                .map(TemplateReference::from_element)
                .collect::<Result<Vec<_>>>()
                .map(Self),
            Value::Tagged(tagged) => Self::from_value(&tagged.value),
            other => Err(malformed(format!(
                "unsupported templates value: {}",
                kind(other)
            ))),
        }
    }

    pub fn push(&mut self, reference: TemplateReference) {
        self.0.push(reference);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TemplateReference> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[TemplateReference] {
        &self.0
    }
}

impl From<Vec<TemplateReference>> for TemplateReferences {
    fn from(references: Vec<TemplateReference>) -> Self {
        Self(references)
    }
}

impl FromIterator<TemplateReference> for TemplateReferences {
    fn from_iter<I: IntoIterator<Item = TemplateReference>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TemplateReferences {
    type Item = &'a TemplateReference;
    type IntoIter = std::slice::Iter<'a, TemplateReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for TemplateReferences {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(de::Error::custom)
    }
}

fn malformed(message: impl Into<String>) -> PkgenError {
    PkgenError::MalformedTemplateReferences(message.into())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "an object",
        Value::Tagged(_) => "a tagged value",
    }
}
