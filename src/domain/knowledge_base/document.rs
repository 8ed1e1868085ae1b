//! Retrieved document entity

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Metadata value attached to an indexed document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(v) => write!(f, "{}", v),
            MetadataValue::Integer(v) => write!(f, "{}", v),
            MetadataValue::Float(v) => write!(f, "{}", v),
            MetadataValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

/// A document returned by the vector index, in rank order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, MetadataValue>,
    /// Distance reported by the index (lower is closer)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}

impl RetrievedDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: HashMap::new(),
            distance: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = Some(distance);
        self
    }

    /// Metadata value rendered as text, if present
    pub fn meta(&self, key: &str) -> Option<String> {
        self.metadata.get(key).map(ToString::to_string)
    }

    /// Metadata value rendered as text, or `fallback` when absent
    pub fn meta_or(&self, key: &str, fallback: &str) -> String {
        self.meta(key).unwrap_or_else(|| fallback.to_string())
    }

    pub fn title(&self) -> Option<String> {
        self.meta("title")
    }

    pub fn date(&self) -> Option<String> {
        self.meta("date")
    }

    pub fn number(&self) -> Option<String> {
        self.meta("number")
    }
}
