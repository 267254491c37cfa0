//! In-memory platform and plugin entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A platform declared by one of the manifest sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEntry {
    /// Canonical platform identifier (e.g., `android`, `ios`, `browser`).
    pub name: String,
    /// Version range, URL, or path. `None` when the source lists the
    /// platform without pinning it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
}

impl PlatformEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: None,
        }
    }

    pub fn with_spec(name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: Some(spec.into()),
        }
    }
}

/// A plugin declared by one of the manifest sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEntry {
    /// Canonical plugin identifier.
    pub name: String,
    /// Version range, URL, or path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
    /// Per-plugin variable map. Keys unique; serialized in key order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

impl PluginEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: None,
            variables: BTreeMap::new(),
        }
    }

    pub fn with_spec(name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: Some(spec.into()),
            variables: BTreeMap::new(),
        }
    }

    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }
}
