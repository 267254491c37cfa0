//! TOML project-config adapter.
//!
//! The project config (`appstrap.toml`) carries the app identity and the
//! engine/plugin declarations:
//!
//! ```toml
//! id = "com.example.hello"
//! name = "HelloApp"
//! version = "1.0.0"
//!
//! [[engine]]
//! name = "android"
//! spec = "~7.0.0"
//!
//! [[plugin]]
//! name = "plugin-camera"
//! spec = "^2.3.0"
//!
//! [plugin.variables]
//! variable_1 = "value_1"
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::entry::{PlatformEntry, PluginEntry};
use crate::error::{Error, Result};
use crate::package::write_atomic;
use crate::set::{PlatformSet, PluginSet};

/// The project config, parsed from `appstrap.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Reverse-domain package identifier (e.g., `com.example.hello`).
    #[serde(default)]
    pub id: String,
    /// Human-readable application name.
    #[serde(default)]
    pub name: String,
    /// Application version.
    #[serde(default)]
    pub version: String,
    /// Declared engines (platforms), in file order.
    #[serde(default, rename = "engine", skip_serializing_if = "Vec::is_empty")]
    engines: Vec<PlatformEntry>,
    /// Declared plugins, in file order.
    #[serde(default, rename = "plugin", skip_serializing_if = "Vec::is_empty")]
    plugins: Vec<PluginEntry>,
}

impl ProjectConfig {
    /// Parse a project config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::ConfigUnreadable {
            path: std::path::PathBuf::new(),
            source,
        })
    }

    /// Load the project config with a shared lock.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        file.lock_shared()?;

        let mut content = String::new();
        (&file).read_to_string(&mut content)?;
        toml::from_str(&content).map_err(|source| Error::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render the config as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Serialize {
            what: "project config",
            reason: e.to_string(),
        })
    }

    /// Save the config atomically with an exclusive lock.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_toml()?)
    }

    /// Snapshot the declared engines.
    pub fn engines(&self) -> PlatformSet {
        self.engines.iter().cloned().collect()
    }

    /// Snapshot the declared plugins.
    pub fn plugins(&self) -> PluginSet {
        self.plugins.iter().cloned().collect()
    }

    /// Look up a single plugin by name.
    pub fn plugin(&self, name: &str) -> Option<&PluginEntry> {
        self.plugins.iter().find(|p| p.name == name)
    }

    /// Insert or replace an engine, preserving its position.
    pub fn add_engine(&mut self, entry: PlatformEntry) {
        match self.engines.iter().position(|e| e.name == entry.name) {
            Some(pos) => self.engines[pos] = entry,
            None => self.engines.push(entry),
        }
    }

    /// Remove an engine by name.
    pub fn remove_engine(&mut self, name: &str) {
        self.engines.retain(|e| e.name != name);
    }

    /// Insert or replace a plugin, preserving its position.
    pub fn add_plugin(&mut self, entry: PluginEntry) {
        match self.plugins.iter().position(|p| p.name == entry.name) {
            Some(pos) => self.plugins[pos] = entry,
            None => self.plugins.push(entry),
        }
    }

    /// Remove a plugin by name.
    pub fn remove_plugin(&mut self, name: &str) {
        self.plugins.retain(|p| p.name != name);
    }

    /// The reverse-domain package identifier.
    pub fn package_id(&self) -> &str {
        &self.id
    }

    /// The application version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The human-readable application name.
    pub fn display_name(&self) -> &str {
        &self.name
    }
}
