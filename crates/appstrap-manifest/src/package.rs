//! JSON package-manifest adapter.
//!
//! The package manifest is an npm-style `package.json`. appstrap owns two
//! areas of it: the `appstrap` section (platform list and plugin variable
//! maps) and the `dependencies` entries for appstrap packages. Everything
//! else in the file is preserved verbatim across rewrites.
//!
//! ```json
//! {
//!   "name": "helloapp",
//!   "version": "1.0.0",
//!   "displayName": "HelloApp",
//!   "dependencies": { "appstrap-android": "^7.0.0" },
//!   "appstrap": {
//!     "platforms": ["android"],
//!     "plugins": { "plugin-camera": { "variable_1": "value_1" } }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::Path;

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ProjectConfig;
use crate::entry::{PlatformEntry, PluginEntry};
use crate::error::{Error, Result};
use crate::set::{PlatformSet, PluginSet};

/// Package-name prefix for platform and plugin packages.
pub const PACKAGE_PREFIX: &str = "appstrap-";

/// Derive the package name for a canonical platform/plugin name.
///
/// `android` becomes `appstrap-android`; already-prefixed names are
/// returned unchanged.
pub fn package_name(name: &str) -> String {
    if name.starts_with(PACKAGE_PREFIX) {
        name.to_string()
    } else {
        format!("{PACKAGE_PREFIX}{name}")
    }
}

/// The `appstrap` section of the package manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppstrapSection {
    /// Declared platforms, in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,
    /// Declared plugins with their variable maps.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub plugins: BTreeMap<String, BTreeMap<String, String>>,
}

/// The package manifest, parsed from `package.json`.
///
/// Fields appstrap does not manage are retained through `extra` so a
/// write-back never drops user content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appstrap: Option<AppstrapSection>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl PackageManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh manifest whose identity fields derive from the
    /// project config: `name` from the lower-cased package id, `version`
    /// and `displayName` verbatim.
    pub fn bootstrap(config: &ProjectConfig) -> Self {
        Self {
            name: Some(config.package_id().to_lowercase()),
            version: Some(config.version().to_string()),
            display_name: Some(config.display_name().to_string()),
            ..Self::default()
        }
    }

    /// Load a package manifest with a shared lock.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        file.lock_shared()?;

        let mut content = String::new();
        (&file).read_to_string(&mut content)?;
        tracing::debug!(path = %path.display(), "loaded package manifest");
        serde_json::from_str(&content).map_err(|source| Error::PackageUnreadable {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render the manifest as pretty-printed JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut content =
            serde_json::to_string_pretty(self).map_err(|e| Error::Serialize {
                what: "package manifest",
                reason: e.to_string(),
            })?;
        content.push('\n');
        Ok(content)
    }

    /// Save the manifest atomically with an exclusive lock.
    ///
    /// Writes to a temporary file first and renames over the target.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_json()?)
    }

    /// Snapshot the declared platforms. The spec for each platform comes
    /// from the matching `dependencies` entry, when present.
    pub fn platforms(&self) -> PlatformSet {
        let mut set = PlatformSet::new();
        if let Some(section) = &self.appstrap {
            for name in &section.platforms {
                set.upsert(PlatformEntry {
                    name: name.clone(),
                    spec: self.dependencies.get(&package_name(name)).cloned(),
                });
            }
        }
        set
    }

    /// Snapshot the declared plugins with their variables and specs.
    pub fn plugins(&self) -> PluginSet {
        let mut set = PluginSet::new();
        if let Some(section) = &self.appstrap {
            for (name, variables) in &section.plugins {
                set.upsert(PluginEntry {
                    name: name.clone(),
                    spec: self.dependencies.get(&package_name(name)).cloned(),
                    variables: variables.clone(),
                });
            }
        }
        set
    }

    /// Write a platform entry back: list membership plus dependency spec.
    pub fn apply_platform(&mut self, entry: &PlatformEntry) {
        let section = self.appstrap.get_or_insert_with(AppstrapSection::default);
        if !section.platforms.iter().any(|p| p == &entry.name) {
            section.platforms.push(entry.name.clone());
        }
        if let Some(spec) = &entry.spec {
            self.dependencies
                .insert(package_name(&entry.name), spec.clone());
        }
    }

    /// Write a plugin entry back: variables plus dependency spec.
    pub fn apply_plugin(&mut self, entry: &PluginEntry) {
        let section = self.appstrap.get_or_insert_with(AppstrapSection::default);
        section
            .plugins
            .insert(entry.name.clone(), entry.variables.clone());
        if let Some(spec) = &entry.spec {
            self.dependencies
                .insert(package_name(&entry.name), spec.clone());
        }
    }

    /// Drop a platform from the list and its dependency entry.
    pub fn remove_platform(&mut self, name: &str) {
        if let Some(section) = &mut self.appstrap {
            section.platforms.retain(|p| p != name);
        }
        self.dependencies.remove(&package_name(name));
    }

    /// Drop a plugin and its dependency entry.
    pub fn remove_plugin(&mut self, name: &str) {
        if let Some(section) = &mut self.appstrap {
            section.plugins.remove(name);
        }
        self.dependencies.remove(&package_name(name));
    }
}

/// Locked atomic write shared by both adapters: temp file plus rename under
/// an exclusive advisory lock on the target.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    lock_file.lock_exclusive()?;

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    tracing::debug!(path = %path.display(), "wrote manifest");

    // Lock released when lock_file is dropped
    Ok(())
}
