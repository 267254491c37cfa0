//! Installed-artifact inspection.
//!
//! The pinned-latest fallback and satisfies-checks need the concrete version
//! of an installed platform or plugin. The trait keeps the reconciler
//! independent of the on-disk layout; [`DirInspector`] implements it for the
//! standard project tree, where every installed artifact carries its own
//! package manifest.

use std::path::{Path, PathBuf};

use appstrap_manifest::{PACKAGE_FILENAME, PackageManifest};
use semver::Version;

/// Looks up the concrete installed version of platforms and plugins.
pub trait InstalledInspector {
    fn platform_version(&self, name: &str) -> Option<Version>;
    fn plugin_version(&self, name: &str) -> Option<Version>;
}

/// Inspector over the standard project layout: `platforms/<name>/` and
/// `plugins/<name>/`, each containing the artifact's own package manifest.
pub struct DirInspector {
    root: PathBuf,
}

impl DirInspector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn version_in(&self, dir: &Path) -> Option<Version> {
        let manifest = PackageManifest::load(&dir.join(PACKAGE_FILENAME)).ok()?;
        Version::parse(manifest.version.as_deref()?).ok()
    }
}

impl InstalledInspector for DirInspector {
    fn platform_version(&self, name: &str) -> Option<Version> {
        self.version_in(&self.root.join("platforms").join(name))
    }

    fn plugin_version(&self, name: &str) -> Option<Version> {
        self.version_in(&self.root.join("plugins").join(name))
    }
}

/// An inspector that knows nothing. Used when no project directory is
/// available, e.g. for pure snapshot merges in tests.
pub struct NullInspector;

impl InstalledInspector for NullInspector {
    fn platform_version(&self, _name: &str) -> Option<Version> {
        None
    }

    fn plugin_version(&self, _name: &str) -> Option<Version> {
        None
    }
}

/// List installed platform directories under `root`, sorted by name.
pub fn installed_platforms(root: &Path) -> Vec<String> {
    installed_in(&root.join("platforms"))
}

/// List installed plugin directories under `root`, sorted by name.
pub fn installed_plugins(root: &Path) -> Vec<String> {
    installed_in(&root.join("plugins"))
}

fn installed_in(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}
