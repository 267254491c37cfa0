//! Install-layer seam.
//!
//! Fetching and materializing platform/plugin artifacts is outside the
//! reconciliation engine. Project operations delegate through this trait so
//! the surrounding tool can plug in its real fetch/install pipeline; tests
//! plug in fakes that materialize minimal artifact directories.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;

/// Installs and uninstalls platform/plugin artifacts under a project root.
///
/// `spec` is the resolved spec the caller wants installed, when one is
/// known; implementations may fall back to their own latest-version logic.
pub trait Installer {
    fn install_platform(&self, root: &Path, name: &str, spec: Option<&str>) -> Result<()>;

    fn uninstall_platform(&self, root: &Path, name: &str) -> Result<()>;

    fn install_plugin(
        &self,
        root: &Path,
        name: &str,
        spec: Option<&str>,
        variables: &BTreeMap<String, String>,
    ) -> Result<()>;

    fn uninstall_plugin(&self, root: &Path, name: &str) -> Result<()>;
}

/// An installer that performs no filesystem work.
///
/// Uninstall still clears the artifact directory so that runtime-only
/// removals behave as expected even without a real install pipeline.
pub struct NullInstaller;

impl Installer for NullInstaller {
    fn install_platform(&self, _root: &Path, name: &str, spec: Option<&str>) -> Result<()> {
        tracing::debug!(name, ?spec, "null installer: skipping platform install");
        Ok(())
    }

    fn uninstall_platform(&self, root: &Path, name: &str) -> Result<()> {
        remove_artifact(&root.join("platforms").join(name))
    }

    fn install_plugin(
        &self,
        _root: &Path,
        name: &str,
        spec: Option<&str>,
        _variables: &BTreeMap<String, String>,
    ) -> Result<()> {
        tracing::debug!(name, ?spec, "null installer: skipping plugin install");
        Ok(())
    }

    fn uninstall_plugin(&self, root: &Path, name: &str) -> Result<()> {
        remove_artifact(&root.join("plugins").join(name))
    }
}

fn remove_artifact(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    Ok(())
}
