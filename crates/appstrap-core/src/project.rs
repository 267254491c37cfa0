//! Project-level operations: add, remove, restore.
//!
//! These are the entry points the CLI layer calls. Each operation settles
//! its install/uninstall work first and only then runs a reconciliation
//! pass, so the engine never merges while an install for the same entity is
//! in flight. The `save` flag gates every manifest write: without it an
//! add/remove is a runtime-only change and the next restore will bring the
//! on-disk artifacts back in line with the (unchanged) manifests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use appstrap_manifest::{
    CONFIG_FILENAME, PACKAGE_FILENAME, PackageManifest, PlatformEntry, PluginEntry, ProjectConfig,
};
use appstrap_spec::Spec;

use crate::diagnostics::Diagnostic;
use crate::error::{Error, Result};
use crate::inspector::{DirInspector, InstalledInspector, installed_platforms, installed_plugins};
use crate::install::{Installer, NullInstaller};
use crate::reconciler::{ReconcileOptions, ReconcileOutcome, Snapshot, reconcile};

/// Options for add operations.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Persist the addition into both manifests.
    pub save: bool,
    /// Plugin variables supplied by the caller (ignored for platforms).
    pub variables: BTreeMap<String, String>,
}

/// Options for remove operations.
#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Persist the removal into both manifests.
    pub save: bool,
}

/// What an operation did, plus any non-fatal reconciliation issues.
#[derive(Debug, Clone, Default)]
pub struct OperationReport {
    pub actions: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl OperationReport {
    fn with_action(mut self, action: String) -> Self {
        self.actions.push(action);
        self
    }
}

/// An add/remove target: a canonical name with an optional explicit spec.
///
/// Accepted forms: `android`, `ios@4.5.4`, `browser@^5.0.0`, a URL, or a
/// local path (the name then derives from the final path segment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub spec: Option<String>,
}

impl Target {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidTarget {
                target: raw.to_string(),
                reason: "empty target".to_string(),
            });
        }

        if is_location_target(trimmed) {
            let name = location_name(trimmed).ok_or_else(|| Error::InvalidTarget {
                target: raw.to_string(),
                reason: "cannot derive a name from the location".to_string(),
            })?;
            return Ok(Self {
                name,
                spec: Some(trimmed.to_string()),
            });
        }

        let (name, spec) = match trimmed.rsplit_once('@') {
            Some((name, spec)) if !name.is_empty() && !spec.is_empty() => {
                (name, Some(spec.to_string()))
            }
            Some(_) => {
                return Err(Error::InvalidTarget {
                    target: raw.to_string(),
                    reason: "expected <name> or <name>@<spec>".to_string(),
                });
            }
            None => (trimmed, None),
        };

        if name.contains(char::is_whitespace) {
            return Err(Error::InvalidTarget {
                target: raw.to_string(),
                reason: "name contains whitespace".to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            spec,
        })
    }
}

fn is_location_target(s: &str) -> bool {
    s.contains("://")
        || s.starts_with("git+")
        || s.starts_with("file:")
        || s.starts_with("./")
        || s.starts_with("../")
        || s.starts_with('/')
}

/// Derive the canonical name from a URL or path: the final segment, with
/// any `.git` suffix and package prefix stripped.
fn location_name(location: &str) -> Option<String> {
    let trimmed = location.trim_end_matches('/');
    let segment = trimmed.rsplit(['/', '\\']).next()?;
    let segment = segment.strip_suffix(".git").unwrap_or(segment);
    let name = segment
        .strip_prefix(appstrap_manifest::package::PACKAGE_PREFIX)
        .unwrap_or(segment);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// An appstrap project directory and its install delegate.
pub struct Project {
    root: PathBuf,
    installer: Box<dyn Installer>,
}

impl Project {
    /// Open a project with the no-op installer.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_installer(root, Box::new(NullInstaller))
    }

    /// Open a project with a custom install delegate.
    pub fn with_installer(root: impl Into<PathBuf>, installer: Box<dyn Installer>) -> Self {
        Self {
            root: root.into(),
            installer,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn package_path(&self) -> PathBuf {
        self.root.join(PACKAGE_FILENAME)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILENAME)
    }

    fn load_config(&self) -> Result<ProjectConfig> {
        Ok(ProjectConfig::load(&self.config_path())?)
    }

    /// Load the package manifest, or bootstrap one in memory from the
    /// project config's identity. The bool reports whether the file
    /// existed; a bootstrapped manifest is only written once a save-path
    /// write-back has content for it.
    fn load_package(&self, config: &ProjectConfig) -> Result<(PackageManifest, bool)> {
        let path = self.package_path();
        if path.exists() {
            Ok((PackageManifest::load(&path)?, true))
        } else {
            tracing::debug!(path = %path.display(), "package manifest absent; treating as empty");
            Ok((PackageManifest::bootstrap(config), false))
        }
    }

    /// Add platforms. Installs always; touches the manifests only with
    /// `save`, creating the package manifest if it does not exist.
    pub fn add_platforms(&self, targets: &[&str], options: &AddOptions) -> Result<OperationReport> {
        let targets = parse_targets(targets)?;
        let config = self.load_config()?;
        let (package, package_existed) = self.load_package(&config)?;

        let mut report = OperationReport::default();
        for target in &targets {
            let spec = target
                .spec
                .clone()
                .or_else(|| package.platforms().get(&target.name).and_then(|e| e.spec.clone()))
                .or_else(|| config.engines().get(&target.name).and_then(|e| e.spec.clone()));
            self.installer
                .install_platform(&self.root, &target.name, spec.as_deref())?;
            report = report.with_action(format!("Installed platform {}", target.name));
        }

        if options.save {
            let mut pkg_snapshot = snapshot_of_package(&package);
            for target in &targets {
                if !pkg_snapshot.platforms.contains(&target.name) {
                    pkg_snapshot
                        .platforms
                        .upsert(PlatformEntry::new(target.name.clone()));
                }
            }
            let outcome = reconcile(
                &pkg_snapshot,
                &snapshot_of_config(&config),
                &reconcile_options(&targets),
                &DirInspector::new(&self.root),
            );
            report.diagnostics = outcome.diagnostics.clone();
            self.persist_outcome(package, package_existed, config, &outcome)?;
        }

        Ok(report)
    }

    /// Add plugins, with optional caller-supplied variables.
    pub fn add_plugins(&self, targets: &[&str], options: &AddOptions) -> Result<OperationReport> {
        let targets = parse_targets(targets)?;
        let config = self.load_config()?;
        let (package, package_existed) = self.load_package(&config)?;

        let mut report = OperationReport::default();
        for target in &targets {
            let spec = target
                .spec
                .clone()
                .or_else(|| package.plugins().get(&target.name).and_then(|e| e.spec.clone()))
                .or_else(|| config.plugins().get(&target.name).and_then(|e| e.spec.clone()));
            self.installer.install_plugin(
                &self.root,
                &target.name,
                spec.as_deref(),
                &options.variables,
            )?;
            report = report.with_action(format!("Installed plugin {}", target.name));
        }

        if options.save {
            let mut pkg_snapshot = snapshot_of_package(&package);
            for target in &targets {
                // Caller variables land on the package side, which wins
                // collisions during the merge.
                let mut entry = pkg_snapshot
                    .plugins
                    .get(&target.name)
                    .cloned()
                    .unwrap_or_else(|| PluginEntry::new(target.name.clone()));
                entry.variables.extend(options.variables.clone());
                pkg_snapshot.plugins.upsert(entry);
            }
            let outcome = reconcile(
                &pkg_snapshot,
                &snapshot_of_config(&config),
                &reconcile_options(&targets),
                &DirInspector::new(&self.root),
            );
            report.diagnostics = outcome.diagnostics.clone();
            self.persist_outcome(package, package_existed, config, &outcome)?;
        }

        Ok(report)
    }

    /// Remove platforms. Uninstalls always; only `save` edits the manifests.
    pub fn remove_platforms(
        &self,
        names: &[&str],
        options: &RemoveOptions,
    ) -> Result<OperationReport> {
        let mut report = OperationReport::default();
        for name in names {
            self.installer.uninstall_platform(&self.root, name)?;
            report = report.with_action(format!("Removed platform {name}"));
        }

        if options.save {
            let config = self.load_config()?;
            let (package, package_existed) = self.load_package(&config)?;
            let (mut package, mut config) = (package, config);
            let original_package = package.clone();
            let original_config = config.clone();

            for name in names {
                package.remove_platform(name);
                config.remove_engine(name);
            }

            self.save_changed(
                &package,
                &original_package,
                package_existed,
                false,
                &config,
                &original_config,
            )?;
        }

        Ok(report)
    }

    /// Remove plugins. Uninstalls always; only `save` edits the manifests.
    pub fn remove_plugins(
        &self,
        names: &[&str],
        options: &RemoveOptions,
    ) -> Result<OperationReport> {
        let mut report = OperationReport::default();
        for name in names {
            self.installer.uninstall_plugin(&self.root, name)?;
            report = report.with_action(format!("Removed plugin {name}"));
        }

        if options.save {
            let config = self.load_config()?;
            let (package, package_existed) = self.load_package(&config)?;
            let (mut package, mut config) = (package, config);
            let original_package = package.clone();
            let original_config = config.clone();

            for name in names {
                package.remove_plugin(name);
                config.remove_plugin(name);
            }

            self.save_changed(
                &package,
                &original_package,
                package_existed,
                false,
                &config,
                &original_config,
            )?;
        }

        Ok(report)
    }

    /// Reconcile both manifests, persist what changed, and install every
    /// merged entry that is missing on disk or no longer satisfies its
    /// merged spec.
    pub fn restore(&self) -> Result<OperationReport> {
        let config = self.load_config()?;
        let (package, package_existed) = self.load_package(&config)?;

        let inspector = DirInspector::new(&self.root);
        let outcome = reconcile(
            &snapshot_of_package(&package),
            &snapshot_of_config(&config),
            &ReconcileOptions::default(),
            &inspector,
        );

        let mut report = OperationReport {
            actions: Vec::new(),
            diagnostics: outcome.diagnostics.clone(),
        };

        let (package_saved, config_saved) =
            self.persist_outcome(package, package_existed, config, &outcome)?;
        if package_saved {
            report = report.with_action("Updated package manifest".to_string());
        }
        if config_saved {
            report = report.with_action("Updated project config".to_string());
        }

        // Install whatever the merged declaration expects but disk lacks.
        let on_disk = installed_platforms(&self.root);
        for entry in outcome.package.platforms.list() {
            if needs_install(&entry.name, entry.spec.as_deref(), &on_disk, |n| {
                inspector.platform_version(n)
            }) {
                self.installer
                    .install_platform(&self.root, &entry.name, entry.spec.as_deref())?;
                report = report.with_action(format!("Restored platform {}", entry.name));
            }
        }
        let on_disk = installed_plugins(&self.root);
        for entry in outcome.package.plugins.list() {
            if needs_install(&entry.name, entry.spec.as_deref(), &on_disk, |n| {
                inspector.plugin_version(n)
            }) {
                self.installer.install_plugin(
                    &self.root,
                    &entry.name,
                    entry.spec.as_deref(),
                    &entry.variables,
                )?;
                report = report.with_action(format!("Restored plugin {}", entry.name));
            }
        }

        Ok(report)
    }

    /// Write the merged state back into both sources and save the files
    /// that actually changed. Both serialized forms are produced by the
    /// adapters before either file is replaced.
    fn persist_outcome(
        &self,
        mut package: PackageManifest,
        package_existed: bool,
        mut config: ProjectConfig,
        outcome: &ReconcileOutcome,
    ) -> Result<(bool, bool)> {
        let original_package = package.clone();
        let original_config = config.clone();

        for entry in outcome.package.platforms.list() {
            package.apply_platform(entry);
        }
        for entry in outcome.package.plugins.list() {
            package.apply_plugin(entry);
        }
        for entry in outcome.config.platforms.list() {
            config.add_engine(entry.clone());
        }
        for entry in outcome.config.plugins.list() {
            config.add_plugin(entry.clone());
        }

        self.save_changed(
            &package,
            &original_package,
            package_existed,
            true,
            &config,
            &original_config,
        )
    }

    fn save_changed(
        &self,
        package: &PackageManifest,
        original_package: &PackageManifest,
        package_existed: bool,
        create_if_missing: bool,
        config: &ProjectConfig,
        original_config: &ProjectConfig,
    ) -> Result<(bool, bool)> {
        // A bootstrapped manifest is written out by add/restore even when
        // the merge itself produced no entries, so the identity fields
        // derived from the project config land on disk. Remove never
        // conjures a manifest that was not there.
        let package_changed =
            package != original_package || (!package_existed && create_if_missing);
        let config_changed = config != original_config;

        // Render both forms before replacing either file, so a
        // serialization failure leaves both sources untouched.
        let package_json = package_changed.then(|| package.to_json()).transpose()?;
        let config_toml = config_changed.then(|| config.to_toml()).transpose()?;

        if let Some(content) = package_json {
            appstrap_manifest::write_atomic(&self.package_path(), &content)?;
        }
        if let Some(content) = config_toml {
            appstrap_manifest::write_atomic(&self.config_path(), &content)?;
        }
        Ok((package_changed, config_changed))
    }
}

fn parse_targets(raw: &[&str]) -> Result<Vec<Target>> {
    raw.iter().map(|t| Target::parse(t)).collect()
}

fn reconcile_options(targets: &[Target]) -> ReconcileOptions {
    ReconcileOptions {
        overrides: targets
            .iter()
            .filter_map(|t| t.spec.clone().map(|s| (t.name.clone(), s)))
            .collect(),
    }
}

fn snapshot_of_package(package: &PackageManifest) -> Snapshot {
    Snapshot {
        platforms: package.platforms(),
        plugins: package.plugins(),
    }
}

fn snapshot_of_config(config: &ProjectConfig) -> Snapshot {
    Snapshot {
        platforms: config.engines(),
        plugins: config.plugins(),
    }
}

/// True when the entry is absent on disk, or installed at a version the
/// merged range no longer accepts.
fn needs_install(
    name: &str,
    spec: Option<&str>,
    on_disk: &[String],
    version_of: impl Fn(&str) -> Option<semver::Version>,
) -> bool {
    if !on_disk.iter().any(|n| n == name) {
        return true;
    }
    let (Some(spec), Some(installed)) = (spec, version_of(name)) else {
        return false;
    };
    match Spec::parse(spec) {
        Ok(parsed) if parsed.is_range() => !parsed.satisfies(&installed),
        _ => false,
    }
}
