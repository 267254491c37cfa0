//! The reconciliation engine.
//!
//! `reconcile` is a pure merge over two immutable manifest snapshots: the
//! package manifest's view and the project config's view of the project's
//! platforms and plugins. It returns the desired post-merge state of each
//! source plus a list of non-fatal diagnostics. Callers diff the desired
//! state against what they loaded and persist only what changed, which makes
//! repeated passes no-ops.
//!
//! Per entity name (union of both sources, package order first, config-only
//! entries appended), spec resolution applies in precedence order:
//!
//! 1. an explicit override supplied by the active operation;
//! 2. a URL/path spec from either source (never range-negotiated);
//! 3. the only non-empty spec;
//! 4. on textual range divergence, the package manifest's spec;
//! 5. with no spec anywhere, a range pinned to the installed artifact's
//!    version — caret-anchored toward the package manifest, tilde-anchored
//!    toward the config. The next pass widens the config side via rule 4.
//!
//! Plugin variable maps are unioned key-by-key; the package manifest wins
//! collisions.

use std::collections::BTreeMap;

use appstrap_manifest::{PlatformEntry, PlatformSet, PluginEntry, PluginSet};
use appstrap_spec::Spec;
use semver::Version;

use crate::diagnostics::Diagnostic;
use crate::inspector::InstalledInspector;

/// One source's view of the project: its platforms and plugins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub platforms: PlatformSet,
    pub plugins: PluginSet,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Inputs of the active operation beyond the two snapshots.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Explicit per-entity spec overrides (e.g. from `add ios@4.5.4`).
    /// Highest precedence; applied to both sources.
    pub overrides: BTreeMap<String, String>,
}

/// The desired post-merge state of both sources.
///
/// Entry sets and specs are identical across the two sides except for the
/// one-time cosmetic tilde/caret split produced by rule 5.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    pub package: Snapshot,
    pub config: Snapshot,
    pub diagnostics: Vec<Diagnostic>,
}

/// Merge two manifest snapshots.
///
/// Never fails: malformed specs degrade to per-entity diagnostics, leaving
/// the affected entity untouched in both sources.
pub fn reconcile(
    package: &Snapshot,
    config: &Snapshot,
    options: &ReconcileOptions,
    inspector: &dyn InstalledInspector,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    merge_platforms(package, config, options, inspector, &mut outcome);
    merge_plugins(package, config, options, inspector, &mut outcome);

    outcome
}

/// Resolved spec per side. The sides differ only when the engine itself
/// derived the spec (pinned-latest fallback or concrete-version override).
struct ResolvedSpecs {
    package: Option<String>,
    config: Option<String>,
}

impl ResolvedSpecs {
    fn both(spec: &str) -> Self {
        Self {
            package: Some(spec.to_string()),
            config: Some(spec.to_string()),
        }
    }

    fn none() -> Self {
        Self {
            package: None,
            config: None,
        }
    }

    /// Caret toward the package manifest, tilde toward the config.
    fn derived(version: &Version) -> Self {
        Self {
            package: Some(Spec::caret(version).to_string()),
            config: Some(Spec::tilde(version).to_string()),
        }
    }
}

/// Apply the spec precedence rules for one entity.
///
/// Returns `None` when a malformed spec aborts this entity's resolution;
/// the caller then carries both sources' entries through unchanged.
fn resolve_specs(
    name: &str,
    package_spec: Option<&str>,
    config_spec: Option<&str>,
    override_spec: Option<&str>,
    installed: Option<&Version>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ResolvedSpecs> {
    // Rule 1: an explicit override wins unconditionally.
    if let Some(raw) = override_spec {
        // A concrete version pins an engine-derived range pair.
        if let Ok(version) = Version::parse(raw) {
            return Some(ResolvedSpecs::derived(&version));
        }
        return match Spec::parse(raw) {
            Ok(spec) => Some(ResolvedSpecs::both(spec.as_str())),
            Err(e) => {
                diagnostics.push(Diagnostic::MalformedSpec {
                    name: name.to_string(),
                    spec: raw.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        };
    }

    let package = match parse_source_spec(name, package_spec, diagnostics) {
        Ok(spec) => spec,
        Err(()) => return None,
    };
    let config = match parse_source_spec(name, config_spec, diagnostics) {
        Ok(spec) => spec,
        Err(()) => return None,
    };

    match (package, config) {
        // Rule 5: neither source pins; derive from the installed artifact.
        (None, None) => match installed {
            Some(version) => {
                tracing::debug!(name, %version, "pinning spec from installed artifact");
                Some(ResolvedSpecs::derived(version))
            }
            None => Some(ResolvedSpecs::none()),
        },

        // Rule 3: the only non-empty spec wins.
        (Some(p), None) => Some(ResolvedSpecs::both(p.as_str())),
        (None, Some(c)) => Some(ResolvedSpecs::both(c.as_str())),

        (Some(p), Some(c)) => {
            if p.as_str() == c.as_str() {
                return Some(ResolvedSpecs::both(p.as_str()));
            }
            // Rule 2: a location is authoritative over a range.
            if p.is_location() && !c.is_location() {
                return Some(ResolvedSpecs::both(p.as_str()));
            }
            if c.is_location() && !p.is_location() {
                return Some(ResolvedSpecs::both(c.as_str()));
            }
            // Rule 4: package manifest wins. The cosmetic tilde-to-caret
            // widening of an engine-derived spec is silent; real
            // divergence is surfaced.
            if c.widen().as_str() != p.as_str() {
                tracing::warn!(
                    name,
                    package_spec = p.as_str(),
                    config_spec = c.as_str(),
                    "conflicting specs; package manifest wins"
                );
                diagnostics.push(Diagnostic::ConflictingSpecs {
                    name: name.to_string(),
                    package_spec: p.as_str().to_string(),
                    config_spec: c.as_str().to_string(),
                });
            }
            Some(ResolvedSpecs::both(p.as_str()))
        }
    }
}

fn parse_source_spec(
    name: &str,
    spec: Option<&str>,
    diagnostics: &mut Vec<Diagnostic>,
) -> std::result::Result<Option<Spec>, ()> {
    match spec {
        None => Ok(None),
        Some(raw) => match Spec::parse(raw) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                diagnostics.push(Diagnostic::MalformedSpec {
                    name: name.to_string(),
                    spec: raw.to_string(),
                    reason: e.to_string(),
                });
                Err(())
            }
        },
    }
}

/// Union of names, package order first, config-only appended.
fn union_names(package: &[&str], config: &[&str]) -> Vec<String> {
    let mut names: Vec<String> = package.iter().map(|n| n.to_string()).collect();
    for name in config {
        if !package.contains(name) {
            names.push(name.to_string());
        }
    }
    names
}

fn merge_platforms(
    package: &Snapshot,
    config: &Snapshot,
    options: &ReconcileOptions,
    inspector: &dyn InstalledInspector,
    outcome: &mut ReconcileOutcome,
) {
    let pkg_names: Vec<&str> = package.platforms.names().collect();
    let cfg_names: Vec<&str> = config.platforms.names().collect();

    for name in union_names(&pkg_names, &cfg_names) {
        let pkg_entry = package.platforms.get(&name);
        let cfg_entry = config.platforms.get(&name);
        let installed = inspector.platform_version(&name);

        match resolve_specs(
            &name,
            pkg_entry.and_then(|e| e.spec.as_deref()),
            cfg_entry.and_then(|e| e.spec.as_deref()),
            options.overrides.get(&name).map(String::as_str),
            installed.as_ref(),
            &mut outcome.diagnostics,
        ) {
            Some(resolved) => {
                outcome.package.platforms.upsert(PlatformEntry {
                    name: name.clone(),
                    spec: resolved.package,
                });
                outcome.config.platforms.upsert(PlatformEntry {
                    name,
                    spec: resolved.config,
                });
            }
            None => carry_unchanged(
                pkg_entry,
                cfg_entry,
                &mut outcome.package.platforms,
                &mut outcome.config.platforms,
            ),
        }
    }
}

fn merge_plugins(
    package: &Snapshot,
    config: &Snapshot,
    options: &ReconcileOptions,
    inspector: &dyn InstalledInspector,
    outcome: &mut ReconcileOutcome,
) {
    let pkg_names: Vec<&str> = package.plugins.names().collect();
    let cfg_names: Vec<&str> = config.plugins.names().collect();

    for name in union_names(&pkg_names, &cfg_names) {
        let pkg_entry = package.plugins.get(&name);
        let cfg_entry = config.plugins.get(&name);
        let installed = inspector.plugin_version(&name);

        match resolve_specs(
            &name,
            pkg_entry.and_then(|e| e.spec.as_deref()),
            cfg_entry.and_then(|e| e.spec.as_deref()),
            options.overrides.get(&name).map(String::as_str),
            installed.as_ref(),
            &mut outcome.diagnostics,
        ) {
            Some(resolved) => {
                let variables = merge_variables(pkg_entry, cfg_entry);
                outcome.package.plugins.upsert(PluginEntry {
                    name: name.clone(),
                    spec: resolved.package,
                    variables: variables.clone(),
                });
                outcome.config.plugins.upsert(PluginEntry {
                    name,
                    spec: resolved.config,
                    variables,
                });
            }
            None => carry_unchanged(
                pkg_entry,
                cfg_entry,
                &mut outcome.package.plugins,
                &mut outcome.config.plugins,
            ),
        }
    }
}

/// Union the variable maps; on key collision the package manifest wins.
fn merge_variables(
    package: Option<&PluginEntry>,
    config: Option<&PluginEntry>,
) -> BTreeMap<String, String> {
    let mut variables = config.map(|e| e.variables.clone()).unwrap_or_default();
    if let Some(entry) = package {
        variables.extend(entry.variables.clone());
    }
    variables
}

/// A malformed spec leaves the entity exactly as each source had it.
fn carry_unchanged<T: Clone + appstrap_manifest::Named>(
    pkg_entry: Option<&T>,
    cfg_entry: Option<&T>,
    out_pkg: &mut appstrap_manifest::EntrySet<T>,
    out_cfg: &mut appstrap_manifest::EntrySet<T>,
) {
    if let Some(entry) = pkg_entry {
        out_pkg.upsert(entry.clone());
    }
    if let Some(entry) = cfg_entry {
        out_cfg.upsert(entry.clone());
    }
}
