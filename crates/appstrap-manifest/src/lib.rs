//! Manifest models and persistence adapters for appstrap.
//!
//! An appstrap project carries two declarative sources of truth:
//!
//! - the **package manifest** (`package.json`, JSON) — dependency specs plus
//!   an `appstrap` section listing platforms and plugins with variables;
//! - the **project config** (`appstrap.toml`, TOML) — engine (platform) and
//!   plugin declarations with variables, plus the app identity fields.
//!
//! Both adapters expose their contents as insertion-ordered [`PlatformSet`]
//! and [`PluginSet`] snapshots, which is the representation the reconciler
//! in `appstrap-core` merges.

pub mod config;
pub mod entry;
pub mod error;
pub mod package;
pub mod set;

/// Canonical filename of the package manifest.
pub const PACKAGE_FILENAME: &str = "package.json";

/// Canonical filename of the project config.
pub const CONFIG_FILENAME: &str = "appstrap.toml";

pub use config::ProjectConfig;
pub use entry::{PlatformEntry, PluginEntry};
pub use error::{Error, Result};
pub use package::{PackageManifest, package_name, write_atomic};
pub use set::{EntrySet, Named, PlatformSet, PluginSet};
