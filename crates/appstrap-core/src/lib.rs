//! Core reconciliation engine and project operations for appstrap.
//!
//! An appstrap project declares its platforms and plugins twice: in the
//! JSON package manifest and in the TOML project config. The two drift —
//! hand edits, tooling that only knows one file, projects restored from
//! version control with artifacts stripped. This crate merges the two
//! views into a single desired state and drives installs from it.
//!
//! - [`reconciler`] — the pure merge: two snapshots in, desired per-source
//!   state plus diagnostics out. No I/O.
//! - [`project`] — the operation layer: add/remove with a `save` flag,
//!   and `restore`, which reconciles and reinstalls whatever is missing.
//! - [`inspector`] — read-only discovery of what is installed on disk.
//! - [`install`] — the install delegate seam.
//!
//! ```no_run
//! use appstrap_core::project::{AddOptions, Project};
//!
//! # fn main() -> appstrap_core::Result<()> {
//! let project = Project::new("/path/to/app");
//! project.add_platforms(&["android@7.0.0"], &AddOptions { save: true, ..Default::default() })?;
//! let report = project.restore()?;
//! for diagnostic in &report.diagnostics {
//!     eprintln!("warning: {diagnostic}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod diagnostics;
pub mod error;
pub mod inspector;
pub mod install;
pub mod project;
pub mod reconciler;

pub use diagnostics::Diagnostic;
pub use error::{Error, Result};
pub use inspector::{DirInspector, InstalledInspector, NullInspector};
pub use install::{Installer, NullInstaller};
pub use project::{AddOptions, OperationReport, Project, RemoveOptions, Target};
pub use reconciler::{ReconcileOptions, ReconcileOutcome, Snapshot, reconcile};
