//! Error types for appstrap-core.

/// Result type for appstrap-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during reconciliation and project operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An add/remove target could not be interpreted.
    #[error("invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Install/uninstall delegation failed.
    #[error("installer failed for '{name}': {reason}")]
    Installer { name: String, reason: String },

    /// Manifest error from appstrap-manifest.
    #[error(transparent)]
    Manifest(#[from] appstrap_manifest::Error),

    /// Spec error from appstrap-spec.
    #[error(transparent)]
    Spec(#[from] appstrap_spec::Error),

    /// Standard I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
