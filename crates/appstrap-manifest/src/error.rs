use std::path::PathBuf;

/// Errors that can occur reading or writing manifests.
///
/// Parse and I/O failures on a source are fatal to a reconciliation pass:
/// the caller must abort without touching either source.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to parse the package manifest JSON.
    #[error("unreadable package manifest at {}: {source}", .path.display())]
    PackageUnreadable {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to parse the project config TOML.
    #[error("unreadable project config at {}: {source}", .path.display())]
    ConfigUnreadable {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Project config file not found at the expected path.
    #[error("project config not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Failed to serialize a manifest.
    #[error("failed to serialize {what}: {reason}")]
    Serialize { what: &'static str, reason: String },

    /// I/O error reading or writing manifest files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
