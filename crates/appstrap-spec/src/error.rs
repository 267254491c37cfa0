/// Errors that can occur when parsing manifest specs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The spec is neither a valid semver range nor a recognizable location.
    #[error("malformed spec '{spec}': {reason}")]
    Malformed { spec: String, reason: String },

    /// Invalid concrete version string.
    #[error("invalid version '{version}': {source}")]
    InvalidVersion {
        version: String,
        source: semver::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
