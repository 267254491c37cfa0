use semver::{Version, VersionReq};

use crate::error::{Error, Result};

/// A parsed manifest spec: a semver range or a pinned location.
///
/// Ranges keep their original text so serialization round-trips exactly
/// (the `semver` crate would otherwise normalize `1.2.3` to `^1.2.3`).
#[derive(Debug, Clone)]
pub enum Spec {
    /// A semver range such as `^1.1.2`, `~4.2.1`, or `>=1.0.0, <2.0.0`.
    Range { req: VersionReq, raw: String },
    /// An opaque URL, git reference, or filesystem path.
    Location(String),
}

impl Spec {
    /// Parse a spec string.
    ///
    /// Tries semver range syntax first; anything that fails but looks like a
    /// URL or path becomes a [`Spec::Location`]. Everything else is a
    /// configuration error.
    pub fn parse(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(Error::Malformed {
                spec: spec.to_string(),
                reason: "empty spec".to_string(),
            });
        }

        match VersionReq::parse(trimmed) {
            Ok(req) => Ok(Self::Range {
                req,
                raw: trimmed.to_string(),
            }),
            Err(parse_err) => {
                if looks_like_location(trimmed) {
                    Ok(Self::Location(trimmed.to_string()))
                } else {
                    Err(Error::Malformed {
                        spec: spec.to_string(),
                        reason: parse_err.to_string(),
                    })
                }
            }
        }
    }

    /// True if this spec is a semver range.
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range { .. })
    }

    /// True if this spec is a pinned URL or path.
    pub fn is_location(&self) -> bool {
        matches!(self, Self::Location(_))
    }

    /// Check whether a concrete version falls within this spec.
    ///
    /// Locations never satisfy: they carry no version information.
    pub fn satisfies(&self, version: &Version) -> bool {
        match self {
            Self::Range { req, .. } => req.matches(version),
            Self::Location(_) => false,
        }
    }

    /// Promote a tilde-anchored range (`~X.Y.Z`) to its caret-anchored
    /// equivalent (`^X.Y.Z`). Any other spec is returned unchanged.
    pub fn widen(&self) -> Self {
        match self {
            Self::Range { raw, .. } if raw.starts_with('~') => {
                let widened = format!("^{}", &raw[1..]);
                match VersionReq::parse(&widened) {
                    Ok(req) => Self::Range { req, raw: widened },
                    Err(_) => self.clone(),
                }
            }
            other => other.clone(),
        }
    }

    /// Build a tilde-anchored range pinned to a concrete version.
    pub fn tilde(version: &Version) -> Self {
        let raw = format!("~{version}");
        Self::Range {
            // A tilde range over a valid version always parses.
            req: VersionReq::parse(&raw).unwrap_or(VersionReq::STAR),
            raw,
        }
    }

    /// Build a caret-anchored range pinned to a concrete version.
    pub fn caret(version: &Version) -> Self {
        let raw = format!("^{version}");
        Self::Range {
            req: VersionReq::parse(&raw).unwrap_or(VersionReq::STAR),
            raw,
        }
    }

    /// The original spec text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Range { raw, .. } => raw,
            Self::Location(loc) => loc,
        }
    }
}

impl std::fmt::Display for Spec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heuristic for URL/path specs: git references, URL schemes, and anything
/// with a path separator.
fn looks_like_location(s: &str) -> bool {
    s.contains("://")
        || s.starts_with("git+")
        || s.starts_with("file:")
        || s.starts_with("./")
        || s.starts_with("../")
        || s.starts_with('/')
        || s.contains('\\')
        || s.contains('/')
}

/// Parse a concrete version string, surfacing the offending text on failure.
pub fn parse_version(version: &str) -> Result<Version> {
    Version::parse(version.trim()).map_err(|e| Error::InvalidVersion {
        version: version.to_string(),
        source: e,
    })
}
