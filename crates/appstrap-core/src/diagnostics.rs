//! Non-fatal issues surfaced by a reconciliation pass.
//!
//! The reconciler never fails the overall operation for a resolvable
//! conflict. Instead it returns these values to the caller, which can log
//! them, print them, or translate them to whatever notification channel the
//! surrounding tool uses.

/// A non-fatal issue found while reconciling the two manifest sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A spec string was neither a valid range nor a URL/path. The entity
    /// it belongs to was left untouched in both sources.
    MalformedSpec {
        name: String,
        spec: String,
        reason: String,
    },
    /// Both sources pinned diverging specs; the package manifest's value
    /// was applied to both.
    ConflictingSpecs {
        name: String,
        package_spec: String,
        config_spec: String,
    },
}

impl Diagnostic {
    /// The entity the diagnostic refers to.
    pub fn entity(&self) -> &str {
        match self {
            Self::MalformedSpec { name, .. } | Self::ConflictingSpecs { name, .. } => name,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedSpec { name, spec, reason } => {
                write!(f, "malformed spec '{spec}' for '{name}': {reason}")
            }
            Self::ConflictingSpecs {
                name,
                package_spec,
                config_spec,
            } => write!(
                f,
                "conflicting specs for '{name}': package manifest has '{package_spec}', \
                 project config has '{config_spec}'; using the package manifest's"
            ),
        }
    }
}
