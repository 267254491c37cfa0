//! Version-spec algebra for appstrap manifests.
//!
//! A manifest spec is either a semver **range** (`^1.1.2`, `~4.2.1`, an
//! exact version, or a comparator set) or a pinned **location** (a URL, git
//! reference, or filesystem path). Locations are opaque: they are never
//! range-compared against other specs.
//!
//! # Examples
//!
//! ```
//! use appstrap_spec::Spec;
//! use semver::Version;
//!
//! let spec = Spec::parse("~4.2.1").unwrap();
//! assert!(spec.is_range());
//! assert!(spec.satisfies(&Version::new(4, 2, 9)));
//! assert!(!spec.satisfies(&Version::new(4, 3, 0)));
//!
//! // Promote a patch-level range to a minor-level range.
//! assert_eq!(spec.widen().to_string(), "^4.2.1");
//!
//! let url = Spec::parse("https://github.com/example/appstrap-browser").unwrap();
//! assert!(url.is_location());
//! ```

pub mod error;
mod spec;

pub use error::{Error, Result};
pub use spec::{Spec, parse_version};
