//! # Version string.
//!
//! Format: `<product> v<version>[-<prerelease>]`.

use std::fmt;

/// Product version, optionally with a prerelease tag.
///
/// # Example
/// ```
/// use cmdvisor::VersionInfo;
///
/// let v = VersionInfo::new("tool", "1.4.0", Some("beta2"));
/// assert_eq!(v.to_string(), "tool v1.4.0-beta2");
///
/// let v = VersionInfo::new("tool", "1.4.0", None::<String>);
/// assert_eq!(v.to_string(), "tool v1.4.0");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionInfo {
    /// Product name.
    pub product: String,
    /// Semantic version without prerelease.
    pub version: String,
    /// Prerelease tag; `None` or empty for a final release.
    pub prerelease: Option<String>,
}

impl VersionInfo {
    /// Creates a version description.
    pub fn new(
        product: impl Into<String>,
        version: impl Into<String>,
        prerelease: Option<impl Into<String>>,
    ) -> Self {
        Self {
            product: product.into(),
            version: version.into(),
            prerelease: prerelease.map(Into::into),
        }
    }

    /// Version of this crate, split at the first `-` into version and prerelease.
    pub fn current(product: impl Into<String>) -> Self {
        Self::parse(product, env!("CARGO_PKG_VERSION"))
    }

    /// Splits `full` (e.g. `1.2.0-rc1`) into version and prerelease.
    pub fn parse(product: impl Into<String>, full: &str) -> Self {
        let (version, prerelease) = match full.split_once('-') {
            Some((v, pre)) => (v, Some(pre)),
            None => (full, None),
        };
        Self::new(product, version, prerelease)
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.product, self.version)?;
        match self.prerelease.as_deref() {
            Some(pre) if !pre.is_empty() => write!(f, "-{pre}"),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_prerelease() {
        let v = VersionInfo::parse("tool", "0.12.0-alpha.1");
        assert_eq!(v.version, "0.12.0");
        assert_eq!(v.prerelease.as_deref(), Some("alpha.1"));
        assert_eq!(v.to_string(), "tool v0.12.0-alpha.1");
    }

    #[test]
    fn test_empty_prerelease_is_omitted() {
        let v = VersionInfo::new("tool", "2.0.0", Some(""));
        assert_eq!(v.to_string(), "tool v2.0.0");
    }

    #[test]
    fn test_current_uses_crate_version() {
        let v = VersionInfo::current("cmdvisor");
        assert!(v.to_string().starts_with(&format!("cmdvisor v{}", v.version)));
        assert!(env!("CARGO_PKG_VERSION").starts_with(&v.version));
    }
}
