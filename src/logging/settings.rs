//! # Environment-style log configuration.
//!
//! Two variables, named after the configured prefix:
//!
//! | Variable            | Meaning                                              |
//! |---------------------|------------------------------------------------------|
//! | `<PREFIX>_LOG`      | minimum severity (`TRACE`..`ERROR`); unset = silent  |
//! | `<PREFIX>_LOG_PATH` | append diagnostics to this file instead of stdout    |
//!
//! Empty values are treated as unset.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::logging::Level;

/// Raw, unvalidated log settings.
///
/// Validation happens in [`LogSettings::level`], before any resource is acquired.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogSettings {
    /// Configured minimum severity, as written by the user.
    pub level: Option<String>,
    /// Optional log file.
    pub path: Option<PathBuf>,
}

impl LogSettings {
    /// Settings with only a minimum severity.
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            level: Some(level.into()),
            path: None,
        }
    }

    /// Reads `<prefix>_LOG` and `<prefix>_LOG_PATH` from the process environment.
    pub fn from_env(prefix: &str) -> Self {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_lookup(prefix: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: String| lookup(&key).filter(|v| !v.trim().is_empty());
        Self {
            level: non_empty(format!("{prefix}_LOG")),
            path: non_empty(format!("{prefix}_LOG_PATH")).map(PathBuf::from),
        }
    }

    /// Validates the configured severity.
    ///
    /// `Ok(None)` means nothing is configured and every diagnostic is discarded.
    pub fn level(&self) -> Result<Option<Level>, ConfigError> {
        self.level.as_deref().map(str::parse).transpose()
    }
}
