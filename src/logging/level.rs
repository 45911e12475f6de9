//! # Diagnostic severities.
//!
//! [`Level`] is the fixed allow-list of severities, totally ordered:
//!
//! ```text
//! TRACE < DEBUG < INFO < WARN < ERROR
//! ```
//!
//! Raw diagnostic lines carry their severity as a bracketed tag, e.g.
//! `2024/01/02 [WARN] provider: slow response`. [`Level::from_line`] extracts it.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    /// All recognised levels, lowest first.
    pub const ALL: [Level; 5] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
    ];

    /// Returns the canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    /// Looks up a level name, ignoring case and surrounding whitespace.
    pub fn lookup(name: &str) -> Option<Level> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(name))
    }

    /// Extracts the severity tag of a raw diagnostic line.
    ///
    /// The first `[...]` pair is inspected; `None` if there is none or it
    /// does not name a level.
    ///
    /// # Example
    /// ```
    /// use cmdvisor::Level;
    ///
    /// assert_eq!(Level::from_line("2024/01/02 [WARN] slow"), Some(Level::Warn));
    /// assert_eq!(Level::from_line("[core] ready"), None);
    /// assert_eq!(Level::from_line("warning: test"), None);
    /// ```
    pub fn from_line(line: &str) -> Option<Level> {
        let start = line.find('[')?;
        let rest = &line[start + 1..];
        let end = rest.find(']')?;
        Self::lookup(&rest[..end])
    }

    pub(crate) fn as_tracing(self) -> tracing::Level {
        match self {
            Level::Trace => tracing::Level::TRACE,
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| ConfigError::InvalidLevel {
            value: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_totally_ordered() {
        for pair in Level::ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} should be below {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!(" Warn ".parse::<Level>().unwrap(), Level::Warn);
        assert!(matches!(
            "verbose".parse::<Level>(),
            Err(ConfigError::InvalidLevel { value }) if value == "verbose"
        ));
    }

    #[test]
    fn test_from_line_uses_first_bracket_pair() {
        assert_eq!(Level::from_line("[ERROR] boom [DEBUG]"), Some(Level::Error));
        assert_eq!(Level::from_line("plugin: [info] started"), Some(Level::Info));
        assert_eq!(Level::from_line("unterminated [WARN"), None);
        assert_eq!(Level::from_line("[] empty"), None);
    }
}
