//! # Severity filter for raw diagnostic lines.
//!
//! [`LevelFilter`] decides whether a line reaches the diagnostic sink:
//!
//! ```text
//! min = None         → every line is dropped (silent by default)
//! min = Some(level)  → tagged lines pass if tag >= level
//!                      untagged lines always pass
//! ```
//!
//! A line's tag is the first bracketed level name in it (see [`Level::from_line`]).
//!
//! ## Sink selection
//! [`LevelFilter::from_settings`] picks the sink, in order:
//! 1. the explicit override, if any;
//! 2. the file in `<PREFIX>_LOG_PATH` (append, created if missing);
//! 3. the invocation's standard output sink.
//!
//! With no level configured the sink is always [`Sink::discard`].

use std::fs::OpenOptions;
use std::io;

use crate::error::ConfigError;
use crate::logging::{Level, LogSettings, Logger, Sink};

/// Minimum-severity filter bound to an output sink.
///
/// Immutable once built; cheap to clone (clones share the sink).
#[derive(Clone, Debug)]
pub struct LevelFilter {
    min: Option<Level>,
    sink: Sink,
}

impl LevelFilter {
    /// Creates a filter writing passing lines to `sink`.
    pub fn new(min: Option<Level>, sink: Sink) -> Self {
        Self { min, sink }
    }

    /// A filter that drops everything.
    pub fn discard() -> Self {
        Self::new(None, Sink::discard())
    }

    /// Builds the filter for one invocation.
    ///
    /// `stdout` is the caller's normal output; passing lines land there unless an
    /// override or a log file is configured.
    ///
    /// Fails with [`ConfigError::InvalidLevel`] if the configured severity is not
    /// recognised, or [`ConfigError::LogSink`] if the log file cannot be opened.
    pub fn from_settings(
        settings: &LogSettings,
        sink_override: Option<&Sink>,
        stdout: &Sink,
    ) -> Result<Self, ConfigError> {
        let Some(min) = settings.level()? else {
            return Ok(Self::discard());
        };

        let sink = match (sink_override, &settings.path) {
            (Some(sink), _) => sink.clone(),
            (None, Some(path)) => OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map(Sink::new)
                .map_err(|source| ConfigError::LogSink {
                    target: path.display().to_string(),
                    source,
                })?,
            (None, None) => stdout.clone(),
        };
        Ok(Self::new(Some(min), sink))
    }

    /// Configured minimum severity.
    pub fn min_level(&self) -> Option<Level> {
        self.min
    }

    /// Output sink for passing lines.
    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Returns `true` if a line with the given tag should be emitted.
    ///
    /// `None` stands for an untagged line.
    pub fn allows(&self, severity: Option<Level>) -> bool {
        match (self.min, severity) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(min), Some(level)) => level >= min,
        }
    }

    /// Returns `true` if `line` passes the filter.
    ///
    /// # Example
    /// ```
    /// use cmdvisor::{Level, LevelFilter, Sink};
    ///
    /// let f = LevelFilter::new(Some(Level::Warn), Sink::discard());
    /// assert!(f.should_emit("[ERROR] disk full"));
    /// assert!(!f.should_emit("[DEBUG] retrying"));
    /// assert!(f.should_emit("warning: test"));
    ///
    /// assert!(!LevelFilter::discard().should_emit("[ERROR] disk full"));
    /// ```
    pub fn should_emit(&self, line: &str) -> bool {
        self.allows(Level::from_line(line))
    }

    /// Writes `line` to the sink if it passes; returns whether it was written.
    ///
    /// A trailing `\n` or `\r\n` is stripped; the sink always receives exactly one `\n`.
    pub fn emit(&self, line: &str) -> io::Result<bool> {
        let line = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(line);
        if !self.should_emit(line) {
            return Ok(false);
        }
        self.sink.write_line(line)?;
        Ok(true)
    }

    /// Structured logger sharing this filter's minimum and sink.
    pub fn logger(&self) -> Logger {
        match self.min {
            Some(min) => Logger::new(min, self.sink.clone()),
            None => Logger::disabled(),
        }
    }
}
