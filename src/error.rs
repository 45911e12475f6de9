//! Error types used by the cmdvisor runner.
//!
//! This module defines the error enums surfaced by an invocation:
//!
//! - [`ConfigError`]: the invocation could not be set up (bad log level,
//!   unusable log sink, stderr interception or signal registration failure).
//! - [`DispatchError`]: the requested operation is not registered.
//! - [`RegistryError`]: the command table could not be built.
//! - [`PluginDirError`]: the base configuration directory could not be found.
//! - [`RunnerError`]: umbrella over the errors that abort an invocation.
//!
//! Every enum provides `as_label` (a stable snake_case label for log fields).
//! [`RunnerError::exit_code`] maps an aborted invocation to the process exit code.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::policies::Signal;

/// Exit code returned when the operation name is not registered.
pub const EXIT_DISPATCH: i32 = 1;

/// Exit code returned when the invocation could not be configured
/// (invalid log level, pipe creation failure, signal registration failure).
pub const EXIT_CONFIG: i32 = 2;

/// # Errors raised while preparing an invocation.
///
/// All of these are detected before the handler runs.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configured minimum severity is not in the allow-list.
    #[error("invalid log level {value:?}; valid levels are TRACE, DEBUG, INFO, WARN, ERROR")]
    InvalidLevel {
        /// The rejected value, as configured.
        value: String,
    },

    /// The diagnostic sink could not be opened.
    #[error("cannot open log sink {target}: {source}")]
    LogSink {
        /// Path or name of the sink.
        target: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Redirecting the process error stream failed.
    #[error("cannot intercept stderr ({stage}): {source}")]
    Intercept {
        /// Which step failed (`pipe`, `dup`, `dup2`, `spawn`).
        stage: &'static str,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Registering interest in an OS signal failed.
    #[error("cannot register handler for {signal}: {source}")]
    SignalRegistration {
        /// The signal that could not be registered.
        signal: Signal,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A signal was listed both as ignored and as forwarded.
    #[error("signal {signal} is both ignored and forwarded")]
    OverlappingSignals {
        /// The signal present in both sets.
        signal: Signal,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use cmdvisor::ConfigError;
    ///
    /// let err = ConfigError::InvalidLevel { value: "LOUD".into() };
    /// assert_eq!(err.as_label(), "config_invalid_level");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidLevel { .. } => "config_invalid_level",
            ConfigError::LogSink { .. } => "config_log_sink",
            ConfigError::Intercept { .. } => "config_intercept",
            ConfigError::SignalRegistration { .. } => "config_signal_registration",
            ConfigError::OverlappingSignals { .. } => "config_overlapping_signals",
        }
    }
}

/// # Errors raised while resolving an operation name.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No handler is registered under this name.
    #[error("unknown command {name:?}")]
    NotFound {
        /// The requested operation name.
        name: String,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::NotFound { .. } => "dispatch_not_found",
        }
    }
}

/// # Errors raised while building a [`CommandRegistry`](crate::CommandRegistry).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The same operation name was registered twice.
    #[error("command {name:?} is registered more than once")]
    Duplicate {
        /// The repeated name.
        name: String,
    },
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::Duplicate { .. } => "registry_duplicate",
        }
    }
}

/// # Errors raised while locating the base configuration directory.
///
/// These are warnings: plugin discovery continues with an empty list.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginDirError {
    /// The environment variable naming the user's directory is unset or empty.
    #[error("environment variable {var} is not set")]
    MissingEnv {
        /// Name of the variable that was consulted.
        var: &'static str,
    },

    /// The resolved path is not absolute and cannot anchor plugin lookup.
    #[error("config directory {path:?} is not absolute")]
    NotAbsolute {
        /// The rejected path.
        path: PathBuf,
    },
}

impl PluginDirError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            PluginDirError::MissingEnv { .. } => "plugin_dir_missing_env",
            PluginDirError::NotAbsolute { .. } => "plugin_dir_not_absolute",
        }
    }
}

/// # Errors that abort an invocation before or instead of the handler.
///
/// Handler exit codes are never wrapped here: they pass through unchanged.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The invocation could not be configured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The operation name did not resolve.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl RunnerError {
    /// Returns the exit code reported for this error.
    ///
    /// # Example
    /// ```
    /// use cmdvisor::{DispatchError, RunnerError, EXIT_DISPATCH};
    ///
    /// let err = RunnerError::from(DispatchError::NotFound { name: "plan".into() });
    /// assert_eq!(err.exit_code(), EXIT_DISPATCH);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            RunnerError::Config(_) => EXIT_CONFIG,
            RunnerError::Dispatch(_) => EXIT_DISPATCH,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunnerError::Config(e) => e.as_label(),
            RunnerError::Dispatch(e) => e.as_label(),
        }
    }
}
