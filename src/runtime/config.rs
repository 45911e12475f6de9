//! # Runner configuration.
//!
//! Provides [`RunnerConfig`] centralized settings for a [`Runner`](crate::Runner).
//!
//! ## Sentinel values
//! - `shutdown_capacity = 0` → clamped to 1 by [`RunnerConfig::shutdown_capacity_clamped`]
//! - `plugin_dir = None` → plugin discovery is skipped (empty directory list)

use crate::logging::LogSettings;
use crate::policies::SignalPolicy;

/// Default number of shutdown events buffered before further signals are coalesced.
pub const DEFAULT_SHUTDOWN_CAPACITY: usize = 4;

/// Configuration for the runner.
///
/// ## Field semantics
/// - `product`: name used in the version string and to derive defaults
/// - `env_prefix`: prefix of the log variables (`<PREFIX>_LOG`, `<PREFIX>_LOG_PATH`)
/// - `color`: whether handlers get a color-enabled [`Ui`](crate::Ui)
/// - `shutdown_capacity`: shutdown event buffer (min 1)
/// - `signals`: which OS signals are ignored / forwarded
/// - `plugin_dir`: name of the per-user config directory holding `plugins/`
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Product name.
    pub product: String,

    /// Prefix of the environment variables read by [`RunnerConfig::log_settings`].
    pub env_prefix: String,

    /// Color flag forwarded to handlers.
    pub color: bool,

    /// Capacity of the shutdown event channel.
    ///
    /// Signals arriving while the buffer is full are coalesced into the pending ones.
    pub shutdown_capacity: usize,

    /// Ignore / forward signal sets. Empty by default.
    pub signals: SignalPolicy,

    /// Directory name under the user's config root (`$HOME` / `%APPDATA%`).
    pub plugin_dir: Option<String>,
}

impl RunnerConfig {
    /// Configuration with defaults derived from `product`.
    ///
    /// # Example
    /// ```
    /// use cmdvisor::RunnerConfig;
    ///
    /// let cfg = RunnerConfig::new("my-tool");
    /// assert_eq!(cfg.env_prefix, "MY_TOOL");
    /// assert_eq!(cfg.shutdown_capacity, 4);
    /// assert!(cfg.signals.is_empty());
    /// ```
    pub fn new(product: impl Into<String>) -> Self {
        let product = product.into();
        Self {
            env_prefix: env_prefix(&product),
            plugin_dir: Some(default_plugin_dir(&product)),
            product,
            color: true,
            shutdown_capacity: DEFAULT_SHUTDOWN_CAPACITY,
            signals: SignalPolicy::default(),
        }
    }

    /// Same as [`new`](Self::new), with color disabled when `NO_COLOR` is set.
    pub fn from_env(product: impl Into<String>) -> Self {
        let mut cfg = Self::new(product);
        cfg.color = std::env::var_os("NO_COLOR").is_none_or(|v| v.is_empty());
        cfg
    }

    /// Returns the shutdown capacity clamped to a minimum of 1.
    #[inline]
    pub fn shutdown_capacity_clamped(&self) -> usize {
        self.shutdown_capacity.max(1)
    }

    /// Reads the log variables for this configuration's prefix.
    pub fn log_settings(&self) -> LogSettings {
        LogSettings::from_env(&self.env_prefix)
    }
}

impl Default for RunnerConfig {
    /// Defaults for product `cmdvisor`.
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}

fn env_prefix(product: &str) -> String {
    product
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(windows)]
fn default_plugin_dir(product: &str) -> String {
    format!("{product}.d")
}

#[cfg(not(windows))]
fn default_plugin_dir(product: &str) -> String {
    format!(".{product}.d")
}
