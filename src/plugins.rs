//! # Plugin search directories.
//!
//! Given a base configuration directory, plugins are looked up in:
//!
//! ```text
//! {base}/plugins
//! {base}/plugins/{os}_{arch}
//! ```
//!
//! `os` and `arch` use the conventional plugin naming (`linux`, `darwin`, `windows`;
//! `amd64`, `arm64`, `386`, `arm`) rather than Rust's target names.
//!
//! Failing to locate the base directory is a warning, never fatal: it is reported on
//! the UI error writer and discovery yields no directories.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::PluginDirError;
use crate::ui::Ui;

/// Operating system component of the platform directory.
pub fn plugin_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Architecture component of the platform directory.
pub fn plugin_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64",
        "s390x" => "s390x",
        other => other,
    }
}

/// Ordered candidate plugin directories under `base`.
///
/// # Example
/// ```
/// use std::path::Path;
///
/// let dirs = cmdvisor::plugin_dirs(Path::new("/home/me/.tool.d"));
/// assert_eq!(dirs.len(), 2);
/// assert_eq!(dirs[0], Path::new("/home/me/.tool.d/plugins"));
/// assert!(dirs[1].starts_with(&dirs[0]));
/// ```
pub fn plugin_dirs(base: &Path) -> Vec<PathBuf> {
    let plugins = base.join("plugins");
    let platform = plugins.join(format!("{}_{}", plugin_os(), plugin_arch()));
    vec![plugins, platform]
}

#[cfg(windows)]
const CONFIG_ROOT_VAR: &str = "APPDATA";

#[cfg(not(windows))]
const CONFIG_ROOT_VAR: &str = "HOME";

/// Resolves `{config root}/{dir_name}`, where the root is `%APPDATA%` on Windows and
/// `$HOME` elsewhere.
pub fn config_dir(dir_name: &str) -> Result<PathBuf, PluginDirError> {
    config_dir_from(std::env::var_os(CONFIG_ROOT_VAR), dir_name)
}

fn config_dir_from(root: Option<OsString>, dir_name: &str) -> Result<PathBuf, PluginDirError> {
    let root = root
        .filter(|r| !r.is_empty())
        .map(PathBuf::from)
        .ok_or(PluginDirError::MissingEnv {
            var: CONFIG_ROOT_VAR,
        })?;
    if !root.is_absolute() {
        return Err(PluginDirError::NotAbsolute { path: root });
    }
    Ok(root.join(dir_name))
}

/// Plugin directories under the user's config directory.
///
/// Resolution failures are reported on `ui`'s error writer and produce an empty list.
pub fn discover_plugin_dirs(dir_name: &str, ui: &Ui) -> Vec<PathBuf> {
    resolve_or_warn(config_dir(dir_name), ui)
}

fn resolve_or_warn(base: Result<PathBuf, PluginDirError>, ui: &Ui) -> Vec<PathBuf> {
    match base {
        Ok(base) => plugin_dirs(&base),
        Err(err) => {
            tracing::warn!(reason = err.as_label(), "plugin directory lookup failed");
            ui.error(&format!("Error finding plugin directories: {err}"));
            Vec::new()
        }
    }
}
