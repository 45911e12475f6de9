//! # Per-invocation execution context.
//!
//! [`ExecutionContext`] is the value bundle a handler factory receives. It is built by
//! the runner after the shutdown bridge has started and lives no longer than the
//! invocation.

use std::path::{Path, PathBuf};

use crate::logging::Logger;
use crate::runtime::ShutdownEvents;
use crate::ui::Ui;

/// Everything a handler may use from its invocation.
///
/// Clones share the same UI writers, shutdown stream and logger.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    color: bool,
    plugin_dirs: Vec<PathBuf>,
    ui: Ui,
    working_dir: Option<PathBuf>,
    shutdown: ShutdownEvents,
    logger: Logger,
}

impl ExecutionContext {
    pub(crate) fn new(
        ui: Ui,
        plugin_dirs: Vec<PathBuf>,
        working_dir: Option<PathBuf>,
        shutdown: ShutdownEvents,
        logger: Logger,
    ) -> Self {
        Self {
            color: ui.color(),
            plugin_dirs,
            ui,
            working_dir,
            shutdown,
            logger,
        }
    }

    /// Whether styled output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }

    /// Candidate plugin directories, in lookup order.
    pub fn plugin_dirs(&self) -> &[PathBuf] {
        &self.plugin_dirs
    }

    /// Output writers.
    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    /// Working-directory override requested by the caller, if any.
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Resolves `path` against the working-directory override.
    ///
    /// Absolute paths and invocations without an override return `path` unchanged.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.working_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Shutdown requests for this invocation.
    pub fn shutdown(&self) -> &ShutdownEvents {
        &self.shutdown
    }

    /// Structured logger for this invocation.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}
