//! # Runner: dispatches one operation with scoped process-wide resources.
//!
//! [`Runner::invoke`] is the single entry point. Per call it:
//!
//! - **Configures** the [`LevelFilter`] from [`LogSettings`] (invalid level aborts here)
//! - **Intercepts** fd 2 into the filter ([`StderrInterceptor`])
//! - **Resolves** the operation name in the [`CommandRegistry`]
//! - **Bridges** OS signals into [`ShutdownEvents`] ([`ShutdownBridge`])
//! - **Runs** the handler and passes its exit code through unchanged
//!
//! ## Flow
//! ```text
//! invoke(name, working_dir, args, stdout, stderr)
//!   ├─► LevelFilter::from_settings ──── Err ─► "invalid log level", EXIT_CONFIG
//!   ├─► StderrInterceptor::start ────── Err ─► EXIT_CONFIG (fd 2 untouched)
//!   ├─► registry.resolve(name) ──────── Err ─► "unknown command", EXIT_DISPATCH
//!   │                                          (interceptor released, no bridge, no context)
//!   ├─► ShutdownBridge::start ───────── Err ─► EXIT_CONFIG (interceptor released)
//!   ├─► factory(ExecutionContext) ─► handler.run(args) ─► code
//!   ├─► bridge.cancel()            (innermost first)
//!   ├─► interceptor.stop()         (fd 2 restored, scanner drained or detached)
//!   └─► code
//! ```
//!
//! ## Rules
//! - Release happens on every exit path: the guards also release on drop, which covers
//!   early returns and handler panics.
//! - The whole invocation runs under the per-invocation [`Logger`]; nothing is installed
//!   globally.
//! - Concurrent invocations are serialised by the interceptor lease.
//! - Passing diagnostics go to the invocation's `stdout` sink unless a log sink override
//!   or `<PREFIX>_LOG_PATH` is configured.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::RunnerError;
use crate::logging::{LevelFilter, LogSettings, Logger, Sink};
use crate::plugins::discover_plugin_dirs;
use crate::runtime::{
    CommandRegistry, ExecutionContext, RunnerBuilder, RunnerConfig, ShutdownBridge, SignalSource,
    StderrInterceptor,
};
use crate::ui::Ui;

/// Dispatches named operations to registered handlers.
///
/// # Signal dispositions across invocations
/// With [`OsSignals`](crate::OsSignals), the first invocation that registers a signal
/// replaces its default action for the rest of the process: tokio cannot restore it.
/// Between invocations (and after the last one) such signals are received and
/// discarded, so e.g. Ctrl-C no longer terminates the process. Programs that run
/// several invocations and need the default action back should handle those signals
/// themselves or keep them out of [`RunnerConfig::signals`].
pub struct Runner {
    pub(crate) cfg: RunnerConfig,
    pub(crate) registry: CommandRegistry,
    pub(crate) signals: Arc<dyn SignalSource>,
    pub(crate) log_settings: Option<LogSettings>,
    pub(crate) log_sink: Option<Sink>,
}

impl Runner {
    /// Runner over `registry` listening to process signals, with log settings read from
    /// the environment at each invocation.
    pub fn new(cfg: RunnerConfig, registry: CommandRegistry) -> Self {
        Self::builder(cfg, registry).build()
    }

    /// Starts a builder for customising signal source and log settings.
    pub fn builder(cfg: RunnerConfig, registry: CommandRegistry) -> RunnerBuilder {
        RunnerBuilder::new(cfg, registry)
    }

    /// Runner configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.cfg
    }

    /// Registered operations.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Runs operation `name` and returns its exit code.
    ///
    /// `stdout` and `stderr` become the handler's [`Ui`]. Errors that prevent the handler
    /// from running are reported on `stderr` and mapped by [`RunnerError::exit_code`].
    pub async fn invoke(
        &self,
        name: &str,
        working_dir: Option<PathBuf>,
        args: Vec<String>,
        stdout: Sink,
        stderr: Sink,
    ) -> i32 {
        let ui = Ui::new(stdout, stderr, self.cfg.color);
        match self.try_invoke(name, working_dir, args, &ui).await {
            Ok(code) => code,
            Err(err) => {
                self.report(&err, &ui);
                err.exit_code()
            }
        }
    }

    async fn try_invoke(
        &self,
        name: &str,
        working_dir: Option<PathBuf>,
        args: Vec<String>,
        ui: &Ui,
    ) -> Result<i32, RunnerError> {
        let settings = self
            .log_settings
            .clone()
            .unwrap_or_else(|| self.cfg.log_settings());
        let filter = LevelFilter::from_settings(&settings, self.log_sink.as_ref(), ui.out())?;
        let logger = filter.logger();

        logger
            .attach(async {
                let res = self
                    .dispatch(name, working_dir, args, ui, filter, &logger)
                    .await;
                if let Err(err) = &res {
                    warn!(
                        operation = name,
                        reason = err.as_label(),
                        error = %err,
                        "invocation aborted"
                    );
                }
                res
            })
            .await
    }

    async fn dispatch(
        &self,
        name: &str,
        working_dir: Option<PathBuf>,
        args: Vec<String>,
        ui: &Ui,
        filter: LevelFilter,
        logger: &Logger,
    ) -> Result<i32, RunnerError> {
        let interceptor = StderrInterceptor::start(filter).await?;
        let factory = self.registry.resolve(name)?;

        let bridge = ShutdownBridge::start(
            self.signals.as_ref(),
            &self.cfg.signals,
            self.cfg.shutdown_capacity_clamped(),
        )?;

        let plugin_dirs = match &self.cfg.plugin_dir {
            Some(dir) => discover_plugin_dirs(dir, ui),
            None => Vec::new(),
        };
        let ctx = ExecutionContext::new(
            ui.clone(),
            plugin_dirs,
            working_dir,
            bridge.events(),
            logger.clone(),
        );

        debug!(operation = name, args = args.len(), "dispatching operation");
        let handler = factory(ctx);
        let code = handler.run(args).await;
        drop(handler);
        debug!(operation = name, code, "operation finished");

        bridge.cancel().await;
        interceptor.stop();
        Ok(code)
    }

    fn report(&self, err: &RunnerError, ui: &Ui) {
        ui.error(&err.to_string());
        if let RunnerError::Dispatch(_) = err {
            let names = self.registry.names();
            if !names.is_empty() {
                ui.error(&format!("available commands: {}", names.join(", ")));
            }
        }
    }
}
