use std::sync::Arc;

use crate::logging::{LogSettings, Sink};
use crate::runtime::{CommandRegistry, OsSignals, Runner, RunnerConfig, SignalSource};

/// Builder for constructing a [`Runner`] with optional overrides.
pub struct RunnerBuilder {
    cfg: RunnerConfig,
    registry: CommandRegistry,
    signals: Option<Arc<dyn SignalSource>>,
    log_settings: Option<LogSettings>,
    log_sink: Option<Sink>,
}

impl RunnerBuilder {
    /// Creates a new builder with the given configuration and command table.
    pub fn new(cfg: RunnerConfig, registry: CommandRegistry) -> Self {
        Self {
            cfg,
            registry,
            signals: None,
            log_settings: None,
            log_sink: None,
        }
    }

    /// Replaces the process signal source.
    ///
    /// Embedding programs and tests use [`ManualSignals`](crate::ManualSignals) to
    /// synthesize shutdown requests.
    pub fn with_signal_source(mut self, source: Arc<dyn SignalSource>) -> Self {
        self.signals = Some(source);
        self
    }

    /// Uses fixed log settings instead of reading the environment per invocation.
    pub fn with_log_settings(mut self, settings: LogSettings) -> Self {
        self.log_settings = Some(settings);
        self
    }

    /// Sends passing diagnostics to `sink` instead of the log file or the invocation stdout.
    pub fn with_log_sink(mut self, sink: Sink) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Builds the runner.
    pub fn build(self) -> Runner {
        Runner {
            cfg: self.cfg,
            registry: self.registry,
            signals: self.signals.unwrap_or_else(|| Arc::new(OsSignals)),
            log_settings: self.log_settings,
            log_sink: self.log_sink,
        }
    }
}
