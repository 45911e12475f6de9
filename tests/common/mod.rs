#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, LazyLock};

use cmdvisor::{
    Capture, CommandRegistry, LogSettings, ManualSignals, Runner, RunnerConfig, Signal,
    SignalPolicy, Sink,
};
use tokio::sync::Mutex;

/// Serialises tests in one binary that touch fd 2.
pub static FD2: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Writes `bytes` straight to the process error stream, bypassing libtest capture.
pub fn raw_stderr(bytes: &[u8]) {
    let mut err = std::io::stderr();
    err.write_all(bytes).unwrap();
    err.flush().unwrap();
}

#[cfg(unix)]
pub fn stderr_identity() -> (u64, u64) {
    let st = nix::sys::stat::fstat(2).unwrap();
    (st.st_dev as u64, st.st_ino as u64)
}

pub struct Harness {
    pub runner: Runner,
    pub signals: Arc<ManualSignals>,
    pub log: Capture,
    pub out: Capture,
    pub err: Capture,
}

fn default_config() -> RunnerConfig {
    let mut cfg = RunnerConfig::new("it");
    cfg.color = false;
    cfg.plugin_dir = None;
    cfg.signals =
        SignalPolicy::new([Signal::Hangup], [Signal::Terminate, Signal::Interrupt]).unwrap();
    cfg
}

impl Harness {
    /// Runner forwarding `Terminate` and `Interrupt`, ignoring `Hangup`.
    /// Passing diagnostics go to `log`.
    pub fn new(registry: CommandRegistry, level: Option<&str>) -> Self {
        Self::with_config(default_config(), registry, level)
    }

    /// Like [`Harness::new`], but without a log sink override: passing diagnostics
    /// land in `out`.
    pub fn to_stdout(registry: CommandRegistry, level: Option<&str>) -> Self {
        Self::build(default_config(), registry, level, false)
    }

    pub fn with_config(cfg: RunnerConfig, registry: CommandRegistry, level: Option<&str>) -> Self {
        Self::build(cfg, registry, level, true)
    }

    fn build(
        cfg: RunnerConfig,
        registry: CommandRegistry,
        level: Option<&str>,
        override_log: bool,
    ) -> Self {
        let signals = Arc::new(ManualSignals::new());
        let log = Capture::new();
        let settings = level.map(LogSettings::with_level).unwrap_or_default();
        let mut builder = Runner::builder(cfg, registry)
            .with_signal_source(signals.clone())
            .with_log_settings(settings);
        if override_log {
            builder = builder.with_log_sink(log.sink());
        }
        let runner = builder.build();
        Self {
            runner,
            signals,
            log,
            out: Capture::new(),
            err: Capture::new(),
        }
    }

    pub async fn invoke(&self, name: &str, args: &[&str]) -> i32 {
        let args = args.iter().map(|a| a.to_string()).collect();
        self.runner
            .invoke(name, None, args, self.out.sink(), self.err.sink())
            .await
    }
}
