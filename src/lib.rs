//! # cmdvisor
//!
//! **Cmdvisor** is a command execution runner for CLI programs.
//!
//! It dispatches a named operation to a registered handler and, for exactly the
//! duration of that call, owns two process-wide resources: the error stream (fd 2),
//! whose lines are leveled and routed to a diagnostic sink, and OS interrupt
//! delivery, which is turned into a stream of shutdown events the handler can
//! observe. Handler exit codes pass through unchanged.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!      caller: invoke(name, working_dir, args, stdout, stderr)
//!                                │
//!                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Runner (per-invocation orchestrator)                             │
//! │  - LevelFilter       (minimum severity + diagnostic sink)         │
//! │  - StderrInterceptor (fd 2 ─► pipe ─► scanner thread)             │
//! │  - CommandRegistry   (name ─► handler factory, read-only)         │
//! │  - ShutdownBridge    (SignalSource ─► bounded shutdown channel)   │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//!   ExecutionContext ──► factory(ctx) ──► handler.run(args) ──► exit code
//!   (Ui, plugin dirs,
//!    working dir,
//!    ShutdownEvents,
//!    Logger)
//! ```
//!
//! ### Lifecycle
//! ```text
//! invoke(name, ..)
//!   ├─► LevelFilter::from_settings    (invalid level ─► EXIT_CONFIG)
//!   ├─► StderrInterceptor::start      (fd 2 redirected)
//!   ├─► registry.resolve(name)        (unknown ─► EXIT_DISPATCH, nothing else started)
//!   ├─► ShutdownBridge::start         (signals registered)
//!   ├─► handler.run(args) ─► code
//!   ├─► bridge.cancel()               (no more events, stream closed)
//!   └─► interceptor.stop()            (fd 2 restored, scanner drained or detached)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                         |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Dispatch**      | Register operations by name and run them.                    | [`Runner`], [`CommandRegistry`], [`Handler`] |
//! | **Diagnostics**   | Level raw stderr lines and route them to a sink.             | [`LevelFilter`], [`Level`], [`LogSettings`] |
//! | **Shutdown**      | Turn OS signals into handler-visible shutdown events.        | [`ShutdownBridge`], [`SignalPolicy`]       |
//! | **Signals**       | Substitute the signal source (tests, embedding).             | [`SignalSource`], [`ManualSignals`]        |
//! | **Errors**        | Typed errors mapped to stable exit codes.                    | [`RunnerError`], [`ConfigError`]           |
//! | **Configuration** | Centralize runner settings.                                  | [`RunnerConfig`]                           |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use cmdvisor::{
//!     Capture, CommandRegistry, ExecutionContext, HandlerFn, LogSettings, ManualSignals,
//!     Runner, RunnerConfig, Sink,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = CommandRegistry::builder()
//!         .register("greet", |ctx: ExecutionContext| {
//!             HandlerFn::new(move |args: Vec<String>| {
//!                 let ui = ctx.ui().clone();
//!                 async move {
//!                     ui.output(&format!("hello {}", args.join(" ")));
//!                     0
//!                 }
//!             })
//!         })
//!         .build()?;
//!
//!     let mut cfg = RunnerConfig::new("demo");
//!     cfg.plugin_dir = None;
//!     let runner = Runner::builder(cfg, registry)
//!         .with_signal_source(Arc::new(ManualSignals::new()))
//!         .with_log_settings(LogSettings::default())
//!         .build();
//!
//!     let out = Capture::new();
//!     let code = runner
//!         .invoke("greet", None, vec!["world".into()], out.sink(), Sink::discard())
//!         .await;
//!
//!     assert_eq!(code, 0);
//!     assert_eq!(out.lines(), vec!["hello world"]);
//!     Ok(())
//! }
//! ```
mod error;
mod handlers;
mod logging;
mod plugins;
mod policies;
mod runtime;
mod ui;
mod version;

// ---- Public re-exports ----

pub use error::{
    ConfigError, DispatchError, EXIT_CONFIG, EXIT_DISPATCH, PluginDirError, RegistryError,
    RunnerError,
};
pub use handlers::{Handler, HandlerFn};
pub use logging::{Capture, Level, LevelFilter, LogSettings, Logger, Sink};
pub use plugins::{config_dir, discover_plugin_dirs, plugin_arch, plugin_dirs, plugin_os};
pub use policies::{Signal, SignalPolicy};
pub use runtime::{
    CommandRegistry, DEFAULT_SHUTDOWN_CAPACITY, ExecutionContext, HandlerFactory, ManualSignals,
    OsSignals, RegistryBuilder, Runner, RunnerBuilder, RunnerConfig, ShutdownBridge,
    ShutdownEvents, SignalSource, SignalStream, StderrInterceptor,
};
pub use ui::Ui;
pub use version::VersionInfo;
