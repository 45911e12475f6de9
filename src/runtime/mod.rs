//! Runtime: invocation orchestration and its scoped resources.
//!
//! The public entry point is [`Runner`]. The remaining types are exposed so that
//! embedding programs can drive the pieces directly or substitute signal sources.
//!
//! Internal modules:
//! - [`runner`]: one invocation, from filter setup to resource release;
//! - [`builder`]: optional overrides (signal source, log settings, log sink);
//! - [`registry`]: immutable name to handler-factory table;
//! - [`context`]: per-invocation value bundle handed to factories;
//! - [`intercept`]: fd 2 redirection through the level filter;
//! - [`shutdown`]: OS signal to shutdown-event bridge;
//! - [`config`]: centralized runner settings.

mod builder;
mod config;
mod context;
mod intercept;
mod registry;
mod runner;
mod shutdown;

pub use builder::RunnerBuilder;
pub use config::{DEFAULT_SHUTDOWN_CAPACITY, RunnerConfig};
pub use context::ExecutionContext;
pub use intercept::StderrInterceptor;
pub use registry::{CommandRegistry, HandlerFactory, RegistryBuilder};
pub use runner::Runner;
pub use shutdown::{
    ManualSignals, OsSignals, ShutdownBridge, ShutdownEvents, SignalSource, SignalStream,
};
