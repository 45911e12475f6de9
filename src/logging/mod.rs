//! # Diagnostics: severities, filtering and sinks.
//!
//! Diagnostic text reaches the sink through two paths:
//!
//! ```text
//! raw fd 2 writes ──► StderrInterceptor ──► scanner thread ──► LevelFilter::emit ──┐
//!                                                                                  ├──► Sink
//! tracing::* events ──► Logger (per-invocation Dispatch, max level = min) ─────────┘
//! ```
//!
//! ## Contents
//! - [`Level`]       fixed allow-list of severities (`TRACE` < .. < `ERROR`)
//! - [`LevelFilter`] minimum-severity filter bound to a sink
//! - [`LogSettings`] environment-style configuration (`<PREFIX>_LOG`, `<PREFIX>_LOG_PATH`)
//! - [`Logger`]      per-invocation tracing dispatcher
//! - [`Sink`], [`Capture`] shared writers

mod filter;
mod level;
mod logger;
mod settings;
mod sink;

pub use filter::LevelFilter;
pub use level::Level;
pub use logger::Logger;
pub use settings::LogSettings;
pub use sink::{Capture, Sink};
