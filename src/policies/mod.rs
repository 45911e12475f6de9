//! Signal policies.
//!
//! ## Contents
//! - [`Signal`]       portable names for the OS signals the bridge understands
//! - [`SignalPolicy`] disjoint ignore / forward sets consumed by the shutdown bridge
//!
//! ## Quick wiring
//! ```text
//! RunnerConfig { signals: SignalPolicy, shutdown_capacity }
//!      └─► runtime::shutdown::ShutdownBridge::start uses:
//!           - ignore  to keep the process alive, events dropped
//!           - forward to publish one shutdown event per receipt
//! ```
//!
//! ## Defaults
//! - `SignalPolicy::default()` intercepts nothing; the embedding program decides.

mod signal;

pub(crate) use signal::Disposition;
pub use signal::{Signal, SignalPolicy};
