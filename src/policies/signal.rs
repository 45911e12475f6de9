//! # Signal disposition policy for the shutdown bridge.
//!
//! [`SignalPolicy`] splits OS signals into two disjoint sets:
//!
//! - **ignore**: registered so their default action (usually process termination) does not
//!   run, but never published to the handler.
//! - **forward**: every receipt publishes exactly one shutdown event.
//!
//! Which signals belong where is platform policy owned by the embedding program.
//! [`SignalPolicy::default`] is empty: no signal is intercepted.
//!
//! ## Example
//! ```text
//! SignalPolicy::new([Signal::Hangup], [Signal::Interrupt, Signal::Terminate])
//!      └─► ShutdownBridge::start registers Hangup (drained) + Interrupt/Terminate (published)
//! ```

use std::fmt;

use crate::error::ConfigError;

/// Portable names for the OS signals the bridge can listen to.
///
/// On non-Unix platforms only [`Signal::Interrupt`] (Ctrl-C) can be registered.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// `SIGINT`, Ctrl-C in a terminal.
    Interrupt,
    /// `SIGTERM`, the default `kill` signal.
    Terminate,
    /// `SIGQUIT`.
    Quit,
    /// `SIGHUP`, controlling terminal closed.
    Hangup,
    /// `SIGUSR1`.
    User1,
    /// `SIGUSR2`.
    User2,
}

impl Signal {
    /// Returns the conventional Unix name of the signal.
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Quit => "SIGQUIT",
            Signal::Hangup => "SIGHUP",
            Signal::User1 => "SIGUSR1",
            Signal::User2 => "SIGUSR2",
        }
    }

    #[cfg(unix)]
    pub(crate) fn kind(self) -> tokio::signal::unix::SignalKind {
        use tokio::signal::unix::SignalKind;

        match self {
            Signal::Interrupt => SignalKind::interrupt(),
            Signal::Terminate => SignalKind::terminate(),
            Signal::Quit => SignalKind::quit(),
            Signal::Hangup => SignalKind::hangup(),
            Signal::User1 => SignalKind::user_defined1(),
            Signal::User2 => SignalKind::user_defined2(),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the bridge does with a received signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Disposition {
    Ignore,
    Forward,
}

/// Disjoint ignore/forward signal sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignalPolicy {
    ignore: Vec<Signal>,
    forward: Vec<Signal>,
}

impl SignalPolicy {
    /// Builds a policy, rejecting any signal present in both sets.
    ///
    /// Repeated entries within one set are collapsed; order of first appearance is kept.
    ///
    /// # Example
    /// ```
    /// use cmdvisor::{Signal, SignalPolicy};
    ///
    /// let policy = SignalPolicy::new([Signal::Hangup], [Signal::Terminate]).unwrap();
    /// assert_eq!(policy.forward(), &[Signal::Terminate]);
    ///
    /// assert!(SignalPolicy::new([Signal::Terminate], [Signal::Terminate]).is_err());
    /// ```
    pub fn new(
        ignore: impl IntoIterator<Item = Signal>,
        forward: impl IntoIterator<Item = Signal>,
    ) -> Result<Self, ConfigError> {
        let ignore = dedup(ignore);
        let forward = dedup(forward);

        if let Some(signal) = forward.iter().find(|s| ignore.contains(s)) {
            return Err(ConfigError::OverlappingSignals { signal: *signal });
        }
        Ok(Self { ignore, forward })
    }

    /// Forward-only policy.
    pub fn forwarding(forward: impl IntoIterator<Item = Signal>) -> Self {
        Self {
            ignore: Vec::new(),
            forward: dedup(forward),
        }
    }

    /// Signals registered only to suppress their default action.
    pub fn ignore(&self) -> &[Signal] {
        &self.ignore
    }

    /// Signals that publish a shutdown event.
    pub fn forward(&self) -> &[Signal] {
        &self.forward
    }

    /// Returns `true` when no signal is intercepted at all.
    pub fn is_empty(&self) -> bool {
        self.ignore.is_empty() && self.forward.is_empty()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (Signal, Disposition)> + '_ {
        let ignored = self.ignore.iter().map(|s| (*s, Disposition::Ignore));
        let forwarded = self.forward.iter().map(|s| (*s, Disposition::Forward));
        ignored.chain(forwarded)
    }
}

fn dedup(signals: impl IntoIterator<Item = Signal>) -> Vec<Signal> {
    let mut out: Vec<Signal> = Vec::new();
    for s in signals {
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}
