//! # Per-invocation structured logger.
//!
//! [`Logger`] wraps a [`tracing::Dispatch`] built for one invocation. It is never
//! installed as the global default: the runner attaches it to the futures it drives
//! ([`Logger::attach`]) and hands a clone to the handler through the
//! [`ExecutionContext`](crate::ExecutionContext).
//!
//! ```text
//! LevelFilter { min, sink } ──► Logger (fmt subscriber, max level = min, writer = sink)
//!                                  ├─► Runner diagnostics   (debug!/warn!)
//!                                  ├─► ShutdownBridge loop  (inherits via with_current_subscriber)
//!                                  └─► handler.run(args)    (tracing::* inside handlers)
//! ```

use std::fmt;
use std::future::Future;

use tracing::Dispatch;
use tracing::instrument::{WithDispatch, WithSubscriber};
use tracing::level_filters::LevelFilter as MaxLevel;

use crate::logging::{Level, Sink};

/// Cloneable handle to the invocation's tracing dispatcher.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
    max: MaxLevel,
}

impl Logger {
    /// Logger emitting events at `min` and above into `sink`.
    pub fn new(min: Level, sink: Sink) -> Self {
        let max = MaxLevel::from_level(min.as_tracing());
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(max)
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .finish();
        Self {
            dispatch: Dispatch::new(subscriber),
            max,
        }
    }

    /// Logger that records nothing.
    pub fn disabled() -> Self {
        Self {
            dispatch: Dispatch::none(),
            max: MaxLevel::OFF,
        }
    }

    /// Underlying dispatcher.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Returns `true` if events at `level` would be recorded.
    pub fn enabled(&self, level: Level) -> bool {
        MaxLevel::from_level(level.as_tracing()) <= self.max
    }

    /// Runs `f` with this logger as the thread's default dispatcher.
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Attaches this logger to a future; it is the default while the future is polled.
    pub fn attach<F: Future>(&self, fut: F) -> WithDispatch<F> {
        fut.with_subscriber(self.dispatch.clone())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("max", &self.max).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Capture;

    #[test]
    fn test_events_below_minimum_are_dropped() {
        let buf = Capture::new();
        let logger = Logger::new(Level::Info, buf.sink());
        logger.scope(|| {
            tracing::debug!("hidden");
            tracing::warn!(operation = "apply", "slow operation");
        });

        let out = buf.contents();
        assert!(!out.contains("hidden"));
        assert!(out.contains("WARN"));
        assert!(out.contains("slow operation"));
        assert!(out.contains("operation=\"apply\""));
    }

    #[test]
    fn test_enabled_follows_minimum() {
        let logger = Logger::new(Level::Warn, Sink::discard());
        assert!(logger.enabled(Level::Error));
        assert!(logger.enabled(Level::Warn));
        assert!(!logger.enabled(Level::Info));
        assert!(!Logger::disabled().enabled(Level::Error));
    }

    #[tokio::test]
    async fn test_attach_scopes_to_the_future() {
        let buf = Capture::new();
        let logger = Logger::new(Level::Trace, buf.sink());
        logger
            .attach(async {
                tokio::task::yield_now().await;
                tracing::trace!("inside");
            })
            .await;
        tracing::error!("outside");

        let out = buf.contents();
        assert!(out.contains("inside"));
        assert!(!out.contains("outside"));
    }
}
