//! # OS signal to shutdown-event bridge.
//!
//! [`ShutdownBridge`] turns raw signal delivery into a single stream of unit
//! shutdown events the handler can observe through [`ShutdownEvents`].
//!
//! ## Architecture
//! ```text
//! SignalSource::listen(sig) ──► SignalStream ─┐
//! SignalSource::listen(sig) ──► SignalStream ─┼─► select_all ──► forward loop
//! SignalSource::listen(sig) ──► SignalStream ─┘                    │
//!                                         ignore set  ─► debug log, dropped
//!                                         forward set ─► try_send(()) ──► mpsc (capacity N)
//!                                                                           │
//!                                                          ShutdownEvents::recv() (handler)
//! ```
//!
//! ## Rules
//! - One event per received forward-set signal, in receipt order.
//! - A full buffer coalesces the signal (dropped, logged at debug); never an error.
//! - [`ShutdownBridge::cancel`] stops the loop and joins it; the sender is dropped, so
//!   every remaining [`ShutdownEvents`] clone observes end-of-stream.
//! - Dropping the bridge without `cancel` still stops the loop (without waiting).
//! - Signal sources are substitutable: [`OsSignals`] for the process, [`ManualSignals`]
//!   for tests and embedding programs that synthesize shutdowns.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::policies::{Disposition, Signal, SignalPolicy};

/// Stream yielding `()` once per delivery of one signal.
pub type SignalStream = BoxStream<'static, ()>;

/// Source of signal notifications.
///
/// Implementations must be callable from within a tokio runtime.
pub trait SignalSource: Send + Sync + 'static {
    /// Starts listening for `signal`. Dropping the stream stops listening.
    fn listen(&self, signal: Signal) -> io::Result<SignalStream>;
}

/// Process signals via `tokio::signal`.
///
/// On Unix every [`Signal`] is supported. On Windows only [`Signal::Interrupt`]
/// (Ctrl-C) is; other kinds fail with [`io::ErrorKind::Unsupported`].
///
/// Note that once tokio has registered a signal, the OS default action stays replaced
/// for the rest of the process lifetime; deliveries with no live stream are discarded.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsSignals;

impl SignalSource for OsSignals {
    #[cfg(unix)]
    fn listen(&self, signal: Signal) -> io::Result<SignalStream> {
        let mut sig = tokio::signal::unix::signal(signal.kind())?;
        Ok(stream::poll_fn(move |cx| sig.poll_recv(cx)).boxed())
    }

    #[cfg(windows)]
    fn listen(&self, signal: Signal) -> io::Result<SignalStream> {
        match signal {
            Signal::Interrupt => {
                let mut sig = tokio::signal::windows::ctrl_c()?;
                Ok(stream::poll_fn(move |cx| sig.poll_recv(cx)).boxed())
            }
            other => Err(unsupported(other)),
        }
    }

    #[cfg(not(any(unix, windows)))]
    fn listen(&self, signal: Signal) -> io::Result<SignalStream> {
        Err(unsupported(signal))
    }
}

#[cfg(not(unix))]
fn unsupported(signal: Signal) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("{signal} is not supported on this platform"),
    )
}

/// Signal source driven by explicit [`raise`](ManualSignals::raise) calls.
///
/// # Example
/// ```
/// use cmdvisor::{ManualSignals, Signal, SignalSource};
///
/// let signals = ManualSignals::new();
/// let _stream = signals.listen(Signal::Terminate).unwrap();
/// assert_eq!(signals.raise(Signal::Terminate), 1);
/// assert_eq!(signals.raise(Signal::Interrupt), 0);
/// ```
#[derive(Debug, Default)]
pub struct ManualSignals {
    listeners: Mutex<Vec<(Signal, mpsc::UnboundedSender<()>)>>,
    registrations: Mutex<Vec<Signal>>,
}

impl ManualSignals {
    /// Creates a source with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `signal` to every live listener; returns how many received it.
    pub fn raise(&self, signal: Signal) -> usize {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|(_, tx)| !tx.is_closed());
        listeners
            .iter()
            .filter(|(s, _)| *s == signal)
            .filter(|(_, tx)| tx.send(()).is_ok())
            .count()
    }

    /// Every [`listen`](SignalSource::listen) call so far, in order.
    pub fn registrations(&self) -> Vec<Signal> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of listeners whose stream is still alive.
    pub fn live_listeners(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, tx)| !tx.is_closed())
            .count()
    }
}

impl SignalSource for ManualSignals {
    fn listen(&self, signal: Signal) -> io::Result<SignalStream> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((signal, tx));
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(signal);
        Ok(stream::poll_fn(move |cx| rx.poll_recv(cx)).boxed())
    }
}

/// Consumer side of the shutdown event stream.
///
/// Clones share one queue: each event is observed by exactly one `recv`.
#[derive(Clone, Debug)]
pub struct ShutdownEvents {
    rx: Arc<tokio::sync::Mutex<mpsc::Receiver<()>>>,
}

impl ShutdownEvents {
    fn new(rx: mpsc::Receiver<()>) -> Self {
        Self {
            rx: Arc::new(tokio::sync::Mutex::new(rx)),
        }
    }

    /// A stream that is already finished; `recv` returns `None` immediately.
    pub fn closed() -> Self {
        let (_, rx) = mpsc::channel(1);
        Self::new(rx)
    }

    /// Waits for the next shutdown event.
    ///
    /// Returns `None` once the bridge has been cancelled and the buffer is drained.
    pub async fn recv(&self) -> Option<()> {
        self.rx.lock().await.recv().await
    }

    /// Takes a pending event without waiting.
    ///
    /// Returns `None` while another clone is parked in [`recv`](Self::recv), even if
    /// events are pending; the parked clone receives them instead.
    pub fn try_recv(&self) -> Option<()> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }
}

/// Running signal subscription for one invocation.
#[derive(Debug)]
pub struct ShutdownBridge {
    events: ShutdownEvents,
    token: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl ShutdownBridge {
    /// Registers every signal in `policy` with `source` and starts forwarding.
    ///
    /// Fails with [`ConfigError::SignalRegistration`] if any registration fails; signals
    /// registered before the failure are released again.
    ///
    /// Must be called from within a tokio runtime. The forwarding loop inherits the
    /// caller's current tracing dispatcher.
    pub fn start(
        source: &dyn SignalSource,
        policy: &SignalPolicy,
        capacity: usize,
    ) -> Result<Self, ConfigError> {
        let mut streams = Vec::new();
        for (signal, disposition) in policy.entries() {
            let stream = source
                .listen(signal)
                .map_err(|source| ConfigError::SignalRegistration { signal, source })?;
            streams.push(stream.map(move |()| (signal, disposition)).boxed());
        }

        let (tx, rx) = mpsc::channel(capacity.max(1));
        let token = CancellationToken::new();
        let join = tokio::spawn(
            forward(streams, tx, token.clone()).with_current_subscriber(),
        );

        debug!(
            ignored = policy.ignore().len(),
            forwarded = policy.forward().len(),
            capacity = capacity.max(1),
            "shutdown bridge started"
        );
        Ok(Self {
            events: ShutdownEvents::new(rx),
            token,
            join: Some(join),
        })
    }

    /// Handle to the event stream.
    pub fn events(&self) -> ShutdownEvents {
        self.events.clone()
    }

    /// Stops forwarding and waits for the loop to exit.
    ///
    /// After this returns no further events are published and signal streams are
    /// released.
    pub async fn cancel(mut self) {
        self.token.cancel();
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                warn!(error = %e, "shutdown forwarder ended abnormally");
            }
        }
        debug!("shutdown bridge cancelled");
    }
}

impl Drop for ShutdownBridge {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Forwards signals until `token` is cancelled.
///
/// When every source stream has ended the loop keeps the sender alive until
/// cancellation, so consumers never mistake exhausted sources for shutdown.
async fn forward(
    streams: Vec<BoxStream<'static, (Signal, Disposition)>>,
    tx: mpsc::Sender<()>,
    token: CancellationToken,
) {
    let mut incoming = stream::select_all(streams);
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            next = incoming.next() => match next {
                Some((signal, Disposition::Forward)) => match tx.try_send(()) {
                    Ok(()) => debug!(%signal, "shutdown requested"),
                    Err(TrySendError::Full(())) => {
                        debug!(%signal, "shutdown buffer full; signal coalesced");
                    }
                    Err(TrySendError::Closed(())) => {
                        debug!(%signal, "no shutdown consumer left");
                    }
                },
                Some((signal, Disposition::Ignore)) => debug!(%signal, "signal ignored"),
                None => {
                    token.cancelled().await;
                    break;
                }
            }
        }
    }
}
