//! # Process error-stream interception.
//!
//! [`StderrInterceptor`] redirects fd 2 into an in-process pipe for the lifetime of
//! the guard, so diagnostics written straight to stderr (by the handler or by
//! libraries it calls) pass through the invocation's [`LevelFilter`].
//!
//! ## Lifecycle
//! ```text
//! start(filter)
//!   ├─► lease      process-wide lock (one interceptor at a time)
//!   ├─► pipe()     reader/writer, both close-on-exec
//!   ├─► saved      = dup(fd 2)
//!   ├─► scanner    thread: read lines from reader ─► filter.emit(line)
//!   └─► dup2(writer, fd 2)
//!
//! stop() / drop
//!   ├─► dup2(saved, fd 2)     original stream restored
//!   ├─► close(writer)         scanner observes end-of-stream
//!   ├─► join(scanner)         bounded by SCANNER_GRACE, then detached
//!   └─► release lease
//! ```
//!
//! ## Rules
//! - Teardown runs on every exit path, including unwinding, because it lives in `Drop`.
//! - A second `start` waits for the previous guard to finish teardown.
//! - Output from child processes that inherited fd 2 is intercepted too. A child that
//!   outlives the invocation keeps the pipe open; teardown then detaches the scanner,
//!   which keeps forwarding that child's lines until it exits.
//! - On non-Unix targets the guard is inert: nothing is redirected.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, LazyLock};
use std::thread;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::logging::LevelFilter;

static STDERR_LEASE: LazyLock<Arc<Mutex<()>>> = LazyLock::new(|| Arc::new(Mutex::new(())));

/// How long teardown waits for the scanner to drain before detaching it.
const SCANNER_GRACE: Duration = Duration::from_millis(200);

/// Makes the next [`StderrInterceptor::start`] fail as if the pipe could not be created.
#[cfg(test)]
pub(crate) static FAIL_NEXT_PIPE: std::sync::atomic::AtomicBool =
    std::sync::atomic::AtomicBool::new(false);

/// Serialises unit tests that touch fd 2, including identity checks made outside a lease.
#[cfg(test)]
pub(crate) static FD2_TESTS: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Active redirection of fd 2. Restores the original stream when stopped or dropped.
#[derive(Debug)]
pub struct StderrInterceptor {
    #[cfg(unix)]
    saved: Option<std::os::fd::OwnedFd>,
    #[cfg(unix)]
    writer: Option<std::os::fd::OwnedFd>,
    scanner: Option<Scanner>,
    _lease: OwnedMutexGuard<()>,
}

/// Background reader of the interception pipe.
#[derive(Debug)]
struct Scanner {
    handle: thread::JoinHandle<()>,
    done: mpsc::Receiver<()>,
}

impl Scanner {
    /// Waits up to `grace` for end-of-stream, then joins or detaches.
    fn finish(self, grace: Duration) {
        match self.done.recv_timeout(grace) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if self.handle.join().is_err() {
                    warn!("stderr scanner panicked");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                debug!("stderr pipe still held open by another process; scanner detached");
            }
        }
    }
}

impl StderrInterceptor {
    /// Redirects fd 2 and starts forwarding its lines into `filter`.
    ///
    /// Waits while another interceptor is active. Fails with
    /// [`ConfigError::Intercept`] if the pipe cannot be set up; in that case fd 2 is
    /// left untouched.
    pub async fn start(filter: LevelFilter) -> Result<Self, ConfigError> {
        let lease = Arc::clone(&STDERR_LEASE).lock_owned().await;
        let mut this = Self {
            #[cfg(unix)]
            saved: None,
            #[cfg(unix)]
            writer: None,
            scanner: None,
            _lease: lease,
        };
        #[cfg(test)]
        if FAIL_NEXT_PIPE.swap(false, std::sync::atomic::Ordering::SeqCst) {
            return Err(intercept("pipe", std::io::Error::other("pipe unavailable")));
        }
        this.redirect(filter)?;
        Ok(this)
    }

    /// Returns `true` while fd 2 points at the interception pipe.
    #[cfg(unix)]
    pub fn is_active(&self) -> bool {
        self.saved.is_some()
    }

    /// Returns `true` while fd 2 points at the interception pipe.
    #[cfg(not(unix))]
    pub fn is_active(&self) -> bool {
        false
    }

    /// Restores the original stream and waits briefly for intercepted lines to be emitted.
    ///
    /// Returns after at most a short grace period even if a child process still holds
    /// the pipe open.
    pub fn stop(mut self) {
        self.release();
    }

    #[cfg(unix)]
    fn redirect(&mut self, filter: LevelFilter) -> Result<(), ConfigError> {
        use std::io::{self, Write};
        use std::os::fd::{AsFd, AsRawFd};

        let (reader, writer) = unix::pipe().map_err(|e| intercept("pipe", e))?;
        let saved = io::stderr()
            .as_fd()
            .try_clone_to_owned()
            .map_err(|e| intercept("dup", e))?;

        let (done_tx, done) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("stderr-scanner".into())
            .spawn(move || {
                unix::scan(reader, &filter);
                let _ = done_tx.send(());
            })
            .map_err(|e| intercept("spawn", e))?;
        self.scanner = Some(Scanner { handle, done });

        let _ = io::stderr().flush();
        let raw_writer = writer.as_raw_fd();
        self.writer = Some(writer);
        unix::redirect_stderr(raw_writer).map_err(|e| intercept("dup2", e))?;
        self.saved = Some(saved);

        debug!("stderr interception started");
        Ok(())
    }

    #[cfg(not(unix))]
    fn redirect(&mut self, filter: LevelFilter) -> Result<(), ConfigError> {
        drop(filter);
        debug!("stderr interception is not available on this platform");
        Ok(())
    }

    fn release(&mut self) {
        #[cfg(unix)]
        if let Some(saved) = self.saved.take() {
            use std::io::{self, Write};
            use std::os::fd::AsRawFd;

            let _ = io::stderr().flush();
            match unix::redirect_stderr(saved.as_raw_fd()) {
                Ok(()) => debug!("stderr restored"),
                Err(e) => warn!(error = %e, "failed to restore stderr"),
            }
        }
        #[cfg(unix)]
        drop(self.writer.take());

        if let Some(scanner) = self.scanner.take() {
            scanner.finish(SCANNER_GRACE);
        }
    }
}

impl Drop for StderrInterceptor {
    fn drop(&mut self) {
        self.release();
    }
}

fn intercept(stage: &'static str, source: std::io::Error) -> ConfigError {
    ConfigError::Intercept { stage, source }
}

#[cfg(unix)]
mod unix {
    use std::fs::File;
    use std::io::{self, BufRead, BufReader};
    use std::os::fd::{AsRawFd, OwnedFd, RawFd};

    use nix::fcntl::{FcntlArg, FdFlag, fcntl};
    use nix::unistd;

    use crate::logging::LevelFilter;

    const STDERR_FD: RawFd = 2;

    /// Creates a pipe whose ends are not inherited by spawned programs.
    pub(super) fn pipe() -> io::Result<(OwnedFd, OwnedFd)> {
        let (reader, writer) = unistd::pipe()?;
        for fd in [&reader, &writer] {
            fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
        }
        Ok((reader, writer))
    }

    /// Points fd 2 at `fd`.
    pub(super) fn redirect_stderr(fd: RawFd) -> io::Result<()> {
        unistd::dup2(fd, STDERR_FD)?;
        Ok(())
    }

    /// Forwards every line of `reader` to `filter` until end-of-stream.
    ///
    /// Keeps draining when the sink fails so writers to fd 2 never block on a full pipe.
    pub(super) fn scan(reader: OwnedFd, filter: &LevelFilter) {
        let reader = BufReader::new(File::from(reader));
        for chunk in reader.split(b'\n') {
            let Ok(bytes) = chunk else { break };
            let line = String::from_utf8_lossy(&bytes);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            let _ = filter.emit(line);
        }
    }
}
