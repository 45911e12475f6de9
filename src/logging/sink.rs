//! # Shared output sinks.
//!
//! [`Sink`] is a cloneable, thread-safe handle to a boxed writer. The runner hands
//! sinks to the UI, the stderr scanner thread and the per-invocation tracing
//! dispatcher; all clones write to the same underlying stream.
//!
//! [`Capture`] is an in-memory writer for tests and embedding programs that want
//! to inspect what was written.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Shared = Arc<Mutex<Box<dyn Write + Send>>>;

/// Cloneable handle to a writer.
///
/// Each [`write_line`](Sink::write_line) is written and flushed under one lock, so
/// lines from concurrent writers never interleave.
#[derive(Clone)]
pub struct Sink {
    inner: Shared,
    discard: bool,
}

impl Sink {
    /// Wraps a writer.
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
            discard: false,
        }
    }

    /// A sink that drops everything.
    pub fn discard() -> Self {
        Self {
            discard: true,
            ..Self::new(io::sink())
        }
    }

    /// The process standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// The process standard error, as it is at write time.
    ///
    /// While a [`StderrInterceptor`](crate::StderrInterceptor) is active, writes land in the
    /// interception pipe.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// A private duplicate of the current fd 2.
    ///
    /// Unlike [`Sink::stderr`], it keeps pointing at the original stream after fd 2 is
    /// redirected.
    #[cfg(unix)]
    pub fn original_stderr() -> io::Result<Self> {
        use std::os::fd::AsFd;

        let fd = io::stderr().as_fd().try_clone_to_owned()?;
        Ok(Self::new(std::fs::File::from(fd)))
    }

    /// A private duplicate of the current standard error.
    #[cfg(not(unix))]
    pub fn original_stderr() -> io::Result<Self> {
        Ok(Self::stderr())
    }

    /// Returns `true` for sinks created by [`Sink::discard`].
    pub fn is_discard(&self) -> bool {
        self.discard
    }

    /// Writes `line` followed by `\n` and flushes.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut w = self.lock();
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
        w.flush()
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.lock().write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flush()
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("discard", &self.discard)
            .finish_non_exhaustive()
    }
}

/// In-memory writer whose clones share one buffer.
///
/// # Example
/// ```
/// use cmdvisor::{Capture, Sink};
///
/// let buf = Capture::new();
/// Sink::new(buf.clone()).write_line("hello").unwrap();
/// assert_eq!(buf.contents(), "hello\n");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Capture {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, decoded lossily as UTF-8.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Written lines, without terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Wraps a clone of this buffer in a [`Sink`].
    pub fn sink(&self) -> Sink {
        Sink::new(self.clone())
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clones_share_the_writer() {
        let buf = Capture::new();
        let a = buf.sink();
        let b = a.clone();
        a.write_line("one").unwrap();
        b.write_line("two").unwrap();
        assert_eq!(buf.lines(), vec!["one", "two"]);
    }

    #[test]
    fn test_concurrent_lines_do_not_interleave() {
        let buf = Capture::new();
        let sink = buf.sink();
        let workers: Vec<_> = (0..4)
            .map(|i| {
                let sink = sink.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        sink.write_line(&format!("worker-{i}-line")).unwrap();
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        let lines = buf.lines();
        assert_eq!(lines.len(), 200);
        assert!(lines.iter().all(|l| l.starts_with("worker-") && l.ends_with("-line")));
    }

    #[test]
    fn test_discard_is_flagged() {
        assert!(Sink::discard().is_discard());
        assert!(!Capture::new().sink().is_discard());
        Sink::discard().write_line("dropped").unwrap();
    }
}
