//! Captures formatted tracing output for assertions.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Log lines emitted while running a closure.
pub(crate) struct Logs(String);

impl Logs {
    /// Lines logged at `level` ("ERROR", "WARN", "INFO", ...).
    pub(crate) fn at(&self, level: &str) -> Vec<&str> {
        self.0
            .lines()
            .filter(|line| line.trim_start().starts_with(level))
            .collect()
    }
}

/// Runs `f` with a thread-local subscriber and returns its result and output.
pub(crate) fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Logs) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::TRACE)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer
        .0
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    (result, Logs(String::from_utf8_lossy(&bytes).into_owned()))
}
