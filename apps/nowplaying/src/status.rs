//! Single-line console status shared with log output.
//!
//! The status line is rewritten in place and only when its text changes.
//! Log records go through the same [`Console`], which blanks the status
//! line before each record and redraws it afterwards, so the two never
//! share a terminal row.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use nowplaying_monitor::CycleResult;
use tracing_subscriber::fmt::MakeWriter;

/// Status text shown after a failed publish.
pub const WRITE_ERROR: &str = "WRITE ERROR!";

/// Overwritable status line on a terminal-like writer.
struct StatusLine<W: Write> {
    out: W,
    prefix: String,
    last: Option<String>,
}

impl<W: Write> StatusLine<W> {
    fn update(&mut self, result: &CycleResult) -> bool {
        let message = match result {
            Ok(published) => format!("{}{}", self.prefix, published.label),
            Err(_) => format!("{}{WRITE_ERROR}", self.prefix),
        };

        if self.last.as_deref() == Some(message.as_str()) {
            return false;
        }

        self.erase();
        let _ = write!(self.out, "{message}");
        let _ = self.out.flush();
        self.last = Some(message);
        true
    }

    fn erase(&mut self) {
        if let Some(last) = &self.last {
            let width = last.chars().count();
            let _ = write!(self.out, "\r{}\r", " ".repeat(width));
        }
    }

    fn redraw(&mut self) {
        if let Some(last) = &self.last {
            let _ = write!(self.out, "{last}");
        }
        let _ = self.out.flush();
    }
}

/// Console shared by the status line and the log subscriber.
pub struct Console<W: Write> {
    inner: Arc<Mutex<StatusLine<W>>>,
}

impl<W: Write> Clone for Console<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: Write> Console<W> {
    /// Creates a console writing to `out` with an empty status prefix.
    pub fn new(out: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StatusLine {
                out,
                prefix: String::new(),
                last: None,
            })),
        }
    }

    /// Sets the text shown before every status.
    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.lock().prefix = prefix.into();
    }

    /// Announces the outcome of a cycle.
    ///
    /// Returns whether the line was redrawn.
    pub fn update(&self, result: &CycleResult) -> bool {
        self.lock().update(result)
    }

    /// Blanks the status line, e.g. before shutdown messages.
    pub fn clear(&self) {
        let mut line = self.lock();
        line.erase();
        let _ = line.out.flush();
        line.last = None;
    }

    fn lock(&self) -> MutexGuard<'_, StatusLine<W>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Log record writer holding the console until the record is complete.
pub struct ConsoleWriter<'a, W: Write> {
    line: MutexGuard<'a, StatusLine<W>>,
}

impl<W: Write> Write for ConsoleWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.line.out.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.line.out.flush()
    }
}

impl<W: Write> Drop for ConsoleWriter<'_, W> {
    fn drop(&mut self) {
        self.line.redraw();
    }
}

impl<'a, W: Write + 'a> MakeWriter<'a> for Console<W> {
    type Writer = ConsoleWriter<'a, W>;

    fn make_writer(&'a self) -> Self::Writer {
        let mut line = self.lock();
        line.erase();
        ConsoleWriter { line }
    }
}
