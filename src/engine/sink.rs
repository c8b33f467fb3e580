//! Character output capability. The engine never renders text itself; it hands
//! single characters to whatever sink the host supplied.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use tracing::warn;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub trait CharSink {
    fn put_char(&mut self, c: char);

    /// Clears whatever surface the sink draws on.
    fn clear(&mut self) {}

    fn flush(&mut self) {}
}

/// Writes to the process's standard output, flushing at every newline.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    fn write_str(&self, s: &str) {
        let mut out = io::stdout().lock();
        if let Err(e) = out.write_all(s.as_bytes()) {
            warn!(error = %e, "Failed to write to stdout");
        }
    }
}

impl CharSink for StdoutSink {
    fn put_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.write_str(c.encode_utf8(&mut buf));
        if c == '\n' {
            self.flush();
        }
    }

    fn clear(&mut self) {
        self.write_str(CLEAR_SCREEN);
        self.flush();
    }

    fn flush(&mut self) {
        if let Err(e) = io::stdout().flush() {
            warn!(error = %e, "Failed to flush stdout");
        }
    }
}

/// Collects output into a shared string. Clones share the same buffer, so a host can
/// keep one handle and give the other to the interpreter.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    buf: Rc<RefCell<String>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.buf.borrow().clone()
    }

    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buf.borrow_mut())
    }
}

impl CharSink for BufferSink {
    fn put_char(&mut self, c: char) {
        self.buf.borrow_mut().push(c);
    }

    fn clear(&mut self) {
        self.buf.borrow_mut().clear();
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl CharSink for NullSink {
    fn put_char(&mut self, _c: char) {}
}
