//! Bounded in-memory log sink.
//!
//! While the demo owns the terminal, tracing output cannot go to stderr
//! without tearing the screen, so it is collected here and the status area
//! shows the tail.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

pub const DEFAULT_MAX_LINES: usize = 500;

static GLOBAL_LOG: OnceLock<LogBufferHandle> = OnceLock::new();

/// Route tracing output into `handle`. Only the first call wins.
pub fn set_global_log_buffer(handle: LogBufferHandle) -> bool {
    GLOBAL_LOG.set(handle).is_ok()
}

pub fn global_log_buffer() -> Option<LogBufferHandle> {
    GLOBAL_LOG.get().cloned()
}

#[derive(Debug)]
struct LogBuffer {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl LogBuffer {
    fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
        }
    }

    fn push_line(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogBufferHandle {
    inner: Arc<Mutex<LogBuffer>>,
}

impl LogBufferHandle {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LogBuffer::new(max_lines))),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut buffer) = self.inner.lock() {
            buffer.push_line(line.into());
        }
    }

    /// The newest `count` lines, oldest first.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let Ok(buffer) = self.inner.lock() else {
            return Vec::new();
        };
        let skip = buffer.lines.len().saturating_sub(count);
        buffer.lines.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map_or(0, |buffer| buffer.lines.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn writer(&self) -> LogBufferWriter {
        LogBufferWriter::new(self.clone())
    }
}

/// Line-buffering `Write` adapter; complete lines go to the buffer, a
/// trailing partial line waits for the next write or a flush.
#[derive(Debug)]
pub struct LogBufferWriter {
    handle: LogBufferHandle,
    pending: Vec<u8>,
}

impl LogBufferWriter {
    pub fn new(handle: LogBufferHandle) -> Self {
        Self {
            handle,
            pending: Vec::new(),
        }
    }

    fn flush_pending(&mut self, force: bool) {
        if self.pending.is_empty() {
            return;
        }
        let end = if force {
            self.pending.len()
        } else {
            let Some(pos) = self.pending.iter().rposition(|b| *b == b'\n') else {
                return;
            };
            pos + 1
        };
        let drained: Vec<u8> = self.pending.drain(..end).collect();
        let text = String::from_utf8_lossy(&drained);
        for line in text.split('\n').filter(|line| !line.is_empty()) {
            self.handle.push(line.to_string());
        }
    }
}

impl Write for LogBufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.flush_pending(false);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_pending(true);
        Ok(())
    }
}

impl Drop for LogBufferWriter {
    fn drop(&mut self) {
        self.flush_pending(true);
    }
}
