use std::io::{self, Write};

use tracing_subscriber::EnvFilter;

use crate::log_buffer::{LogBufferWriter, global_log_buffer};

pub struct DelegatingWriter {
    inner: DelegatingInner,
}

enum DelegatingInner {
    Buffer(LogBufferWriter),
    Stderr(io::Stderr),
}

impl DelegatingWriter {
    fn new() -> Self {
        let inner = match global_log_buffer() {
            Some(handle) => DelegatingInner::Buffer(handle.writer()),
            None => DelegatingInner::Stderr(io::stderr()),
        };
        DelegatingWriter { inner }
    }
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            DelegatingInner::Buffer(w) => w.write(buf),
            DelegatingInner::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            DelegatingInner::Buffer(w) => w.flush(),
            DelegatingInner::Stderr(s) => s.flush(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SubscriberMakeWriter;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DelegatingWriter::new()
    }
}

/// Install the global subscriber at `debug`. See `init_with_filter`.
pub fn init_default() {
    init_with_filter("debug");
}

/// Install a compact subscriber that writes to the global log buffer when one
/// is set, otherwise to stderr. `RUST_LOG` overrides `default_directive`.
/// Later calls are no-ops.
pub fn init_with_filter(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(SubscriberMakeWriter)
        .with_target(false)
        .with_thread_names(false)
        .with_ansi(false)
        .without_time()
        .try_init();
}
