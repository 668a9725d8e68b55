//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use parking_lot::{Mutex as TestMutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

/// Serializes tests that install configurations into the process-wide slot.
static GLOBAL_STATE: TestMutex<()> = parking_lot::const_mutex(());

pub fn lock_global_state() -> MutexGuard<'static, ()> {
    GLOBAL_STATE.lock()
}

/// `MakeWriter` that collects everything written into a shared buffer.
#[derive(Clone, Default)]
pub struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CaptureWriter {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    /// Subscriber writing plain-text records at every level into this buffer.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish()
    }
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CaptureWriter {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a capturing subscriber as the thread default and return
/// what it wrote.
pub fn capture<F: FnOnce()>(f: F) -> String {
    let writer = CaptureWriter::default();
    tracing::subscriber::with_default(writer.subscriber(), f);
    writer.contents()
}
