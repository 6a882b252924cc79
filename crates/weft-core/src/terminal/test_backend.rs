//! In-memory terminal backend for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Result;
use crate::geometry::Size;

use super::traits::Backend;

/// In-memory terminal backend.
///
/// All output is captured in a buffer that tests can inspect through a
/// [`TestOutput`] handle taken before the backend is boxed. The backend
/// reports itself as a TTY by default so the full rendering lifecycle
/// (alternate screen, cursor sequences) is exercised.
pub struct TestBackend {
    size: Size,
    buffer: Arc<Mutex<Vec<u8>>>,
    raw_mode: Arc<AtomicBool>,
    tty: bool,
}

/// Cloneable viewer onto a [`TestBackend`]'s captured output.
#[derive(Clone)]
pub struct TestOutput {
    buffer: Arc<Mutex<Vec<u8>>>,
    raw_mode: Arc<AtomicBool>,
}

impl TestBackend {
    /// Create a new test backend with the given size.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            size: Size::new(width, height),
            buffer: Arc::new(Mutex::new(Vec::new())),
            raw_mode: Arc::new(AtomicBool::new(false)),
            tty: true,
        }
    }

    /// Pretend not to be a TTY.
    #[must_use]
    pub fn not_a_tty(mut self) -> Self {
        self.tty = false;
        self
    }

    /// Take a handle for inspecting output after the backend is boxed.
    pub fn output_handle(&self) -> TestOutput {
        TestOutput {
            buffer: Arc::clone(&self.buffer),
            raw_mode: Arc::clone(&self.raw_mode),
        }
    }

    /// Bytes written so far.
    pub fn bytes(&self) -> Vec<u8> {
        read_buffer(&self.buffer)
    }

    /// Whether raw mode is active.
    pub fn is_raw_mode(&self) -> bool {
        self.raw_mode.load(Ordering::SeqCst)
    }

    /// Simulate a terminal resize.
    pub fn set_size(&mut self, width: u16, height: u16) {
        self.size = Size::new(width, height);
    }
}

impl TestOutput {
    /// Bytes written so far.
    pub fn bytes(&self) -> Vec<u8> {
        read_buffer(&self.buffer)
    }

    /// Output decoded lossily for string assertions.
    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    /// Discard everything captured so far.
    pub fn clear(&self) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Whether raw mode is active.
    pub fn is_raw_mode(&self) -> bool {
        self.raw_mode.load(Ordering::SeqCst)
    }
}

fn read_buffer(buffer: &Arc<Mutex<Vec<u8>>>) -> Vec<u8> {
    buffer
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

impl Backend for TestBackend {
    fn size(&self) -> Result<Size> {
        Ok(self.size)
    }

    fn is_tty(&self) -> bool {
        self.tty
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn enter_raw_mode(&mut self) -> Result<()> {
        self.raw_mode.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn exit_raw_mode(&mut self) -> Result<()> {
        self.raw_mode.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_writes() {
        let mut tb = TestBackend::new(80, 24);
        let out = tb.output_handle();
        tb.write(b"hello").ok();
        assert_eq!(tb.bytes(), b"hello");
        assert_eq!(out.as_string(), "hello");
        out.clear();
        assert!(tb.bytes().is_empty());
    }

    #[test]
    fn output_handle_survives_boxing() {
        let tb = TestBackend::new(80, 24);
        let out = tb.output_handle();
        let mut boxed: Box<dyn Backend> = Box::new(tb);
        boxed.write(b"via box").ok();
        assert_eq!(out.as_string(), "via box");
    }

    #[test]
    fn raw_mode_toggles() {
        let mut tb = TestBackend::new(80, 24);
        let out = tb.output_handle();
        assert!(!tb.is_raw_mode());
        tb.enter_raw_mode().ok();
        assert!(out.is_raw_mode());
        tb.exit_raw_mode().ok();
        assert!(!out.is_raw_mode());
    }

    #[test]
    fn resize() {
        let mut tb = TestBackend::new(80, 24);
        tb.set_size(120, 40);
        assert_eq!(tb.size().ok(), Some(Size::new(120, 40)));
    }

    #[test]
    fn tty_by_default() {
        assert!(TestBackend::new(10, 10).is_tty());
        assert!(!TestBackend::new(10, 10).not_a_tty().is_tty());
    }
}
