//! Backend trait for terminal I/O.

use crate::error::Result;
use crate::geometry::Size;

/// Abstraction over the terminal the pipeline writes to.
///
/// The diff renderer and cursor manager share one backend through
/// [`super::SharedBackend`], which serializes their writes; the input
/// task uses the same handle for raw-mode ownership.
pub trait Backend: Send {
    /// Current terminal size.
    fn size(&self) -> Result<Size>;

    /// Whether the output is an interactive terminal.
    fn is_tty(&self) -> bool;

    /// Write raw bytes to the terminal.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Flush buffered output.
    fn flush(&mut self) -> Result<()>;

    /// Enter raw mode (no line buffering, no echo).
    fn enter_raw_mode(&mut self) -> Result<()>;

    /// Exit raw mode, restoring the previous terminal state.
    fn exit_raw_mode(&mut self) -> Result<()>;
}
