//! Crossterm-based terminal backend.

use std::io::{self, Write};

use crossterm::terminal;
use crossterm::tty::IsTty;

use crate::error::Result;
use crate::geometry::Size;

use super::traits::Backend;

/// Fallback size when neither the terminal nor the environment can be
/// queried.
const DEFAULT_SIZE: Size = Size::new(80, 24);

/// Terminal backend writing to stdout via crossterm.
pub struct CrosstermBackend {
    raw_mode: bool,
}

impl CrosstermBackend {
    /// Create a new crossterm backend.
    pub fn new() -> Self {
        Self { raw_mode: false }
    }
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for CrosstermBackend {
    fn size(&self) -> Result<Size> {
        match terminal::size() {
            Ok((w, h)) if w > 0 && h > 0 => Ok(Size::new(w, h)),
            _ => Ok(env_size()),
        }
    }

    fn is_tty(&self) -> bool {
        io::stdout().is_tty()
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        io::stdout().write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn enter_raw_mode(&mut self) -> Result<()> {
        if !self.raw_mode {
            terminal::enable_raw_mode()?;
            self.raw_mode = true;
        }
        Ok(())
    }

    fn exit_raw_mode(&mut self) -> Result<()> {
        if self.raw_mode {
            terminal::disable_raw_mode()?;
            self.raw_mode = false;
        }
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        if self.raw_mode {
            let _ = terminal::disable_raw_mode();
        }
    }
}

/// Best-effort size from `COLUMNS`/`LINES`, falling back to 80x24.
fn env_size() -> Size {
    let var = |name: &str| {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .filter(|n| *n > 0)
    };
    match (var("COLUMNS"), var("LINES")) {
        (Some(cols), Some(rows)) => Size::new(cols, rows),
        _ => DEFAULT_SIZE,
    }
}
