//! Cursor manager: terminal cursor visibility and position.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::message::Message;
use crate::terminal::{SharedBackend, lock};

const SHOW_CURSOR: &str = "\x1b[?25h";
const HIDE_CURSOR: &str = "\x1b[?25l";
const RESET_ATTRS: &str = "\x1b[0m";

/// Task tracking cursor visibility and position, writing DECTCEM and
/// cursor-position sequences through the shared backend.
pub struct CursorManager {
    backend: SharedBackend,
    visible: bool,
    row: u16,
    col: u16,
}

impl CursorManager {
    /// Create a cursor manager. The cursor starts visible at (0, 0).
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            visible: true,
            row: 0,
            col: 0,
        }
    }

    /// Current visibility.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current position as (row, col).
    pub fn position(&self) -> (u16, u16) {
        (self.row, self.col)
    }

    /// Run until a stop message arrives or the channel closes. On the
    /// way out the cursor is left visible with attributes reset.
    pub async fn run(mut self, mut rx: mpsc::Receiver<Message>) {
        while let Some(msg) = rx.recv().await {
            match msg {
                Message::CursorShow => {
                    self.visible = true;
                    self.emit(SHOW_CURSOR);
                }
                Message::CursorHide => {
                    self.visible = false;
                    self.emit(HIDE_CURSOR);
                }
                Message::CursorMove { row, col } => {
                    self.row = row;
                    self.col = col;
                    self.emit(&format!("\x1b[{};{}H", row + 1, col + 1));
                }
                Message::Stop { .. } => break,
                _ => debug!("cursor manager ignoring unexpected message"),
            }
        }
        let mut teardown = String::from(RESET_ATTRS);
        teardown.push_str(SHOW_CURSOR);
        self.emit(&teardown);
    }

    fn emit(&self, seq: &str) {
        let mut guard = lock(&self.backend);
        if guard.write(seq.as_bytes()).and_then(|()| guard.flush()).is_err() {
            warn!("failed to write cursor sequence");
        }
    }
}
