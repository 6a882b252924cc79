//! Diff renderer: applies row diffs to the terminal as ANSI sequences.
//!
//! The renderer owns the alternate-screen lifecycle: it enters the
//! alternate screen once at start-up (on TTY outputs) and leaves it,
//! resets attributes, and shows the cursor exactly once on the way out,
//! whatever the termination path.

use std::fmt::Write as _;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::color::Color;
use crate::message::{Message, RowPatch};
use crate::style::Style;
use crate::terminal::{SharedBackend, lock};

const ENTER_ALT_SCREEN: &str = "\x1b[?1049h";
const LEAVE_ALT_SCREEN: &str = "\x1b[?1049l";
const CURSOR_HOME: &str = "\x1b[H";
const SHOW_CURSOR: &str = "\x1b[?25h";
const RESET_ATTRS: &str = "\x1b[0m";
const ENABLE_BRACKETED_PASTE: &str = "\x1b[?2004h";
const DISABLE_BRACKETED_PASTE: &str = "\x1b[?2004l";

/// Combined SGR sequence selecting exactly `style` from a reset state.
pub fn sgr(style: &Style) -> String {
    let mut codes = vec![0u8];
    if style.bold {
        codes.push(1);
    }
    if style.underline {
        codes.push(4);
    }
    if style.fg != Color::Default {
        codes.push(style.fg.fg_code());
    }
    if style.bg != Color::Default {
        codes.push(style.bg.bg_code());
    }
    let body: Vec<String> = codes.iter().map(u8::to_string).collect();
    format!("\x1b[{}m", body.join(";"))
}

/// Emit one changed row: cursor move, cells grouped into runs of equal
/// style with one SGR per run, then a reset and line terminator.
pub fn render_row(out: &mut String, patch: &RowPatch) {
    let _ = write!(out, "\x1b[{};1H", patch.row + 1);
    let mut current: Option<Style> = None;
    for cell in &patch.cells {
        if current != Some(cell.style) {
            out.push_str(&sgr(&cell.style));
            current = Some(cell.style);
        }
        out.push(cell.ch);
    }
    out.push_str(RESET_ATTRS);
    out.push_str("\r\n");
}

/// Best-effort terminal restore, for supervisors that had to abandon a
/// stuck renderer task.
pub(crate) fn restore_terminal(backend: &SharedBackend, bracketed_paste: bool) {
    let mut guard = lock(backend);
    if !guard.is_tty() {
        return;
    }
    let mut seq = String::new();
    if bracketed_paste {
        seq.push_str(DISABLE_BRACKETED_PASTE);
    }
    seq.push_str(LEAVE_ALT_SCREEN);
    seq.push_str(RESET_ATTRS);
    seq.push_str(SHOW_CURSOR);
    if guard.write(seq.as_bytes()).and_then(|()| guard.flush()).is_err() {
        warn!("failed to restore terminal state");
    }
}

/// Task applying screen diffs to the terminal.
pub struct DiffRenderer {
    backend: SharedBackend,
    bracketed_paste: bool,
    active: bool,
}

impl DiffRenderer {
    /// Create a renderer over a shared backend.
    pub fn new(backend: SharedBackend, bracketed_paste: bool) -> Self {
        Self {
            backend,
            bracketed_paste,
            active: false,
        }
    }

    /// Run until a stop message arrives or the channel closes.
    pub async fn run(mut self, mut rx: mpsc::Receiver<Message>) {
        self.enter();
        while let Some(msg) = rx.recv().await {
            match msg {
                Message::ScreenDiff(patches) => self.apply(&patches),
                Message::CopyToClipboard(text) => self.copy_to_clipboard(&text),
                Message::Stop { .. } => break,
                _ => debug!("renderer ignoring unexpected message"),
            }
        }
        self.leave();
    }

    /// Enter the alternate screen and home the cursor. TTY only.
    fn enter(&mut self) {
        if self.active {
            return;
        }
        let mut guard = lock(&self.backend);
        if !guard.is_tty() {
            return;
        }
        let mut seq = String::from(ENTER_ALT_SCREEN);
        seq.push_str(CURSOR_HOME);
        if self.bracketed_paste {
            seq.push_str(ENABLE_BRACKETED_PASTE);
        }
        if guard.write(seq.as_bytes()).and_then(|()| guard.flush()).is_err() {
            warn!("failed to enter alternate screen");
            return;
        }
        self.active = true;
    }

    /// Leave the alternate screen, reset attributes, show the cursor.
    fn leave(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let mut guard = lock(&self.backend);
        let mut seq = String::new();
        if self.bracketed_paste {
            seq.push_str(DISABLE_BRACKETED_PASTE);
        }
        seq.push_str(LEAVE_ALT_SCREEN);
        seq.push_str(RESET_ATTRS);
        seq.push_str(SHOW_CURSOR);
        if guard.write(seq.as_bytes()).and_then(|()| guard.flush()).is_err() {
            warn!("failed to leave alternate screen");
        }
    }

    /// Write one diff and flush.
    fn apply(&mut self, patches: &[RowPatch]) {
        let mut out = String::new();
        for patch in patches {
            render_row(&mut out, patch);
        }
        let mut guard = lock(&self.backend);
        if guard.write(out.as_bytes()).and_then(|()| guard.flush()).is_err() {
            warn!("failed to write diff to terminal");
        }
    }

    /// Send text to the clipboard via OSC 52. Best effort.
    fn copy_to_clipboard(&mut self, text: &str) {
        let seq = format!("\x1b]52;c;{}\x07", BASE64.encode(text));
        let mut guard = lock(&self.backend);
        if guard.write(seq.as_bytes()).and_then(|()| guard.flush()).is_err() {
            warn!("failed to write clipboard sequence");
        }
    }
}
