//! Message types carried on the pipeline channels.

use std::fmt;

use crate::cell::Cell;
use crate::grid::Grid;

/// Default bounded capacity for pipeline channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// A logical key, as produced by the input parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Delete.
    Delete,
    /// Insert.
    Insert,
    /// Function key (F1-F12).
    F(u8),
    /// Tab.
    Tab,
    /// Shift-Tab (CSI Z).
    ShiftTab,
    /// Enter / Return.
    Enter,
    /// Backspace.
    Backspace,
    /// Space bar.
    Space,
    /// Escape.
    Escape,
}

impl Key {
    /// Parse a key from its lowercase name, case-insensitively.
    ///
    /// Accepts the names produced by [`Key`]'s `Display` impl, e.g.
    /// `"up"`, `"shift+tab"`, `"page_down"`, `"f7"`.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        let key = match name.as_str() {
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            "page_up" => Key::PageUp,
            "page_down" => Key::PageDown,
            "delete" => Key::Delete,
            "insert" => Key::Insert,
            "tab" => Key::Tab,
            "shift+tab" => Key::ShiftTab,
            "enter" => Key::Enter,
            "backspace" => Key::Backspace,
            "space" => Key::Space,
            "escape" => Key::Escape,
            _ => {
                let n = name.strip_prefix('f')?.parse::<u8>().ok()?;
                if (1..=12).contains(&n) {
                    Key::F(n)
                } else {
                    return None;
                }
            }
        };
        Some(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Up => write!(f, "up"),
            Key::Down => write!(f, "down"),
            Key::Left => write!(f, "left"),
            Key::Right => write!(f, "right"),
            Key::Home => write!(f, "home"),
            Key::End => write!(f, "end"),
            Key::PageUp => write!(f, "page_up"),
            Key::PageDown => write!(f, "page_down"),
            Key::Delete => write!(f, "delete"),
            Key::Insert => write!(f, "insert"),
            Key::F(n) => write!(f, "f{n}"),
            Key::Tab => write!(f, "tab"),
            Key::ShiftTab => write!(f, "shift+tab"),
            Key::Enter => write!(f, "enter"),
            Key::Backspace => write!(f, "backspace"),
            Key::Space => write!(f, "space"),
            Key::Escape => write!(f, "escape"),
        }
    }
}

/// One changed row in a screen diff: the row index and its full new
/// contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowPatch {
    /// Zero-based row index.
    pub row: u16,
    /// The complete new row.
    pub cells: Vec<Cell>,
}

/// A message on one of the pipeline channels.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// Terminate the receiving task (and its downstream).
    Stop {
        /// Optional human-readable reason.
        reason: Option<String>,
    },
    /// A printable character arrived on the input.
    Input {
        /// The character.
        ch: char,
        /// Arrival time in milliseconds, 0 when unknown.
        time: u64,
    },
    /// A logical key was pressed.
    Key(Key),
    /// Text arrived via bracketed paste.
    Paste(String),
    /// A named application command.
    Command {
        /// Command name (e.g. `"focus_next"`).
        name: String,
        /// Optional command payload.
        payload: Option<String>,
    },
    /// The terminal was resized.
    Resize {
        /// New width in columns.
        cols: u16,
        /// New height in rows.
        rows: u16,
    },
    /// A freshly composed frame for the screen buffer.
    ScreenUpdate(Grid),
    /// The rows that changed since the previous frame.
    ScreenDiff(Vec<RowPatch>),
    /// Ask the dispatcher to recompose (animation ticks, manual redraw).
    RenderRequest {
        /// What triggered the request (e.g. `"tick"`).
        reason: String,
    },
    /// Position the terminal cursor (zero-based).
    CursorMove {
        /// Target row.
        row: u16,
        /// Target column.
        col: u16,
    },
    /// Hide the terminal cursor.
    CursorHide,
    /// Show the terminal cursor.
    CursorShow,
    /// Copy text to the system clipboard via OSC 52.
    CopyToClipboard(String),
    /// An event emitted on behalf of a widget.
    Widget {
        /// The originating widget id.
        id: String,
        /// Event payload.
        payload: String,
    },
}

impl Message {
    /// Convenience constructor for a reasonless [`Message::Stop`].
    pub fn stop() -> Self {
        Message::Stop { reason: None }
    }

    /// Convenience constructor for [`Message::Stop`] with a reason.
    pub fn stop_because(reason: impl Into<String>) -> Self {
        Message::Stop {
            reason: Some(reason.into()),
        }
    }

    /// Returns true for [`Message::Stop`].
    pub fn is_stop(&self) -> bool {
        matches!(self, Message::Stop { .. })
    }
}
