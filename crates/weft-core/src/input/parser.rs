//! Raw terminal byte parser.
//!
//! Turns the raw stdin byte stream into key, character, and paste
//! messages. The parser keeps a rolling buffer so escape sequences,
//! UTF-8 characters, and bracketed-paste frames may arrive split across
//! reads.

use crate::message::{Key, Message};

const PASTE_END: &[u8] = b"\x1b[201~";

/// Incremental parser from raw bytes to input messages.
#[derive(Debug, Default)]
pub struct InputParser {
    buf: Vec<u8>,
    paste: Option<Vec<u8>>,
}

/// Result of parsing one escape sequence.
enum Parsed {
    /// Bracketed paste opened; switch to accumulation.
    PasteStart(usize),
    /// A recognized key, consuming `usize` bytes.
    Key(Key, usize),
    /// An unrecognized but complete sequence to discard.
    Swallow(usize),
    /// The sequence may continue in a later read.
    Incomplete,
}

/// Result of decoding one UTF-8 character.
enum Decoded {
    Char(char, usize),
    Incomplete,
    Invalid,
}

impl InputParser {
    /// Create a parser with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes, returning all messages completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Message> {
        self.buf.extend_from_slice(bytes);
        self.drain(false)
    }

    /// Flush at end of input: a pending lone escape becomes the escape
    /// key, an unterminated paste is emitted with what accumulated.
    pub fn finish(&mut self) -> Vec<Message> {
        self.drain(true)
    }

    fn drain(&mut self, eof: bool) -> Vec<Message> {
        let mut out = Vec::new();
        let mut i = 0;
        loop {
            // Bracketed-paste accumulation.
            if self.paste.is_some() {
                let rest = &self.buf[i..];
                if let Some(pos) = find(rest, PASTE_END) {
                    let mut pending = self.paste.take().unwrap_or_default();
                    pending.extend_from_slice(&rest[..pos]);
                    out.push(Message::Paste(String::from_utf8_lossy(&pending).into_owned()));
                    i += pos + PASTE_END.len();
                    continue;
                }
                // Keep a partial terminator for the next read, take the rest.
                let keep = partial_suffix(rest, PASTE_END);
                let take = rest.len() - keep;
                if let Some(pending) = self.paste.as_mut() {
                    pending.extend_from_slice(&rest[..take]);
                }
                i += take;
                if eof {
                    let tail = self.buf[i..].to_vec();
                    i = self.buf.len();
                    let mut pending = self.paste.take().unwrap_or_default();
                    pending.extend_from_slice(&tail);
                    out.push(Message::Paste(String::from_utf8_lossy(&pending).into_owned()));
                }
                break;
            }

            let rest = &self.buf[i..];
            let Some(&first) = rest.first() else { break };

            if first == 0x1b {
                match parse_escape(rest, eof) {
                    Parsed::PasteStart(len) => {
                        self.paste = Some(Vec::new());
                        i += len;
                    }
                    Parsed::Key(key, len) => {
                        out.push(Message::Key(key));
                        i += len;
                    }
                    Parsed::Swallow(len) => i += len,
                    Parsed::Incomplete => break,
                }
                continue;
            }

            match first {
                b'\t' => {
                    out.push(Message::Key(Key::Tab));
                    i += 1;
                }
                b'\r' | b'\n' => {
                    out.push(Message::Key(Key::Enter));
                    i += 1;
                }
                0x08 | 0x7f => {
                    out.push(Message::Key(Key::Backspace));
                    i += 1;
                }
                b' ' => {
                    out.push(Message::Key(Key::Space));
                    i += 1;
                }
                _ => match decode_char(rest) {
                    Decoded::Char(ch, len) => {
                        out.push(Message::Input { ch, time: 0 });
                        i += len;
                    }
                    Decoded::Incomplete => {
                        if eof {
                            i = self.buf.len();
                        }
                        break;
                    }
                    Decoded::Invalid => i += 1,
                },
            }
        }
        self.buf.drain(..i);
        out
    }
}

/// Parse one escape sequence at the start of `rest` (which begins with
/// ESC). At end of input, dangling prefixes collapse to the escape key.
fn parse_escape(rest: &[u8], eof: bool) -> Parsed {
    let Some(&second) = rest.get(1) else {
        return if eof {
            Parsed::Key(Key::Escape, 1)
        } else {
            Parsed::Incomplete
        };
    };
    match second {
        b'[' => parse_csi(rest, eof),
        b'O' => {
            let Some(&third) = rest.get(2) else {
                return if eof {
                    Parsed::Key(Key::Escape, rest.len())
                } else {
                    Parsed::Incomplete
                };
            };
            let key = match third {
                b'P' => Some(Key::F(1)),
                b'Q' => Some(Key::F(2)),
                b'R' => Some(Key::F(3)),
                b'S' => Some(Key::F(4)),
                b'H' => Some(Key::Home),
                b'F' => Some(Key::End),
                _ => None,
            };
            match key {
                Some(k) => Parsed::Key(k, 3),
                None => Parsed::Swallow(3),
            }
        }
        // ESC followed by anything else is a bare escape; the next byte
        // is reprocessed on its own.
        _ => Parsed::Key(Key::Escape, 1),
    }
}

/// Parse a CSI sequence (`ESC [` ...).
fn parse_csi(rest: &[u8], eof: bool) -> Parsed {
    let Some(&third) = rest.get(2) else {
        return if eof {
            Parsed::Key(Key::Escape, rest.len())
        } else {
            Parsed::Incomplete
        };
    };
    let simple = match third {
        b'A' => Some(Key::Up),
        b'B' => Some(Key::Down),
        b'C' => Some(Key::Right),
        b'D' => Some(Key::Left),
        b'H' => Some(Key::Home),
        b'F' => Some(Key::End),
        b'Z' => Some(Key::ShiftTab),
        _ => None,
    };
    if let Some(key) = simple {
        return Parsed::Key(key, 3);
    }
    if !third.is_ascii_digit() {
        return Parsed::Swallow(3);
    }

    // Numeric sequence: ESC [ digits (; digits)* final-byte
    let mut j = 2;
    while j < rest.len() && (rest[j].is_ascii_digit() || rest[j] == b';') {
        j += 1;
    }
    let Some(&fin) = rest.get(j) else {
        return if eof {
            Parsed::Key(Key::Escape, rest.len())
        } else {
            Parsed::Incomplete
        };
    };
    let len = j + 1;
    let digits = &rest[2..j];
    if fin != b'~' || digits.contains(&b';') {
        // Cursor/modifier sequences this engine does not map.
        return Parsed::Swallow(len);
    }
    let Some(code) = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
    else {
        return Parsed::Swallow(len);
    };
    let key = match code {
        1 | 7 => Some(Key::Home),
        2 => Some(Key::Insert),
        3 => Some(Key::Delete),
        4 | 8 => Some(Key::End),
        5 => Some(Key::PageUp),
        6 => Some(Key::PageDown),
        11..=15 => Some(Key::F((code - 10) as u8)),
        17..=21 => Some(Key::F((code - 11) as u8)),
        23 | 24 => Some(Key::F((code - 12) as u8)),
        200 => return Parsed::PasteStart(len),
        _ => None,
    };
    match key {
        Some(k) => Parsed::Key(k, len),
        None => Parsed::Swallow(len),
    }
}

/// Decode one UTF-8 character from the front of `rest`.
fn decode_char(rest: &[u8]) -> Decoded {
    let want = match rest[0] {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Decoded::Invalid,
    };
    if rest.len() < want {
        return Decoded::Incomplete;
    }
    match std::str::from_utf8(&rest[..want]) {
        Ok(s) => match s.chars().next() {
            Some(ch) => Decoded::Char(ch, want),
            None => Decoded::Invalid,
        },
        Err(_) => Decoded::Invalid,
    }
}

/// Find `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Length of the longest strict prefix of `pattern` that `data` ends
/// with.
fn partial_suffix(data: &[u8], pattern: &[u8]) -> usize {
    let max = data.len().min(pattern.len().saturating_sub(1));
    (1..=max)
        .rev()
        .find(|&k| data[data.len() - k..] == pattern[..k])
        .unwrap_or(0)
}
