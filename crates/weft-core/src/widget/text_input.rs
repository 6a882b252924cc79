//! Single-line text input widget.

use crate::cell::Cell;
use crate::geometry::Size;
use crate::grid::Grid;
use crate::message::{Key, Message};
use crate::style::Style;
use crate::widget::Widget;

/// Callback invoked with the buffer contents when Enter is pressed.
pub type SubmitHandler = Box<dyn FnMut(&str) + Send>;

/// A focusable single-line editor.
///
/// Printable input and pastes are inserted at the cursor; left/right,
/// home/end, backspace and delete edit the buffer. Enter invokes the
/// submit handler and clears the buffer. The cell under the cursor is
/// underlined while the input has focus.
pub struct TextInput {
    id: String,
    value: String,
    cursor: usize,
    focused: bool,
    style: Style,
    on_submit: Option<SubmitHandler>,
}

impl TextInput {
    /// Create an empty text input.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: String::new(),
            cursor: 0,
            focused: false,
            style: Style::default(),
            on_submit: None,
        }
    }

    /// Set the initial contents.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = self.value.chars().count();
        self
    }

    /// Set the text style.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Register the submit handler invoked on Enter.
    ///
    /// Handlers that need to shut the application down should capture a
    /// stop requester handle rather than any reference back into the
    /// runtime.
    #[must_use]
    pub fn on_submit(mut self, handler: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_submit = Some(Box::new(handler));
        self
    }

    /// Current buffer contents.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Current cursor position as a character index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Byte offset of the character index `idx`.
    fn byte_at(&self, idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(idx)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    fn insert(&mut self, ch: char) {
        let at = self.byte_at(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_at(self.cursor);
            self.value.remove(at);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_at(self.cursor);
            self.value.remove(at);
        }
    }

    fn insert_text(&mut self, text: &str) {
        for ch in text.chars().filter(|c| !c.is_control()) {
            self.insert(ch);
        }
    }
}

impl Widget for TextInput {
    fn id(&self) -> &str {
        &self.id
    }

    fn handle(&mut self, msg: &Message) {
        match msg {
            Message::Input { ch, .. } if !ch.is_control() => self.insert(*ch),
            Message::Paste(text) => self.insert_text(text),
            Message::Key(key) => match key {
                Key::Backspace => self.backspace(),
                Key::Delete => self.delete(),
                Key::Home => self.cursor = 0,
                Key::End => self.cursor = self.char_len(),
                Key::Space => self.insert(' '),
                other => self.handle_navigation(*other),
            },
            _ => {}
        }
    }

    fn render(&self, width: u16, height: u16) -> Grid {
        let mut grid = Grid::new(width, height);
        if width == 0 || height == 0 {
            return grid;
        }
        // Horizontal scroll: keep the cursor inside the visible window.
        let window = usize::from(width);
        let start = (self.cursor + 1).saturating_sub(window);
        for (x, ch) in self.value.chars().skip(start).take(window).enumerate() {
            grid.set(x as u16, 0, Cell::new(ch, self.style));
        }
        if self.focused {
            let cx = (self.cursor - start).min(window - 1) as u16;
            let ch = grid.get(cx, 0).map_or(' ', |c| c.ch);
            grid.set(cx, 0, Cell::new(ch, self.style.underline(true)));
        }
        grid
    }

    fn min_size(&self) -> Size {
        Size::new(1, 1)
    }

    fn can_focus(&self) -> bool {
        true
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn blur(&mut self) {
        self.focused = false;
    }

    fn handle_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn handle_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    fn handle_enter(&mut self) {
        let submitted = std::mem::take(&mut self.value);
        self.cursor = 0;
        if let Some(handler) = self.on_submit.as_mut() {
            handler(&submitted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn type_str(input: &mut TextInput, text: &str) {
        for ch in text.chars() {
            input.handle(&Message::Input { ch, time: 0 });
        }
    }

    #[test]
    fn typing_appends() {
        let mut input = TextInput::new("in");
        type_str(&mut input, "abc");
        assert_eq!(input.value(), "abc");
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn backspace_removes_before_cursor() {
        let mut input = TextInput::new("in");
        type_str(&mut input, "abc");
        input.handle(&Message::Key(Key::Backspace));
        assert_eq!(input.value(), "ab");
    }

    #[test]
    fn insert_in_the_middle() {
        let mut input = TextInput::new("in");
        type_str(&mut input, "ac");
        input.handle(&Message::Key(Key::Left));
        type_str(&mut input, "b");
        assert_eq!(input.value(), "abc");
    }

    #[test]
    fn delete_at_cursor() {
        let mut input = TextInput::new("in").with_value("abc");
        input.handle(&Message::Key(Key::Home));
        input.handle(&Message::Key(Key::Delete));
        assert_eq!(input.value(), "bc");
    }

    #[test]
    fn home_and_end() {
        let mut input = TextInput::new("in").with_value("abc");
        input.handle(&Message::Key(Key::Home));
        assert_eq!(input.cursor(), 0);
        input.handle(&Message::Key(Key::End));
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn space_key_inserts_space() {
        let mut input = TextInput::new("in").with_value("ab");
        input.handle(&Message::Key(Key::Space));
        assert_eq!(input.value(), "ab ");
    }

    #[test]
    fn paste_inserts_content() {
        let mut input = TextInput::new("in");
        input.handle(&Message::Paste("hi there".into()));
        assert_eq!(input.value(), "hi there");
    }

    #[test]
    fn paste_filters_control_characters() {
        let mut input = TextInput::new("in");
        input.handle(&Message::Paste("a\x1bb\nc".into()));
        assert_eq!(input.value(), "abc");
    }

    #[test]
    fn submit_invokes_handler_and_clears() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut input = TextInput::new("in").on_submit(move |text| {
            if let Ok(mut v) = sink.lock() {
                v.push(text.to_owned());
            }
        });
        type_str(&mut input, "hello");
        input.handle(&Message::Key(Key::Enter));
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor(), 0);
        assert_eq!(seen.lock().map(|v| v.clone()).unwrap_or_default(), vec!["hello"]);
    }

    #[test]
    fn unicode_cursor_arithmetic() {
        let mut input = TextInput::new("in");
        type_str(&mut input, "héllo");
        input.handle(&Message::Key(Key::Left));
        input.handle(&Message::Key(Key::Backspace));
        assert_eq!(input.value(), "hélo");
    }

    #[test]
    fn render_shows_value_and_cursor() {
        let mut input = TextInput::new("in").with_value("abc");
        input.focus();
        let grid = input.render(6, 1);
        let text: String = grid.row(0).map(|r| r.iter().map(|c| c.ch).collect()).unwrap_or_default();
        assert_eq!(text, "abc   ");
        // Cursor sits after the text, underlined.
        assert!(grid.get(3, 0).is_some_and(|c| c.style.underline));
    }

    #[test]
    fn render_scrolls_to_keep_cursor_visible() {
        let mut input = TextInput::new("in").with_value("abcdefgh");
        input.focus();
        let grid = input.render(4, 1);
        let text: String = grid.row(0).map(|r| r.iter().map(|c| c.ch).collect()).unwrap_or_default();
        // Cursor is at the end; the window shows the tail.
        assert_eq!(text, "fgh ");
    }

    #[test]
    fn focus_flag_toggles() {
        let mut input = TextInput::new("in");
        assert!(input.can_focus());
        assert!(!input.is_focused());
        input.focus();
        assert!(input.is_focused());
        input.blur();
        assert!(!input.is_focused());
    }
}
