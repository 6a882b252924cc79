//! Animated spinner widget.

use crate::cell::Cell;
use crate::geometry::Size;
use crate::grid::Grid;
use crate::message::Message;
use crate::style::Style;
use crate::widget::Widget;

const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// A spinner that advances one frame per render request broadcast.
///
/// Pair it with the application ticker to animate it.
pub struct Spinner {
    id: String,
    label: String,
    frame: usize,
    style: Style,
}

impl Spinner {
    /// Create a spinner with no label.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            frame: 0,
            style: Style::default(),
        }
    }

    /// Set the text shown after the spinner glyph.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the style.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Current frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }
}

impl Widget for Spinner {
    fn id(&self) -> &str {
        &self.id
    }

    fn handle(&mut self, msg: &Message) {
        if matches!(msg, Message::RenderRequest { .. }) {
            self.frame = (self.frame + 1) % FRAMES.len();
        }
    }

    fn render(&self, width: u16, height: u16) -> Grid {
        let mut grid = Grid::new(width, height);
        if width == 0 || height == 0 {
            return grid;
        }
        grid.set(0, 0, Cell::new(FRAMES[self.frame], self.style));
        for (i, ch) in self.label.chars().enumerate() {
            let x = 2 + i;
            if x >= usize::from(width) {
                break;
            }
            grid.set(x as u16, 0, Cell::new(ch, self.style));
        }
        grid
    }

    fn min_size(&self) -> Size {
        Size::new(1, 1)
    }
}
