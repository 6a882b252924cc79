//! Static text label widget.

use crate::cell::Cell;
use crate::geometry::Size;
use crate::grid::Grid;
use crate::message::Message;
use crate::style::Style;
use crate::widget::Widget;

/// A non-interactive block of text.
///
/// Lines are clipped to the render area; no wrapping is performed.
pub struct Label {
    id: String,
    lines: Vec<String>,
    style: Style,
}

impl Label {
    /// Create a label. The text is split on newlines.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            lines: text.into().split('\n').map(str::to_owned).collect(),
            style: Style::default(),
        }
    }

    /// Set the text style.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Replace the label text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.lines = text.into().split('\n').map(str::to_owned).collect();
    }
}

impl Widget for Label {
    fn id(&self) -> &str {
        &self.id
    }

    fn handle(&mut self, _msg: &Message) {}

    fn render(&self, width: u16, height: u16) -> Grid {
        let mut grid = Grid::new(width, height);
        for (y, line) in self.lines.iter().enumerate().take(usize::from(height)) {
            for (x, ch) in line.chars().enumerate().take(usize::from(width)) {
                grid.set(x as u16, y as u16, Cell::new(ch, self.style));
            }
        }
        grid
    }

    fn min_size(&self) -> Size {
        let width = self.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        Size::new(width.min(usize::from(u16::MAX)) as u16, self.lines.len() as u16)
    }
}
