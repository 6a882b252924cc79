//! Widget contract and built-in widgets.

pub mod label;
pub mod spinner;
pub mod text_input;

pub use label::Label;
pub use spinner::Spinner;
pub use text_input::TextInput;

use crate::geometry::Size;
use crate::grid::Grid;
use crate::message::{Key, Message};

/// The capability set every widget exposes to the engine.
///
/// Widgets own their state and mutate it only inside [`Widget::handle`];
/// the manager owns the widget set and toggles focus through
/// [`Widget::focus`] / [`Widget::blur`]. `render` must return a grid of
/// exactly the requested dimensions.
pub trait Widget: Send {
    /// Stable identifier, used by layouts and event routing.
    fn id(&self) -> &str;

    /// Handle a routed or broadcast message.
    fn handle(&mut self, msg: &Message);

    /// Render into a grid of exactly `width` x `height` cells.
    fn render(&self, width: u16, height: u16) -> Grid;

    /// The minimum size this widget needs.
    fn min_size(&self) -> Size {
        Size::new(0, 0)
    }

    /// The maximum size this widget can use.
    fn max_size(&self) -> Size {
        Size::new(u16::MAX, u16::MAX)
    }

    /// Whether this widget participates in focus traversal.
    fn can_focus(&self) -> bool {
        false
    }

    /// Whether this widget currently has focus.
    fn is_focused(&self) -> bool {
        false
    }

    /// Give this widget focus.
    fn focus(&mut self) {}

    /// Take focus away from this widget.
    fn blur(&mut self) {}

    /// Arrow up hook.
    fn handle_up(&mut self) {}

    /// Arrow down hook.
    fn handle_down(&mut self) {}

    /// Arrow left hook.
    fn handle_left(&mut self) {}

    /// Arrow right hook.
    fn handle_right(&mut self) {}

    /// Tab hook (only reached when tab is not consumed for focus).
    fn handle_tab(&mut self) {}

    /// Enter hook.
    fn handle_enter(&mut self) {}

    /// Escape hook.
    fn handle_escape(&mut self) {}

    /// Dispatch a navigation key to the matching hook.
    fn handle_navigation(&mut self, key: Key) {
        match key {
            Key::Up => self.handle_up(),
            Key::Down => self.handle_down(),
            Key::Left => self.handle_left(),
            Key::Right => self.handle_right(),
            Key::Tab => self.handle_tab(),
            Key::Enter => self.handle_enter(),
            Key::Escape => self.handle_escape(),
            _ => {}
        }
    }
}
