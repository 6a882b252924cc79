//! Widget manager: ownership, focus, key routing, and composition.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{error, warn};

use crate::geometry::Rect;
use crate::grid::Grid;
use crate::layout::LayoutNode;
use crate::message::{Key, Message};
use crate::widget::Widget;

/// A global key handler. Returning `true` consumes the key.
pub type KeyHandler = Box<dyn FnMut(&Key) -> bool + Send>;

/// Owns the widget set and the layout root; routes events to the
/// focused widget, runs the global key-handler registry, and composites
/// frames.
pub struct WidgetManager {
    widgets: HashMap<String, Box<dyn Widget>>,
    insertion_order: Vec<String>,
    layout: LayoutNode,
    focus_order: Vec<String>,
    focus_idx: Option<usize>,
    key_handlers: HashMap<Key, Vec<KeyHandler>>,
}

impl WidgetManager {
    /// Create an empty manager with a trivial layout.
    pub fn new() -> Self {
        Self {
            widgets: HashMap::new(),
            insertion_order: Vec::new(),
            layout: LayoutNode::vertical(),
            focus_order: Vec::new(),
            focus_idx: None,
            key_handlers: HashMap::new(),
        }
    }

    /// Add a widget. Replaces any widget with the same id.
    pub fn add_widget(&mut self, widget: Box<dyn Widget>) {
        let id = widget.id().to_owned();
        if self.widgets.insert(id.clone(), widget).is_none() {
            self.insertion_order.push(id);
        }
        self.rebuild_focus_order();
    }

    /// Replace the layout root.
    pub fn set_layout(&mut self, layout: LayoutNode) {
        self.layout = layout;
        self.rebuild_focus_order();
    }

    /// Register a global handler for a key. Handlers run in
    /// registration order; the first one to consume the key stops the
    /// chain and the key is not forwarded to the focused widget.
    pub fn on_key(&mut self, key: Key, handler: KeyHandler) {
        self.key_handlers.entry(key).or_default().push(handler);
    }

    /// Ids of all widgets, in insertion order.
    pub fn widget_ids(&self) -> &[String] {
        &self.insertion_order
    }

    /// The focus traversal order currently in effect.
    pub fn focus_order(&self) -> &[String] {
        &self.focus_order
    }

    /// The id of the focused widget, if any.
    pub fn focused_id(&self) -> Option<&str> {
        self.focus_idx
            .and_then(|i| self.focus_order.get(i))
            .map(String::as_str)
    }

    /// Recompute the focus order: focusable layout leaves in
    /// breadth-first order, falling back to insertion order when the
    /// layout has no leaves at all.
    fn rebuild_focus_order(&mut self) {
        let previously_focused = self.focused_id().map(str::to_owned);
        let leaves = self.layout.leaf_ids();
        let candidates: Vec<String> = if leaves.is_empty() {
            self.insertion_order.clone()
        } else {
            leaves
        };
        self.focus_order = candidates
            .into_iter()
            .filter(|id| self.widgets.get(id).is_some_and(|w| w.can_focus()))
            .collect();
        self.focus_idx = match previously_focused {
            Some(id) => self.focus_order.iter().position(|f| *f == id),
            None => None,
        };
        if self.focus_idx.is_none() && !self.focus_order.is_empty() {
            self.focus_idx = Some(0);
        }
        self.apply_focus_flags();
    }

    /// Move focus to the next focusable widget, wrapping around.
    pub fn focus_next(&mut self) {
        if self.focus_order.is_empty() {
            return;
        }
        let len = self.focus_order.len();
        self.focus_idx = Some(self.focus_idx.map_or(0, |i| (i + 1) % len));
        self.apply_focus_flags();
    }

    /// Move focus to the previous focusable widget, wrapping around.
    pub fn focus_prev(&mut self) {
        if self.focus_order.is_empty() {
            return;
        }
        let len = self.focus_order.len();
        self.focus_idx = Some(self.focus_idx.map_or(len - 1, |i| (i + len - 1) % len));
        self.apply_focus_flags();
    }

    /// Set focus to a specific widget id, if it is focusable.
    pub fn set_focus(&mut self, id: &str) {
        if let Some(pos) = self.focus_order.iter().position(|f| f == id) {
            self.focus_idx = Some(pos);
            self.apply_focus_flags();
        }
    }

    /// Synchronize widget focus flags: exactly the focused widget has
    /// its flag set, all others are blurred.
    fn apply_focus_flags(&mut self) {
        let focused = self.focused_id().map(str::to_owned);
        for (id, widget) in &mut self.widgets {
            if Some(id.as_str()) == focused.as_deref() {
                widget.focus();
            } else {
                widget.blur();
            }
        }
    }

    /// Route an event according to the key-routing rules.
    pub fn route(&mut self, msg: &Message) {
        if let Message::Key(key) = msg {
            match key {
                Key::Tab => {
                    self.focus_next();
                    return;
                }
                Key::ShiftTab => {
                    self.focus_prev();
                    return;
                }
                _ => {}
            }
            if self.run_key_handlers(*key) {
                return;
            }
        }
        self.deliver_to_focused(msg);
    }

    /// Run the global handlers registered for `key`.
    /// Returns true if any handler consumed it.
    fn run_key_handlers(&mut self, key: Key) -> bool {
        if let Some(handlers) = self.key_handlers.get_mut(&key) {
            for handler in handlers.iter_mut() {
                if handler(&key) {
                    return true;
                }
            }
        }
        false
    }

    fn deliver_to_focused(&mut self, msg: &Message) {
        let Some(id) = self.focused_id().map(str::to_owned) else {
            return;
        };
        if let Some(widget) = self.widgets.get_mut(&id) {
            deliver(widget.as_mut(), msg);
        }
    }

    /// Deliver a message to every widget, in insertion order.
    pub fn broadcast(&mut self, msg: &Message) {
        for id in &self.insertion_order {
            if let Some(widget) = self.widgets.get_mut(id) {
                deliver(widget.as_mut(), msg);
            }
        }
    }

    /// Composite a `width` x `height` frame: resolve the layout and
    /// blit each widget's grid at its assigned rectangle, clipping at
    /// the frame boundary. Widgets with zero-area rectangles are not
    /// asked to render.
    pub fn compose(&self, width: u16, height: u16) -> Grid {
        let mut frame = Grid::new(width, height);
        let rects = self.layout.resolve(Rect::new(0, 0, width, height));
        for id in self.layout.leaf_ids() {
            let Some(rect) = rects.get(&id) else { continue };
            if rect.is_empty() {
                continue;
            }
            let Some(widget) = self.widgets.get(&id) else {
                continue;
            };
            let grid = widget.render(rect.width, rect.height);
            if grid.width() != rect.width || grid.height() != rect.height {
                warn!(
                    widget = id.as_str(),
                    "widget returned a grid of the wrong dimensions"
                );
            }
            frame.blit(&grid, rect.x, rect.y);
        }
        frame
    }
}

impl Default for WidgetManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Call a widget's handler, isolating panics so one misbehaving widget
/// cannot take the pipeline down.
fn deliver(widget: &mut dyn Widget, msg: &Message) {
    let outcome = catch_unwind(AssertUnwindSafe(|| widget.handle(msg)));
    if outcome.is_err() {
        error!(widget = widget.id(), "widget event handler panicked");
    }
}
