//! Declarative construction API for applications.

use std::collections::HashSet;
use std::time::Duration;

use tokio::io::AsyncRead;
use tokio::sync::mpsc;

use crate::app::{App, BoxedReader, Hook, StopRequester};
use crate::error::{Result, WeftError};
use crate::layout::LayoutNode;
use crate::manager::{KeyHandler, WidgetManager};
use crate::message::{DEFAULT_CHANNEL_CAPACITY, Key, Message};
use crate::terminal::{Backend, CrosstermBackend, shared};
use crate::widget::Widget;

/// Builder for [`App`].
///
/// Collects widgets, the layout tree, key bindings, and runtime options,
/// and validates everything in [`AppBuilder::build`].
pub struct AppBuilder {
    widgets: Vec<Box<dyn Widget>>,
    layout: Option<LayoutNode>,
    key_handlers: Vec<(Key, KeyHandler)>,
    backend: Option<Box<dyn Backend>>,
    reader: Option<BoxedReader>,
    tick: Option<Duration>,
    bracketed_paste: bool,
    handle_signals: bool,
    capacity: usize,
    main: Option<(mpsc::Sender<Message>, mpsc::Receiver<Message>)>,
    main_capacity: Option<usize>,
    on_start: Vec<Hook>,
    on_stop: Vec<Hook>,
}

impl AppBuilder {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self {
            widgets: Vec::new(),
            layout: None,
            key_handlers: Vec::new(),
            backend: None,
            reader: None,
            tick: None,
            bracketed_paste: false,
            handle_signals: false,
            capacity: DEFAULT_CHANNEL_CAPACITY,
            main: None,
            main_capacity: None,
            on_start: Vec::new(),
            on_stop: Vec::new(),
        }
    }

    /// Mount a widget. Every widget id must be unique.
    #[must_use]
    pub fn widget(mut self, widget: impl Widget + 'static) -> Self {
        self.widgets.push(Box::new(widget));
        self
    }

    /// Set the layout tree. Without one, widgets are stacked
    /// vertically in mount order.
    #[must_use]
    pub fn layout(mut self, layout: LayoutNode) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Register a global key handler. Handlers for the same key run in
    /// registration order; returning `true` consumes the key.
    #[must_use]
    pub fn on_key(mut self, key: Key, handler: impl FnMut(&Key) -> bool + Send + 'static) -> Self {
        self.key_handlers.push((key, Box::new(handler)));
        self
    }

    /// Push a periodic render request at this interval.
    #[must_use]
    pub fn tick(mut self, period: Duration) -> Self {
        self.tick = Some(period);
        self
    }

    /// Set the bounded capacity of the pipeline channels (minimum 1).
    ///
    /// Must be called before [`AppBuilder::stop_requester`].
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Enable bracketed-paste mode on the terminal.
    #[must_use]
    pub fn bracketed_paste(mut self, enabled: bool) -> Self {
        self.bracketed_paste = enabled;
        self
    }

    /// Install an interrupt hook that requests a stop on Ctrl-C.
    #[must_use]
    pub fn handle_signals(mut self, enabled: bool) -> Self {
        self.handle_signals = enabled;
        self
    }

    /// Replace the terminal backend (defaults to crossterm/stdout).
    #[must_use]
    pub fn backend(mut self, backend: impl Backend + 'static) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    /// Replace the input source (defaults to stdin).
    #[must_use]
    pub fn input(mut self, reader: impl AsyncRead + Unpin + Send + 'static) -> Self {
        self.reader = Some(Box::new(reader));
        self
    }

    /// Run a hook when the application starts.
    #[must_use]
    pub fn on_start(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_start.push(Box::new(hook));
        self
    }

    /// Run a hook when the application stops.
    #[must_use]
    pub fn on_stop(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_stop.push(Box::new(hook));
        self
    }

    /// A stop handle usable from widget callbacks (e.g. input submit
    /// handlers), available before the application is built.
    pub fn stop_requester(&mut self) -> StopRequester {
        StopRequester::from_sender(self.main_sender())
    }

    fn main_sender(&mut self) -> mpsc::Sender<Message> {
        let (tx, rx) = match self.main.take() {
            Some(pair) => pair,
            None => {
                self.main_capacity = Some(self.capacity);
                mpsc::channel(self.capacity)
            }
        };
        let sender = tx.clone();
        self.main = Some((tx, rx));
        sender
    }

    /// Validate the configuration and produce an [`App`].
    pub fn build(mut self) -> Result<App> {
        let mut seen = HashSet::new();
        for widget in &self.widgets {
            if !seen.insert(widget.id().to_owned()) {
                return Err(WeftError::Build(format!(
                    "duplicate widget id {:?}",
                    widget.id()
                )));
            }
        }

        let layout = match self.layout.take() {
            Some(node) => node,
            None => {
                let mut root = LayoutNode::vertical();
                for widget in &self.widgets {
                    root = root.child(LayoutNode::widget(widget.id()));
                }
                root
            }
        };
        layout.validate()?;
        for id in layout.leaf_ids() {
            if !seen.contains(&id) {
                return Err(WeftError::Build(format!(
                    "layout references unknown widget id {id:?}"
                )));
            }
        }

        if self.main_capacity.is_some_and(|cap| cap != self.capacity) {
            return Err(WeftError::Build(
                "channel_capacity must be set before stop_requester".into(),
            ));
        }

        let mut manager = WidgetManager::new();
        for widget in self.widgets {
            manager.add_widget(widget);
        }
        manager.set_layout(layout);
        for (key, handler) in self.key_handlers {
            manager.on_key(key, handler);
        }

        let (main_tx, main_rx) = match self.main.take() {
            Some(pair) => pair,
            None => mpsc::channel(self.capacity),
        };
        let backend = self
            .backend
            .take()
            .unwrap_or_else(|| Box::new(CrosstermBackend::new()));

        Ok(App {
            manager,
            backend: shared(backend),
            reader: self.reader,
            tick: self.tick,
            bracketed_paste: self.bracketed_paste,
            handle_signals: self.handle_signals,
            capacity: self.capacity,
            main_tx,
            main_rx,
            on_start: self.on_start,
            on_stop: self.on_stop,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Constraint;
    use crate::widget::{Label, TextInput};

    #[test]
    fn build_minimal_app() {
        let app = App::builder().widget(Label::new("title", "hi")).build();
        assert!(app.is_ok());
    }

    #[test]
    fn duplicate_widget_ids_rejected() {
        let result = App::builder()
            .widget(Label::new("x", "a"))
            .widget(Label::new("x", "b"))
            .build();
        assert!(matches!(result, Err(WeftError::Build(_))));
    }

    #[test]
    fn invalid_constraint_rejected_at_build() {
        let result = App::builder()
            .widget(Label::new("a", "a"))
            .layout(
                LayoutNode::horizontal()
                    .child(LayoutNode::widget("a").constraint(Constraint::Percent(150))),
            )
            .build();
        assert!(matches!(result, Err(WeftError::Build(_))));
    }

    #[test]
    fn layout_with_unknown_widget_rejected() {
        let result = App::builder()
            .widget(Label::new("a", "a"))
            .layout(LayoutNode::vertical().child(LayoutNode::widget("ghost")))
            .build();
        assert!(matches!(result, Err(WeftError::Build(_))));
    }

    #[test]
    fn capacity_change_after_stop_requester_rejected() {
        let mut builder = App::builder().widget(TextInput::new("in"));
        let _stopper = builder.stop_requester();
        let result = builder.channel_capacity(5).build();
        assert!(matches!(result, Err(WeftError::Build(_))));
    }

    #[test]
    fn stop_requester_then_build_shares_the_channel() {
        let mut builder = App::builder().widget(TextInput::new("in"));
        let _stopper = builder.stop_requester();
        assert!(builder.build().is_ok());
    }

    #[test]
    fn default_layout_stacks_widgets() {
        let app = App::builder()
            .widget(TextInput::new("a"))
            .widget(TextInput::new("b"))
            .build();
        assert!(app.is_ok_and(|app| {
            let frame = app.manager.compose(10, 2);
            frame.height() == 2
        }));
    }
}
