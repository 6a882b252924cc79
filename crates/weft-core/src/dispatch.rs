//! Dispatcher: consumes the main channel and drives the widget manager.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::geometry::Size;
use crate::manager::WidgetManager;
use crate::message::Message;

/// Task connecting input events to widget state and frame composition.
///
/// Every message that can change widget state is followed by a fresh
/// composite pushed to the screen buffer, in receive order. Failures to
/// compose or push a frame are logged and never fatal; only a stop
/// message (or a closed channel) ends the task, and the stop is
/// forwarded downstream exactly once.
pub struct Dispatcher {
    manager: WidgetManager,
    width: u16,
    height: u16,
}

impl Dispatcher {
    /// Create a dispatcher around a widget manager with the initial
    /// terminal dimensions.
    pub fn new(manager: WidgetManager, size: Size) -> Self {
        Self {
            manager,
            width: size.width,
            height: size.height,
        }
    }

    /// Run until a stop message arrives or the channel closes.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<Message>,
        buffer_tx: mpsc::Sender<Message>,
        cursor_tx: mpsc::Sender<Message>,
    ) {
        let mut stop_reason = None;
        while let Some(msg) = rx.recv().await {
            match msg {
                Message::Stop { reason } => {
                    stop_reason = reason;
                    break;
                }
                Message::Input { .. } | Message::Key(_) | Message::Paste(_) => {
                    self.manager.route(&msg);
                    self.push_frame(&buffer_tx).await;
                }
                Message::Command { ref name, .. } if name.as_str() == "focus_next" => {
                    self.manager.focus_next();
                    self.push_frame(&buffer_tx).await;
                }
                Message::Command { ref name, .. } if name.as_str() == "focus_prev" => {
                    self.manager.focus_prev();
                    self.push_frame(&buffer_tx).await;
                }
                Message::Command { .. } | Message::RenderRequest { .. } => {
                    self.manager.broadcast(&msg);
                    self.push_frame(&buffer_tx).await;
                }
                Message::Resize { cols, rows } => {
                    self.width = cols;
                    self.height = rows;
                    self.push_frame(&buffer_tx).await;
                }
                Message::CursorMove { .. } | Message::CursorHide | Message::CursorShow => {
                    if cursor_tx.send(msg).await.is_err() {
                        warn!("cursor channel closed");
                    }
                }
                _ => debug!("dispatcher ignoring unexpected message"),
            }
        }
        let _ = buffer_tx.send(Message::Stop { reason: stop_reason }).await;
    }

    async fn push_frame(&mut self, buffer_tx: &mpsc::Sender<Message>) {
        let frame = self.manager.compose(self.width, self.height);
        if buffer_tx.send(Message::ScreenUpdate(frame)).await.is_err() {
            warn!("screen buffer channel closed, dropping frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::layout::LayoutNode;
    use crate::message::Key;
    use crate::widget::{TextInput, Widget};

    fn input_app() -> Dispatcher {
        let mut manager = WidgetManager::new();
        manager.add_widget(Box::new(TextInput::new("in")));
        manager.set_layout(LayoutNode::vertical().child(LayoutNode::widget("in")));
        Dispatcher::new(manager, Size::new(10, 2))
    }

    async fn next_frame(rx: &mut mpsc::Receiver<Message>) -> Grid {
        match rx.recv().await {
            Some(Message::ScreenUpdate(grid)) => grid,
            other => panic!("expected a screen update, got {other:?}"),
        }
    }

    fn row_text(grid: &Grid, y: u16) -> String {
        grid.row(y)
            .map(|r| r.iter().map(|c| c.ch).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn input_produces_update_per_message() {
        let (tx, rx) = mpsc::channel(16);
        let (buffer_tx, mut buffer_rx) = mpsc::channel(16);
        let (cursor_tx, _cursor_rx) = mpsc::channel(16);
        let task = tokio::spawn(input_app().run(rx, buffer_tx, cursor_tx));

        for ch in ['h', 'i'] {
            tx.send(Message::Input { ch, time: 0 }).await.ok();
        }
        tx.send(Message::stop()).await.ok();
        task.await.ok();

        // One update per input, reflecting the state after each message.
        let first = next_frame(&mut buffer_rx).await;
        assert!(row_text(&first, 0).starts_with('h'));
        let second = next_frame(&mut buffer_rx).await;
        assert!(row_text(&second, 0).starts_with("hi"));
        assert_eq!(buffer_rx.recv().await, Some(Message::stop()));
        assert_eq!(buffer_rx.recv().await, None);
    }

    #[tokio::test]
    async fn resize_updates_dimensions() {
        let (tx, rx) = mpsc::channel(16);
        let (buffer_tx, mut buffer_rx) = mpsc::channel(16);
        let (cursor_tx, _cursor_rx) = mpsc::channel(16);
        let task = tokio::spawn(input_app().run(rx, buffer_tx, cursor_tx));

        tx.send(Message::Resize { cols: 80, rows: 20 }).await.ok();
        tx.send(Message::stop()).await.ok();
        task.await.ok();

        let frame = next_frame(&mut buffer_rx).await;
        assert_eq!(frame.height(), 20);
        assert!(frame.rows().all(|r| r.len() == 80));
    }

    #[tokio::test]
    async fn focus_commands_rotate_focus() {
        let mut manager = WidgetManager::new();
        manager.add_widget(Box::new(TextInput::new("a")));
        manager.add_widget(Box::new(TextInput::new("b")));
        manager.set_layout(
            LayoutNode::vertical()
                .child(LayoutNode::widget("a"))
                .child(LayoutNode::widget("b")),
        );
        let dispatcher = Dispatcher::new(manager, Size::new(10, 2));

        let (tx, rx) = mpsc::channel(16);
        let (buffer_tx, mut buffer_rx) = mpsc::channel(16);
        let (cursor_tx, _cursor_rx) = mpsc::channel(16);
        let task = tokio::spawn(dispatcher.run(rx, buffer_tx, cursor_tx));

        tx.send(Message::Command {
            name: "focus_next".into(),
            payload: None,
        })
        .await
        .ok();
        // Type into the now-focused widget; only "b" receives it.
        tx.send(Message::Input { ch: 'x', time: 0 }).await.ok();
        tx.send(Message::stop()).await.ok();
        task.await.ok();

        let _after_focus = next_frame(&mut buffer_rx).await;
        let after_input = next_frame(&mut buffer_rx).await;
        assert_eq!(row_text(&after_input, 0).trim_end(), "");
        assert!(row_text(&after_input, 1).starts_with('x'));
    }

    #[tokio::test]
    async fn render_request_broadcasts_and_recomposes() {
        let mut manager = WidgetManager::new();
        manager.add_widget(Box::new(crate::widget::Spinner::new("s")));
        manager.set_layout(LayoutNode::vertical().child(LayoutNode::widget("s")));
        let dispatcher = Dispatcher::new(manager, Size::new(4, 1));

        let (tx, rx) = mpsc::channel(16);
        let (buffer_tx, mut buffer_rx) = mpsc::channel(16);
        let (cursor_tx, _cursor_rx) = mpsc::channel(16);
        let task = tokio::spawn(dispatcher.run(rx, buffer_tx, cursor_tx));

        tx.send(Message::RenderRequest {
            reason: "tick".into(),
        })
        .await
        .ok();
        tx.send(Message::RenderRequest {
            reason: "tick".into(),
        })
        .await
        .ok();
        tx.send(Message::stop()).await.ok();
        task.await.ok();

        // Two ticks produce two frames with different spinner glyphs.
        let first = next_frame(&mut buffer_rx).await;
        let second = next_frame(&mut buffer_rx).await;
        assert_ne!(
            first.get(0, 0).map(|c| c.ch),
            second.get(0, 0).map(|c| c.ch)
        );
    }

    #[tokio::test]
    async fn cursor_messages_forwarded_to_side_channel() {
        let (tx, rx) = mpsc::channel(16);
        let (buffer_tx, _buffer_rx) = mpsc::channel(16);
        let (cursor_tx, mut cursor_rx) = mpsc::channel(16);
        let task = tokio::spawn(input_app().run(rx, buffer_tx, cursor_tx));

        tx.send(Message::CursorMove { row: 1, col: 2 }).await.ok();
        tx.send(Message::CursorHide).await.ok();
        tx.send(Message::stop()).await.ok();
        task.await.ok();

        assert_eq!(
            cursor_rx.recv().await,
            Some(Message::CursorMove { row: 1, col: 2 })
        );
        assert_eq!(cursor_rx.recv().await, Some(Message::CursorHide));
    }

    #[tokio::test]
    async fn stop_forwarded_downstream_with_reason() {
        let (tx, rx) = mpsc::channel(16);
        let (buffer_tx, mut buffer_rx) = mpsc::channel(16);
        let (cursor_tx, _cursor_rx) = mpsc::channel(16);
        let task = tokio::spawn(input_app().run(rx, buffer_tx, cursor_tx));

        tx.send(Message::stop_because("test over")).await.ok();
        task.await.ok();
        assert_eq!(
            buffer_rx.recv().await,
            Some(Message::stop_because("test over"))
        );
        // Exactly one stop, then the channel closes.
        assert_eq!(buffer_rx.recv().await, None);
    }

    #[tokio::test]
    async fn closed_channel_forwards_stop() {
        let (tx, rx) = mpsc::channel::<Message>(16);
        let (buffer_tx, mut buffer_rx) = mpsc::channel(16);
        let (cursor_tx, _cursor_rx) = mpsc::channel(16);
        let task = tokio::spawn(input_app().run(rx, buffer_tx, cursor_tx));
        drop(tx);
        task.await.ok();
        assert_eq!(buffer_rx.recv().await, Some(Message::stop()));
    }
}
