//! Application: task wiring, supervision, and graceful shutdown.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::builder::AppBuilder;
use crate::cursor::CursorManager;
use crate::dispatch::Dispatcher;
use crate::error::{Result, WeftError};
use crate::geometry::Size;
use crate::input::InputProvider;
use crate::manager::WidgetManager;
use crate::message::Message;
use crate::renderer::{DiffRenderer, restore_terminal};
use crate::screen::ScreenBuffer;
use crate::terminal::{SharedBackend, lock};

/// How long [`RunningApp::stop`] waits for the task group to drain.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// How long stop messages may block on a congested channel before the
/// shutdown proceeds without them.
const STOP_SEND_TIMEOUT: Duration = Duration::from_millis(100);

/// A lifecycle hook registered on the builder.
pub(crate) type Hook = Box<dyn FnOnce() + Send>;

/// The input source the provider task reads from.
pub(crate) type BoxedReader = Box<dyn tokio::io::AsyncRead + Unpin + Send>;

/// A fully built application, ready to start.
///
/// Construct one through [`AppBuilder`].
pub struct App {
    pub(crate) manager: WidgetManager,
    pub(crate) backend: SharedBackend,
    pub(crate) reader: Option<BoxedReader>,
    pub(crate) tick: Option<Duration>,
    pub(crate) bracketed_paste: bool,
    pub(crate) handle_signals: bool,
    pub(crate) capacity: usize,
    pub(crate) main_tx: mpsc::Sender<Message>,
    pub(crate) main_rx: mpsc::Receiver<Message>,
    pub(crate) on_start: Vec<Hook>,
    pub(crate) on_stop: Vec<Hook>,
}

impl App {
    /// Start building an application.
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Spawn the pipeline tasks and return the running application.
    ///
    /// Five long-lived tasks are spawned (input provider, dispatcher,
    /// screen buffer, diff renderer, cursor manager) plus the optional
    /// ticker and signal hook. An initial resize message paints the
    /// first frame.
    pub async fn start(mut self) -> Result<RunningApp> {
        for hook in self.on_start.drain(..) {
            hook();
        }

        let size = lock(&self.backend).size().unwrap_or(Size::new(80, 24));
        let (buffer_tx, buffer_rx) = mpsc::channel(self.capacity);
        let (diff_tx, diff_rx) = mpsc::channel(self.capacity);
        let (cursor_tx, cursor_rx) = mpsc::channel(self.capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (stopping_tx, stopping_rx) = watch::channel(false);

        let mut tasks = JoinSet::new();

        let dispatcher = Dispatcher::new(self.manager, size);
        let main_rx = self.main_rx;
        let dispatcher_buffer = buffer_tx.clone();
        let dispatcher_cursor = cursor_tx.clone();
        tasks.spawn(async move {
            dispatcher.run(main_rx, dispatcher_buffer, dispatcher_cursor).await;
            // Tell the supervisor that the pipeline is shutting down, so
            // an organic stop also drains the side channels.
            let _ = stopping_tx.send(true);
        });

        tasks.spawn(ScreenBuffer::new().run(buffer_rx, diff_tx.clone()));
        tasks.spawn(DiffRenderer::new(self.backend.clone(), self.bracketed_paste).run(diff_rx));
        tasks.spawn(CursorManager::new(self.backend.clone()).run(cursor_rx));

        let raw_mode = lock(&self.backend).is_tty();
        let reader = self
            .reader
            .take()
            .unwrap_or_else(|| Box::new(tokio::io::stdin()));
        let provider = InputProvider::new(reader, self.backend.clone(), raw_mode);
        tasks.spawn(provider.run(self.main_tx.clone(), shutdown_rx.clone()));

        if let Some(period) = self.tick {
            tasks.spawn(run_ticker(
                period,
                self.main_tx.clone(),
                shutdown_rx.clone(),
            ));
        }
        if self.handle_signals {
            tasks.spawn(run_signal_hook(self.main_tx.clone(), shutdown_rx.clone()));
        }

        // Paint the first frame at the discovered size.
        self.main_tx
            .send(Message::Resize {
                cols: size.width,
                rows: size.height,
            })
            .await
            .map_err(|e| WeftError::Channel(e.to_string()))?;

        Ok(RunningApp {
            main_tx: self.main_tx,
            buffer_tx,
            cursor_tx,
            diff_tx,
            shutdown_tx,
            stopping_rx,
            tasks,
            backend: self.backend,
            bracketed_paste: self.bracketed_paste,
            on_stop: self.on_stop,
        })
    }
}

/// A started application: the supervisor over the pipeline tasks.
pub struct RunningApp {
    main_tx: mpsc::Sender<Message>,
    buffer_tx: mpsc::Sender<Message>,
    cursor_tx: mpsc::Sender<Message>,
    diff_tx: mpsc::Sender<Message>,
    shutdown_tx: watch::Sender<bool>,
    stopping_rx: watch::Receiver<bool>,
    tasks: JoinSet<()>,
    backend: SharedBackend,
    bracketed_paste: bool,
    on_stop: Vec<Hook>,
}

impl RunningApp {
    /// A cloneable handle for sending messages into the pipeline.
    pub fn handle(&self) -> AppHandle {
        AppHandle {
            main: self.main_tx.clone(),
            cursor: self.cursor_tx.clone(),
            diff: self.diff_tx.clone(),
        }
    }

    /// Initiate shutdown and wait for the task group to drain.
    ///
    /// Returns `true` when every task exited within
    /// [`SHUTDOWN_TIMEOUT`], `false` when the wait timed out (a warning
    /// is logged and the terminal is restored best-effort).
    pub async fn stop(mut self) -> bool {
        self.shutdown().await
    }

    /// Wait for the pipeline to stop on its own (a stop message on the
    /// main channel, input EOF, or a stop requester), then drain the
    /// task group as [`RunningApp::stop`] does.
    pub async fn wait(mut self) -> bool {
        let already_stopping = *self.stopping_rx.borrow();
        if !already_stopping {
            let _ = self.stopping_rx.changed().await;
        }
        self.shutdown().await
    }

    async fn shutdown(&mut self) -> bool {
        let _ = self.shutdown_tx.send(true);
        for tx in [&self.main_tx, &self.buffer_tx, &self.cursor_tx] {
            let send = tx.send(Message::stop());
            if timeout(STOP_SEND_TIMEOUT, send).await.is_err() {
                debug!("stop message timed out on a congested channel");
            }
        }
        let drained = timeout(SHUTDOWN_TIMEOUT, async {
            while self.tasks.join_next().await.is_some() {}
        })
        .await
        .is_ok();
        if !drained {
            warn!("shutdown timed out, aborting tasks and restoring terminal");
            self.tasks.abort_all();
            restore_terminal(&self.backend, self.bracketed_paste);
        }
        for hook in self.on_stop.drain(..) {
            hook();
        }
        drained
    }
}

/// Cloneable sender bundle for talking to a running application.
#[derive(Clone)]
pub struct AppHandle {
    main: mpsc::Sender<Message>,
    cursor: mpsc::Sender<Message>,
    diff: mpsc::Sender<Message>,
}

impl AppHandle {
    /// Send a message onto the main channel.
    pub async fn send(&self, msg: Message) -> Result<()> {
        self.main
            .send(msg)
            .await
            .map_err(|e| WeftError::Channel(e.to_string()))
    }

    /// Push a render request (e.g. to animate widgets manually).
    pub async fn request_render(&self, reason: impl Into<String>) -> Result<()> {
        self.send(Message::RenderRequest {
            reason: reason.into(),
        })
        .await
    }

    /// Ask the pipeline to stop.
    pub async fn stop(&self) -> Result<()> {
        self.send(Message::stop()).await
    }

    /// A synchronous stop handle for widget callbacks.
    pub fn stop_requester(&self) -> StopRequester {
        StopRequester {
            main: self.main.clone(),
        }
    }

    /// Move the terminal cursor (zero-based coordinates).
    pub async fn move_cursor(&self, row: u16, col: u16) -> Result<()> {
        self.cursor
            .send(Message::CursorMove { row, col })
            .await
            .map_err(|e| WeftError::Channel(e.to_string()))
    }

    /// Show the terminal cursor.
    pub async fn show_cursor(&self) -> Result<()> {
        self.cursor
            .send(Message::CursorShow)
            .await
            .map_err(|e| WeftError::Channel(e.to_string()))
    }

    /// Hide the terminal cursor.
    pub async fn hide_cursor(&self) -> Result<()> {
        self.cursor
            .send(Message::CursorHide)
            .await
            .map_err(|e| WeftError::Channel(e.to_string()))
    }

    /// Copy text to the system clipboard (OSC 52, best effort).
    pub async fn copy_to_clipboard(&self, text: impl Into<String>) -> Result<()> {
        self.diff
            .send(Message::CopyToClipboard(text.into()))
            .await
            .map_err(|e| WeftError::Channel(e.to_string()))
    }
}

/// Synchronous handle widget callbacks use to request shutdown.
///
/// Callbacks run on the dispatcher task, which is also the main
/// channel's consumer, so a blocking send from there would deadlock;
/// the request falls back to a spawned send when the channel is full.
#[derive(Clone)]
pub struct StopRequester {
    main: mpsc::Sender<Message>,
}

impl StopRequester {
    pub(crate) fn from_sender(main: mpsc::Sender<Message>) -> Self {
        Self { main }
    }

    /// Request that the application stop.
    pub fn request(&self) {
        match self.main.try_send(Message::stop()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(msg)) => {
                let tx = self.main.clone();
                tokio::spawn(async move {
                    let _ = tx.send(msg).await;
                });
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}

/// Push a render request on every tick. The ticker is the one producer
/// allowed to drop on backpressure: a congested pipeline simply skips
/// animation frames.
async fn run_ticker(
    period: Duration,
    tx: mpsc::Sender<Message>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                let msg = Message::RenderRequest { reason: "tick".into() };
                if let Err(mpsc::error::TrySendError::Closed(_)) = tx.try_send(msg) {
                    break;
                }
            }
        }
    }
}

/// Forward one interrupt as a stop message, then exit.
async fn run_signal_hook(tx: mpsc::Sender<Message>, mut shutdown: watch::Receiver<bool>) {
    tokio::select! {
        _ = shutdown.changed() => {}
        res = tokio::signal::ctrl_c() => {
            if res.is_ok() {
                debug!("interrupt received, requesting stop");
                let _ = tx.send(Message::stop_because("interrupt")).await;
            }
        }
    }
}
