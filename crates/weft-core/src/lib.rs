//! weft-core: a message-driven terminal UI framework.
//!
//! Widgets render into rectangular cell grids, a constraint-based
//! layout assigns each widget a rectangle, and a pipeline of tokio
//! tasks (input provider, dispatcher, screen buffer, diff renderer,
//! cursor manager) connected by bounded channels turns widget state
//! into minimal terminal escape sequences.
//!
//! ```no_run
//! use std::time::Duration;
//! use weft_core::{App, Constraint, Label, LayoutNode, Spinner, TextInput};
//!
//! # async fn demo() -> weft_core::Result<()> {
//! let mut builder = App::builder()
//!     .widget(Label::new("title", "weft"))
//!     .widget(Spinner::new("busy").label("working"))
//!     .layout(
//!         LayoutNode::vertical()
//!             .child(LayoutNode::widget("title").constraint(Constraint::Length(1)))
//!             .child(LayoutNode::widget("input").constraint(Constraint::Length(1)))
//!             .child(LayoutNode::widget("busy")),
//!     )
//!     .tick(Duration::from_millis(100))
//!     .handle_signals(true);
//! let stopper = builder.stop_requester();
//! let app = builder
//!     .widget(TextInput::new("input").on_submit(move |text| {
//!         if text == "quit" {
//!             stopper.request();
//!         }
//!     }))
//!     .build()?;
//! let running = app.start().await?;
//! running.wait().await;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod builder;
pub mod cell;
pub mod color;
pub mod cursor;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod layout;
pub mod manager;
pub mod message;
pub mod renderer;
pub mod screen;
pub mod style;
pub mod terminal;
pub mod widget;

pub use app::{App, AppHandle, RunningApp, SHUTDOWN_TIMEOUT, StopRequester};
pub use builder::AppBuilder;
pub use cell::Cell;
pub use color::Color;
pub use cursor::CursorManager;
pub use dispatch::Dispatcher;
pub use error::{Result, WeftError};
pub use geometry::{Point, Rect, Size};
pub use grid::Grid;
pub use input::{InputParser, InputProvider};
pub use layout::{Constraint, Direction, LayoutNode};
pub use manager::WidgetManager;
pub use message::{DEFAULT_CHANNEL_CAPACITY, Key, Message, RowPatch};
pub use renderer::DiffRenderer;
pub use screen::ScreenBuffer;
pub use style::Style;
pub use terminal::{Backend, CrosstermBackend, SharedBackend, TestBackend, TestOutput};
pub use widget::{Label, Spinner, TextInput, Widget};
