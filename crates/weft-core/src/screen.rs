//! Screen buffer: holds the previous frame and computes row diffs.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::cell::Cell;
use crate::grid::Grid;
use crate::message::{Message, RowPatch};

/// Compute the rows that differ between two frames.
///
/// Rows are compared over `0..max(prev_rows, new_rows)`; the side that
/// is missing a row contributes a blank row of the new frame's width,
/// so content that shrinks produces explicit blank-row patches. Row
/// equality is full cell equality.
pub fn changed_rows(prev: &Grid, next: &Grid) -> Vec<RowPatch> {
    let blank: Vec<Cell> = vec![Cell::blank(); usize::from(next.width())];
    let rows = prev.height().max(next.height());
    let mut patches = Vec::new();
    for y in 0..rows {
        let new_row = next.row(y).unwrap_or(&blank);
        let prev_row = prev.row(y).unwrap_or(&blank);
        if prev_row != new_row {
            patches.push(RowPatch {
                row: y,
                cells: new_row.to_vec(),
            });
        }
    }
    patches
}

/// Task holding the last successfully emitted frame.
///
/// Each [`Message::ScreenUpdate`] is diffed against the previous frame;
/// non-empty change sets go downstream as [`Message::ScreenDiff`] and
/// only then does the update replace the previous frame. Diffs are
/// emitted in strict receive order.
pub struct ScreenBuffer {
    prev: Grid,
}

impl ScreenBuffer {
    /// Create a screen buffer with an empty previous frame.
    pub fn new() -> Self {
        Self { prev: Grid::empty() }
    }

    /// Run until a stop message arrives or the channel closes, then
    /// forward the stop downstream and exit.
    pub async fn run(mut self, mut rx: mpsc::Receiver<Message>, diff_tx: mpsc::Sender<Message>) {
        let mut stop_reason = None;
        while let Some(msg) = rx.recv().await {
            match msg {
                Message::ScreenUpdate(next) => {
                    let patches = changed_rows(&self.prev, &next);
                    if patches.is_empty() {
                        continue;
                    }
                    if diff_tx.send(Message::ScreenDiff(patches)).await.is_ok() {
                        self.prev = next;
                    } else {
                        warn!("diff channel closed, dropping frame");
                    }
                }
                Message::Stop { reason } => {
                    stop_reason = reason;
                    break;
                }
                _ => debug!("screen buffer ignoring unexpected message"),
            }
        }
        let _ = diff_tx.send(Message::Stop { reason: stop_reason }).await;
    }
}

impl Default for ScreenBuffer {
    fn default() -> Self {
        Self::new()
    }
}
