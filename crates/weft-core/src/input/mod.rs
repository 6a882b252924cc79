//! Input provider: raw terminal reader and byte parser.

pub mod parser;

pub use parser::InputParser;

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::message::Message;
use crate::terminal::{SharedBackend, lock};

/// Sleep between polls when the input would block.
const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Reads raw bytes from an input source and forwards parsed messages.
///
/// The provider emits exactly one [`Message::Stop`] when the input
/// reaches end-of-file or fails fatally. A shutdown signal on the watch
/// channel ends the task without a stop message (the stop procedure has
/// already sent one). When `raw_mode` is set, the terminal is switched
/// to byte-at-a-time mode for the lifetime of the task and restored on
/// the way out.
pub struct InputProvider<R> {
    reader: R,
    backend: SharedBackend,
    raw_mode: bool,
}

impl<R: AsyncRead + Unpin + Send> InputProvider<R> {
    /// Create a provider over an input source.
    pub fn new(reader: R, backend: SharedBackend, raw_mode: bool) -> Self {
        Self {
            reader,
            backend,
            raw_mode,
        }
    }

    /// Run the reader until EOF, fatal error, or shutdown.
    pub async fn run(mut self, tx: mpsc::Sender<Message>, mut shutdown: watch::Receiver<bool>) {
        if self.raw_mode {
            if let Err(e) = lock(&self.backend).enter_raw_mode() {
                warn!(error = %e, "failed to enter raw mode");
            }
        }

        let stop_reason = self.read_loop(&tx, &mut shutdown).await;

        if self.raw_mode {
            if let Err(e) = lock(&self.backend).exit_raw_mode() {
                warn!(error = %e, "failed to restore terminal mode");
            }
        }

        if let Some(reason) = stop_reason {
            debug!(reason = reason.as_str(), "input provider stopping");
            let _ = tx.send(Message::stop_because(reason)).await;
        }
    }

    /// Returns the stop reason, or `None` when shutdown was requested
    /// externally or the channel is gone.
    async fn read_loop(
        &mut self,
        tx: &mpsc::Sender<Message>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Option<String> {
        let mut parser = InputParser::new();
        let mut chunk = [0u8; 1024];
        loop {
            tokio::select! {
                _ = shutdown.changed() => return None,
                read = self.reader.read(&mut chunk) => match read {
                    Ok(0) => {
                        for msg in parser.finish() {
                            if tx.send(msg).await.is_err() {
                                return None;
                            }
                        }
                        return Some("input closed".into());
                    }
                    Ok(n) => {
                        for msg in parser.feed(&chunk[..n]) {
                            if tx.send(msg).await.is_err() {
                                return None;
                            }
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        tokio::time::sleep(POLL_INTERVAL).await;
                    }
                    Err(e) => return Some(format!("input error: {e}")),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Key;
    use crate::terminal::{TestBackend, shared};

    fn test_backend() -> SharedBackend {
        shared(Box::new(TestBackend::new(80, 24)))
    }

    async fn collect(rx: &mut mpsc::Receiver<Message>) -> Vec<Message> {
        let mut out = Vec::new();
        while let Some(msg) = rx.recv().await {
            out.push(msg);
        }
        out
    }

    #[tokio::test]
    async fn emits_events_then_one_stop_at_eof() {
        let (tx, mut rx) = mpsc::channel(16);
        let (_sd_tx, sd_rx) = watch::channel(false);
        let provider = InputProvider::new(&b"ab"[..], test_backend(), false);
        provider.run(tx, sd_rx).await;
        let out = collect(&mut rx).await;
        assert_eq!(
            out,
            vec![
                Message::Input { ch: 'a', time: 0 },
                Message::Input { ch: 'b', time: 0 },
                Message::stop_because("input closed"),
            ]
        );
    }

    #[tokio::test]
    async fn paste_bytes_produce_one_paste_event() {
        let (tx, mut rx) = mpsc::channel(16);
        let (_sd_tx, sd_rx) = watch::channel(false);
        let provider = InputProvider::new(&b"\x1b[200~hi\x1b[201~"[..], test_backend(), false);
        provider.run(tx, sd_rx).await;
        let out = collect(&mut rx).await;
        assert_eq!(
            out,
            vec![
                Message::Paste("hi".into()),
                Message::stop_because("input closed"),
            ]
        );
    }

    #[tokio::test]
    async fn escape_sequences_become_keys() {
        let (tx, mut rx) = mpsc::channel(16);
        let (_sd_tx, sd_rx) = watch::channel(false);
        let provider = InputProvider::new(&b"\x1b[A"[..], test_backend(), false);
        provider.run(tx, sd_rx).await;
        let out = collect(&mut rx).await;
        assert_eq!(out[0], Message::Key(Key::Up));
    }

    #[tokio::test]
    async fn shutdown_ends_task_without_stop() {
        let (tx, mut rx) = mpsc::channel(16);
        let (sd_tx, sd_rx) = watch::channel(false);
        // A duplex stream never reaches EOF while the write half lives.
        let (writer, reader) = tokio::io::duplex(64);
        let provider = InputProvider::new(reader, test_backend(), false);
        let task = tokio::spawn(provider.run(tx, sd_rx));
        sd_tx.send(true).ok();
        task.await.ok();
        drop(writer);
        assert!(collect(&mut rx).await.is_empty());
    }

    #[tokio::test]
    async fn raw_mode_entered_and_restored() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct ProbeBackend {
            entered: Arc<AtomicUsize>,
            exited: Arc<AtomicUsize>,
        }

        impl crate::terminal::Backend for ProbeBackend {
            fn size(&self) -> crate::error::Result<crate::geometry::Size> {
                Ok(crate::geometry::Size::new(80, 24))
            }
            fn is_tty(&self) -> bool {
                true
            }
            fn write(&mut self, _data: &[u8]) -> crate::error::Result<()> {
                Ok(())
            }
            fn flush(&mut self) -> crate::error::Result<()> {
                Ok(())
            }
            fn enter_raw_mode(&mut self) -> crate::error::Result<()> {
                self.entered.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            fn exit_raw_mode(&mut self) -> crate::error::Result<()> {
                self.exited.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let entered = Arc::new(AtomicUsize::new(0));
        let exited = Arc::new(AtomicUsize::new(0));
        let backend = shared(Box::new(ProbeBackend {
            entered: Arc::clone(&entered),
            exited: Arc::clone(&exited),
        }));
        let (tx, _rx) = mpsc::channel(16);
        let (_sd_tx, sd_rx) = watch::channel(false);
        let provider = InputProvider::new(&b""[..], backend, true);
        provider.run(tx, sd_rx).await;
        assert_eq!(entered.load(Ordering::SeqCst), 1);
        assert_eq!(exited.load(Ordering::SeqCst), 1);
    }
}
