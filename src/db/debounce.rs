//! Debounced, fire-and-forget writes for a single storage key.
//!
//! Values scheduled within the debounce window of each other collapse into
//! one write of the most recent value. Write failures are logged and dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{Database, PersistenceError};

enum Command {
    Put(String),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background writer task for one key.
#[derive(Debug)]
pub struct DebouncedWriter {
    key: String,
    tx: mpsc::UnboundedSender<Command>,
    committed: Arc<AtomicU64>,
}

impl DebouncedWriter {
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn(db: Database, key: impl Into<String>, window: Duration) -> Self {
        let key = key.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let committed = Arc::new(AtomicU64::new(0));

        tokio::spawn(run_writer(db, key.clone(), window, rx, committed.clone()));

        Self { key, tx, committed }
    }

    /// Queue a value for writing. Never blocks.
    pub fn schedule(&self, value: String) {
        if self.tx.send(Command::Put(value)).is_err() {
            warn!(key = %self.key, "Persistence task stopped, dropping write");
        }
    }

    /// Write any pending value now and wait for it to finish.
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        let stopped = || PersistenceError::WriterStopped(self.key.clone());

        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx.send(Command::Flush(ack_tx)).map_err(|_| stopped())?;
        ack_rx.await.map_err(|_| stopped())
    }

    /// Number of values successfully written so far.
    pub fn writes_committed(&self) -> u64 {
        self.committed.load(Ordering::Relaxed)
    }
}

async fn run_writer(
    db: Database,
    key: String,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
    committed: Arc<AtomicU64>,
) {
    let mut pending: Option<String> = None;

    loop {
        let command = if pending.is_some() {
            match timeout(window, rx.recv()).await {
                Ok(command) => command,
                Err(_) => {
                    write_pending(&db, &key, pending.take(), &committed).await;
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match command {
            Some(Command::Put(value)) => {
                if pending.replace(value).is_some() {
                    debug!(key = %key, "Coalesced pending write");
                }
            }
            Some(Command::Flush(ack)) => {
                write_pending(&db, &key, pending.take(), &committed).await;
                let _ = ack.send(());
            }
            None => {
                write_pending(&db, &key, pending.take(), &committed).await;
                break;
            }
        }
    }
}

async fn write_pending(db: &Database, key: &str, value: Option<String>, committed: &AtomicU64) {
    let Some(value) = value else {
        return;
    };

    match db.set(key, &value).await {
        Ok(()) => {
            committed.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, bytes = value.len(), "Persisted value");
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to persist value");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(30);

    async fn writer() -> (Database, DebouncedWriter) {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let writer = DebouncedWriter::spawn(db.clone(), "k", WINDOW);
        (db, writer)
    }

    #[tokio::test]
    async fn test_burst_coalesces_to_last_value() {
        let (db, writer) = writer().await;
        writer.schedule("a".to_string());
        writer.schedule("b".to_string());
        writer.schedule("c".to_string());

        writer.flush().await.unwrap();

        assert_eq!(writer.writes_committed(), 1);
        assert_eq!(db.get("k").await.unwrap().as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_write_lands_after_window() {
        let (db, writer) = writer().await;
        writer.schedule("later".to_string());
        assert_eq!(writer.writes_committed(), 0);

        tokio::time::sleep(WINDOW * 10).await;

        assert_eq!(writer.writes_committed(), 1);
        assert_eq!(db.get("k").await.unwrap().as_deref(), Some("later"));
    }

    #[tokio::test]
    async fn test_separate_bursts_write_separately() {
        let (db, writer) = writer().await;
        writer.schedule("first".to_string());
        tokio::time::sleep(WINDOW * 10).await;
        writer.schedule("second".to_string());
        writer.flush().await.unwrap();

        assert_eq!(writer.writes_committed(), 2);
        assert_eq!(db.get("k").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_flush_without_pending_is_noop() {
        let (_db, writer) = writer().await;
        tokio_test::assert_ok!(writer.flush().await);
        assert_eq!(writer.writes_committed(), 0);
    }

    #[tokio::test]
    async fn test_failed_write_is_swallowed() {
        let (db, writer) = writer().await;
        db.close().await;

        writer.schedule("lost".to_string());
        tokio_test::assert_ok!(writer.flush().await);
        assert_eq!(writer.writes_committed(), 0);

        // The task keeps serving after a failure.
        writer.schedule("also lost".to_string());
        tokio_test::assert_ok!(writer.flush().await);
    }
}
