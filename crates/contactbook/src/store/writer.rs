//! Background snapshot writer.
//!
//! Snapshots are queued on an unbounded channel and written to the blob
//! store by a dedicated thread, in the order they were submitted. Submitting
//! never blocks. A failed write is logged and counted; the caller is never
//! told about it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::error::Result;
use crate::storage::BlobStore;

#[derive(Debug)]
enum Command {
    Write(String),
    Flush(oneshot::Sender<()>),
}

#[derive(Debug, Default)]
struct WriterStats {
    failed: AtomicU64,
}

/// Handle to the snapshot writer thread.
///
/// Dropping the handle closes the queue and waits for pending writes.
#[derive(Debug)]
pub struct SnapshotWriter {
    tx: Option<mpsc::UnboundedSender<Command>>,
    handle: Option<JoinHandle<()>>,
    stats: Arc<WriterStats>,
}

impl SnapshotWriter {
    /// Start a writer that stores snapshots under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer thread cannot be spawned.
    pub fn spawn(blob: Arc<dyn BlobStore>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<Command>();
        let stats = Arc::new(WriterStats::default());
        let thread_stats = Arc::clone(&stats);

        let handle = std::thread::Builder::new()
            .name("snapshot-writer".to_string())
            .spawn(move || {
                while let Some(command) = rx.blocking_recv() {
                    match command {
                        Command::Write(snapshot) => match blob.set(&key, &snapshot) {
                            Ok(()) => debug!("Persisted snapshot under '{}'", key),
                            Err(e) => {
                                thread_stats.failed.fetch_add(1, Ordering::SeqCst);
                                error!("Failed to persist snapshot under '{}': {}", key, e);
                            }
                        },
                        Command::Flush(done) => {
                            let _ = done.send(());
                        }
                    }
                }
                debug!("Snapshot writer for '{}' stopped", key);
            })?;

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            stats,
        })
    }

    /// Queue a snapshot for writing.
    pub fn submit(&self, snapshot: String) {
        let sent = self
            .tx
            .as_ref()
            .is_some_and(|tx| tx.send(Command::Write(snapshot)).is_ok());
        if !sent {
            self.stats.failed.fetch_add(1, Ordering::SeqCst);
            error!("Snapshot writer is not running; snapshot dropped");
        }
    }

    /// Block until every snapshot submitted so far has been attempted.
    pub fn flush(&self) {
        let Some(tx) = &self.tx else { return };
        let (done_tx, done_rx) = oneshot::channel();
        if tx.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.blocking_recv();
        }
    }

    /// Number of snapshots that failed to persist.
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.stats.failed.load(Ordering::SeqCst)
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Snapshot writer thread panicked");
            }
        }
    }
}
