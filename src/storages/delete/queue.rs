//! Bounded deletion queue and its worker pool.
//!
//! Deletion intents are absorbed into a bounded channel and consumed
//! cooperatively by the workers. Each worker accumulates a local batch and
//! flushes it when the batch fills up or the batch timer expires, grouping
//! tasks by owner so every flush is one bulk write per owner. Flush failures
//! are logged and the tasks dropped; clients may re-issue (at-most-once).

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::TombstoneSink;
use crate::storages::models::DeleteTask;

/// Queue sizing and batching knobs. The defaults match production; tests
/// shrink them to keep the clock out of the way.
#[derive(Debug, Clone)]
pub struct DeleteQueueConfig {
    /// Bounded channel capacity; tasks beyond it are dropped.
    pub capacity: usize,
    /// Number of worker tasks consuming the queue.
    pub workers: usize,
    /// Per-worker buffer size that forces a flush.
    pub batch_size: usize,
    /// Flush deadline for a non-empty, non-full buffer.
    pub batch_timeout: Duration,
}

impl Default for DeleteQueueConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            workers: 3,
            batch_size: 100,
            batch_timeout: Duration::from_secs(2),
        }
    }
}

pub struct DeleteQueue {
    /// Taken (dropped) on shutdown, which closes the channel.
    tx: StdMutex<Option<mpsc::Sender<DeleteTask>>>,
    workers: StdMutex<Vec<JoinHandle<()>>>,
}

impl DeleteQueue {
    /// Spawn the worker pool and return the queue handle.
    pub fn start(sink: Arc<dyn TombstoneSink>, config: DeleteQueueConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.capacity);
        let rx = Arc::new(Mutex::new(rx));

        let workers = (0..config.workers)
            .map(|worker_id| {
                let rx = Arc::clone(&rx);
                let sink = Arc::clone(&sink);
                let config = config.clone();
                tokio::spawn(delete_worker(worker_id, rx, sink, config))
            })
            .collect();

        Self {
            tx: StdMutex::new(Some(tx)),
            workers: StdMutex::new(workers),
        }
    }

    /// Enqueue one task per short code without blocking. When the queue is
    /// full the task is dropped with a warning; deletion is best-effort and
    /// clients may re-issue.
    pub fn enqueue(&self, owner_id: &str, short_codes: Vec<String>) {
        let Ok(guard) = self.tx.lock() else {
            warn!("Delete queue handle poisoned, dropping {} tasks", short_codes.len());
            return;
        };
        let Some(tx) = guard.as_ref() else {
            warn!("Delete queue closed, dropping {} tasks", short_codes.len());
            return;
        };

        for short_code in short_codes {
            let task = DeleteTask {
                owner_id: owner_id.to_string(),
                short_code,
            };
            match tx.try_send(task) {
                Ok(()) => {}
                Err(TrySendError::Full(task)) => {
                    warn!("Delete queue full, task dropped: {}", task.short_code);
                }
                Err(TrySendError::Closed(task)) => {
                    warn!("Delete queue closed, task dropped: {}", task.short_code);
                }
            }
        }
    }

    /// Close the queue and wait for every worker to drain its backlog and
    /// exit. Idempotent; a second call returns immediately.
    pub async fn shutdown(&self) {
        // Dropping the sender closes the channel; workers finish the backlog.
        if let Ok(mut guard) = self.tx.lock() {
            guard.take();
        }

        let handles = match self.workers.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => Vec::new(),
        };
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Delete worker exited abnormally: {}", e);
            }
        }
        info!("Delete queue drained and stopped");
    }
}

async fn delete_worker(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<DeleteTask>>>,
    sink: Arc<dyn TombstoneSink>,
    config: DeleteQueueConfig,
) {
    debug!("Delete worker {} started", worker_id);
    let mut buffer: Vec<DeleteTask> = Vec::with_capacity(config.batch_size);

    loop {
        // The timer restarts on every received task, so a trickle of tasks
        // still flushes within one batch_timeout of the last arrival.
        let received = tokio::select! {
            task = async { rx.lock().await.recv().await } => task,
            _ = sleep(config.batch_timeout) => {
                if !buffer.is_empty() {
                    flush(worker_id, sink.as_ref(), &mut buffer).await;
                }
                continue;
            }
        };

        match received {
            Some(task) => {
                buffer.push(task);
                if buffer.len() >= config.batch_size {
                    flush(worker_id, sink.as_ref(), &mut buffer).await;
                }
            }
            // Channel closed: drain what is buffered and exit.
            None => break,
        }
    }

    if !buffer.is_empty() {
        flush(worker_id, sink.as_ref(), &mut buffer).await;
    }
    debug!("Delete worker {} stopped", worker_id);
}

/// Group the buffered tasks by owner and issue one bulk write per group.
async fn flush(worker_id: usize, sink: &dyn TombstoneSink, buffer: &mut Vec<DeleteTask>) {
    let mut groups: HashMap<String, Vec<String>> = HashMap::new();
    for task in buffer.drain(..) {
        groups.entry(task.owner_id).or_default().push(task.short_code);
    }

    for (owner_id, short_codes) in groups {
        match sink.apply_tombstones(&owner_id, &short_codes).await {
            Ok(affected) => {
                debug!(
                    "Worker {}: tombstoned {} of {} urls for owner {}",
                    worker_id,
                    affected,
                    short_codes.len(),
                    owner_id
                );
            }
            Err(e) => {
                error!(
                    "Worker {}: tombstone batch failed for owner {}: {}",
                    worker_id, owner_id, e
                );
            }
        }
    }
}
