//! Deletion pipeline behavior against recording sinks.
//!
//! These run on the single-threaded test runtime: worker tasks only make
//! progress at await points, which makes the overflow test deterministic.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use shortener::errors::{Result, ShortenerError};
use shortener::storages::delete::{DeleteQueue, DeleteQueueConfig, TombstoneSink};

/// Records every flushed batch.
#[derive(Default)]
struct RecordingSink {
    batches: Mutex<Vec<(String, Vec<String>)>>,
}

#[async_trait]
impl TombstoneSink for RecordingSink {
    async fn apply_tombstones(&self, owner_id: &str, short_codes: &[String]) -> Result<u64> {
        self.batches
            .lock()
            .unwrap()
            .push((owner_id.to_string(), short_codes.to_vec()));
        Ok(short_codes.len() as u64)
    }
}

impl RecordingSink {
    fn batches(&self) -> Vec<(String, Vec<String>)> {
        self.batches.lock().unwrap().clone()
    }

    fn applied_codes(&self) -> Vec<String> {
        self.batches()
            .into_iter()
            .flat_map(|(_, codes)| codes)
            .collect()
    }
}

fn codes(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}{:04}", prefix, i)).collect()
}

#[tokio::test]
async fn flushes_on_batch_timeout() {
    let sink = Arc::new(RecordingSink::default());
    let queue = DeleteQueue::start(
        sink.clone(),
        DeleteQueueConfig {
            capacity: 16,
            workers: 1,
            batch_size: 100,
            batch_timeout: Duration::from_millis(50),
        },
    );

    queue.enqueue("u-1", codes("a", 3));
    sleep(Duration::from_millis(250)).await;

    let mut applied = sink.applied_codes();
    applied.sort();
    assert_eq!(applied, codes("a", 3));

    queue.shutdown().await;
}

#[tokio::test]
async fn flushes_when_batch_fills_without_waiting_for_timer() {
    let sink = Arc::new(RecordingSink::default());
    let queue = DeleteQueue::start(
        sink.clone(),
        DeleteQueueConfig {
            capacity: 16,
            workers: 1,
            batch_size: 5,
            batch_timeout: Duration::from_secs(600),
        },
    );

    queue.enqueue("u-1", codes("a", 5));
    sleep(Duration::from_millis(100)).await;

    assert_eq!(sink.applied_codes().len(), 5);
    queue.shutdown().await;
}

#[tokio::test]
async fn groups_tasks_by_owner() {
    let sink = Arc::new(RecordingSink::default());
    let queue = DeleteQueue::start(
        sink.clone(),
        DeleteQueueConfig {
            capacity: 16,
            workers: 1,
            batch_size: 100,
            batch_timeout: Duration::from_secs(600),
        },
    );

    queue.enqueue("u-a", vec!["a1".to_string(), "a2".to_string()]);
    queue.enqueue("u-b", vec!["b1".to_string()]);
    queue.enqueue("u-a", vec!["a3".to_string()]);
    queue.shutdown().await;

    let batches = sink.batches();
    // One bulk write per owner group.
    assert_eq!(batches.len(), 2);

    for (owner, group) in &batches {
        match owner.as_str() {
            "u-a" => {
                let mut group = group.clone();
                group.sort();
                assert_eq!(group, vec!["a1", "a2", "a3"]);
            }
            "u-b" => assert_eq!(group, &vec!["b1".to_string()]),
            other => panic!("unexpected owner group: {}", other),
        }
    }
}

#[tokio::test]
async fn overflow_drops_tasks_without_blocking() {
    let sink = Arc::new(RecordingSink::default());
    let queue = DeleteQueue::start(
        sink.clone(),
        DeleteQueueConfig {
            capacity: 8,
            workers: 1,
            batch_size: 8,
            batch_timeout: Duration::from_secs(600),
        },
    );

    // The enqueue loop never yields, so the worker cannot drain the channel
    // mid-call: exactly the first 8 tasks are accepted, the rest dropped.
    queue.enqueue("u-1", codes("a", 100));
    queue.shutdown().await;

    assert_eq!(sink.applied_codes(), codes("a", 8));
}

#[tokio::test]
async fn shutdown_drains_accepted_tasks() {
    let sink = Arc::new(RecordingSink::default());
    let queue = DeleteQueue::start(
        sink.clone(),
        DeleteQueueConfig {
            capacity: 100,
            workers: 3,
            batch_size: 100,
            batch_timeout: Duration::from_secs(600),
        },
    );

    queue.enqueue("u-1", codes("a", 40));
    queue.shutdown().await;

    let mut applied = sink.applied_codes();
    applied.sort();
    assert_eq!(applied, codes("a", 40));
}

#[tokio::test]
async fn enqueue_after_shutdown_is_dropped() {
    let sink = Arc::new(RecordingSink::default());
    let queue = DeleteQueue::start(
        sink.clone(),
        DeleteQueueConfig {
            capacity: 16,
            workers: 2,
            batch_size: 100,
            batch_timeout: Duration::from_secs(600),
        },
    );

    queue.shutdown().await;
    queue.enqueue("u-1", codes("a", 3));

    assert!(sink.applied_codes().is_empty());
}

#[tokio::test]
async fn flush_failures_are_swallowed_and_do_not_stop_the_worker() {
    /// Fails the first flush, records the rest.
    struct FlakySink {
        failed_once: Mutex<bool>,
        inner: RecordingSink,
    }

    #[async_trait]
    impl TombstoneSink for FlakySink {
        async fn apply_tombstones(&self, owner_id: &str, short_codes: &[String]) -> Result<u64> {
            {
                let mut failed = self.failed_once.lock().unwrap();
                if !*failed {
                    *failed = true;
                    return Err(ShortenerError::storage("connection reset"));
                }
            }
            self.inner.apply_tombstones(owner_id, short_codes).await
        }
    }

    let sink = Arc::new(FlakySink {
        failed_once: Mutex::new(false),
        inner: RecordingSink::default(),
    });
    let queue = DeleteQueue::start(
        sink.clone(),
        DeleteQueueConfig {
            capacity: 16,
            workers: 1,
            batch_size: 2,
            batch_timeout: Duration::from_secs(600),
        },
    );

    queue.enqueue("u-1", codes("a", 2));
    sleep(Duration::from_millis(50)).await;
    // First batch was dropped on the floor (at-most-once), worker still alive.
    queue.enqueue("u-1", codes("b", 2));
    queue.shutdown().await;

    assert_eq!(sink.inner.applied_codes(), codes("b", 2));
}
