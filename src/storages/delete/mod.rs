//! Asynchronous soft-delete pipeline.
//!
//! Deletion intents flow through a bounded queue into a small worker pool
//! that batches them and applies ownership-scoped tombstones through a
//! [`TombstoneSink`]. The relational backend owns the only production sink.

pub mod queue;
pub mod sink;

pub use queue::{DeleteQueue, DeleteQueueConfig};
pub use sink::TombstoneSink;
