//! ## irrbloss-core::queue
//! **Bounded drop-on-full handoff between capture callbacks and the
//! scheduler loop**
//!
//! The producer side runs inside the capture callback and must never block
//! or allocate beyond the item it hands over. When the consumer falls
//! behind, new items are dropped and counted rather than queued unboundedly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam::queue::ArrayQueue;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("handoff queue capacity exceeded")]
    Full,
}

pub struct HandoffQueue<T> {
    inner: Arc<Shared<T>>,
}

struct Shared<T> {
    queue: ArrayQueue<T>,
    dropped: AtomicU64,
}

impl<T> HandoffQueue<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Shared {
                queue: ArrayQueue::new(capacity),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Non-blocking enqueue. A full queue drops the item and bumps the drop
    /// counter.
    pub fn try_send(&self, item: T) -> Result<(), QueueError> {
        match self.inner.queue.push(item) {
            Ok(()) => Ok(()),
            Err(_) => {
                self.inner.dropped.fetch_add(1, Ordering::Relaxed);
                Err(QueueError::Full)
            }
        }
    }

    pub fn try_recv(&self) -> Option<T> {
        self.inner.queue.pop()
    }

    pub fn len(&self) -> usize {
        self.inner.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.queue.capacity()
    }

    /// Items rejected because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }
}

impl<T> Clone for HandoffQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_full_and_counts_drops() {
        let queue = HandoffQueue::with_capacity(2);
        queue.try_send(1u32).unwrap();
        queue.try_send(2u32).unwrap();
        assert_eq!(queue.try_send(3u32), Err(QueueError::Full));
        assert_eq!(queue.try_send(4u32), Err(QueueError::Full));
        assert_eq!(queue.dropped(), 2);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn maintains_fifo_ordering() {
        let queue = HandoffQueue::with_capacity(8);
        for i in 0..8u32 {
            queue.try_send(i).unwrap();
        }
        for i in 0..8u32 {
            assert_eq!(queue.try_recv(), Some(i));
        }
        assert!(queue.try_recv().is_none());
    }

    #[test]
    fn producer_and_consumer_share_state_through_clones() {
        let producer = HandoffQueue::with_capacity(4);
        let consumer = producer.clone();
        producer.try_send("ssid".to_string()).unwrap();
        assert_eq!(consumer.try_recv().as_deref(), Some("ssid"));
        assert!(consumer.is_empty());
    }
}
