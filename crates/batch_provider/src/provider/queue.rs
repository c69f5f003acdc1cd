//! src/provider/queue.rs
//!
//! Fixed-capacity FIFO decoupling worker threads from the single consumer.
//!
//! Built on a bounded crossbeam channel: `put` blocks a worker while the
//! queue is full, the consumer's poll blocks while it is empty. `shutdown`
//! is idempotent: it raises a flag observed by every worker before its next
//! `put`, then drains and discards buffered entries so a producer blocked on
//! a full queue is released. Draining, not merely closing, matters: at
//! shutdown time a worker may be parked inside `put`.
//!
//! The queue also carries the pool's error path: the first failure recorded
//! by a worker is held in a slot and handed to the consumer after the data
//! channel runs dry, so nothing fails invisibly in the background.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use crate::batch::Batch;
use crate::error::ProviderError;

/// Outcome of one consumer poll.
pub(crate) enum Pull<L> {
    /// A batch arrived.
    Batch(Batch<L>),
    /// Nothing arrived within the poll interval.
    Idle,
}

pub(crate) struct BatchQueue<L> {
    tx: Sender<Batch<L>>,
    rx: Receiver<Batch<L>>,
    shutdown: AtomicBool,
    /// Live producer count; the consumer treats zero as end-of-stream.
    producers: AtomicUsize,
    /// First worker failure; delivered to the consumer exactly once.
    error: Mutex<Option<ProviderError>>,
}

impl<L> BatchQueue<L> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self {
            tx,
            rx,
            shutdown: AtomicBool::new(false),
            producers: AtomicUsize::new(0),
            error: Mutex::new(None),
        }
    }

    /// Blocking producer-side insert. Returns `false` when shutdown has been
    /// requested and the entry was discarded instead of enqueued.
    pub(crate) fn put(&self, batch: Batch<L>) -> bool {
        if self.shutdown_requested() {
            return false;
        }
        self.tx.send(batch).is_ok()
    }

    /// Consumer-side poll with a bounded wait.
    pub(crate) fn pull(&self, poll: Duration) -> Pull<L> {
        match self.rx.recv_timeout(poll) {
            Ok(batch) => Pull::Batch(batch),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Pull::Idle,
        }
    }

    /// Requests shutdown and discards everything currently buffered. Safe to
    /// call from any thread, any number of times.
    pub(crate) fn shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            debug!("batch queue shutdown requested");
        }
        self.drain();
    }

    /// Discards buffered entries, releasing producers blocked on a full
    /// queue. Entries pushed by a producer that was already inside `put`
    /// when the flag went up are caught by the next drain.
    pub(crate) fn drain(&self) {
        while self.rx.try_recv().is_ok() {}
    }

    pub(crate) fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub(crate) fn producer_started(&self) {
        self.producers.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn producer_finished(&self) {
        self.producers.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn live_producers(&self) -> usize {
        self.producers.load(Ordering::SeqCst)
    }

    /// Records a worker failure. The first one wins; later failures are
    /// side effects of the shutdown it triggered.
    pub(crate) fn record_error(&self, error: ProviderError) {
        let mut slot = self.error.lock().expect("error slot poisoned");
        if slot.is_none() {
            *slot = Some(error);
        }
    }

    pub(crate) fn take_error(&self) -> Option<ProviderError> {
        self.error.lock().expect("error slot poisoned").take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn batch(label: u8) -> Batch<u8> {
        let mut b = Batch::with_capacity(1);
        b.push(image::RgbImage::new(1, 1), label);
        b
    }

    const POLL: Duration = Duration::from_millis(50);

    #[test]
    fn put_then_pull_round_trips() {
        let queue: BatchQueue<u8> = BatchQueue::with_capacity(4);
        assert!(queue.put(batch(3)));

        match queue.pull(POLL) {
            Pull::Batch(b) => assert_eq!(b.labels, vec![3]),
            Pull::Idle => panic!("expected a batch"),
        }
        assert!(matches!(queue.pull(Duration::from_millis(10)), Pull::Idle));
    }

    #[test]
    fn shutdown_releases_a_producer_blocked_on_full_queue() {
        let queue: Arc<BatchQueue<u8>> = Arc::new(BatchQueue::with_capacity(1));
        assert!(queue.put(batch(0)));

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                queue.producer_started();
                // Queue is full: this blocks until shutdown drains it.
                let accepted = queue.put(batch(1));
                queue.producer_finished();
                accepted
            })
        };

        thread::sleep(Duration::from_millis(50));
        queue.shutdown();
        producer.join().unwrap();

        assert_eq!(queue.live_producers(), 0);
        // Post-shutdown entries are discarded.
        queue.drain();
        assert!(!queue.put(batch(2)));
        assert!(matches!(queue.pull(Duration::from_millis(10)), Pull::Idle));
    }

    #[test]
    fn shutdown_is_idempotent() {
        let queue: BatchQueue<u8> = BatchQueue::with_capacity(2);
        queue.put(batch(0));
        queue.shutdown();
        queue.shutdown();
        assert!(queue.shutdown_requested());
        assert!(matches!(queue.pull(Duration::from_millis(10)), Pull::Idle));
    }

    #[test]
    fn first_error_wins() {
        let queue: BatchQueue<u8> = BatchQueue::with_capacity(2);
        queue.record_error(ProviderError::pool("first"));
        queue.record_error(ProviderError::pool("second"));

        match queue.take_error() {
            Some(ProviderError::Pool { message }) => assert_eq!(message, "first"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(queue.take_error().is_none());
    }
}
