//! src/provider/pool.rs
//!
//! Fixed set of worker threads feeding the bounded batch queue.
//!
//! Each worker loops: check the shutdown flag, pull a slice from the
//! catalog, resolve and augment every item, assemble the batch, push it.
//! The flag is checked once per loop iteration; an in-flight decode or
//! crop is never interrupted, so teardown completes within a bounded
//! number of iterations.
//!
//! Failure policy: the first error (a failed resolution, or a panic caught
//! at the loop boundary) is recorded on the queue's error slot and triggers
//! pool-wide shutdown; the consumer receives it on its next pull. Workers
//! never swallow an error.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::augment::Augmenter;
use crate::batch::Batch;
use crate::catalog::ItemCatalog;
use crate::error::ProviderError;
use crate::provider::queue::BatchQueue;
use crate::provider::thread::{init_worker_rng, WORKER_ID};
use crate::resolver::ImageResolver;

/// Poll interval while waiting for workers to observe shutdown.
const JOIN_POLL: Duration = Duration::from_millis(1);

pub(crate) struct WorkerPool {
    handles: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `workers` named threads over a shared catalog, resolver, and
    /// queue. On a spawn failure the partial pool is torn down before the
    /// error is returned.
    pub(crate) fn spawn<L>(
        workers: usize,
        catalog: Arc<ItemCatalog<L>>,
        resolver: Arc<ImageResolver>,
        augmenter: Augmenter,
        queue: Arc<BatchQueue<L>>,
        base_seed: u64,
    ) -> Result<Self, ProviderError>
    where
        L: Clone + Send + Sync + 'static,
    {
        let mut pool = Self {
            handles: Vec::with_capacity(workers),
        };

        for worker_id in 0..workers {
            let catalog = Arc::clone(&catalog);
            let resolver = Arc::clone(&resolver);
            let queue_for_worker = Arc::clone(&queue);

            queue.producer_started();
            let spawned = thread::Builder::new()
                .name(format!("batch-worker-{worker_id}"))
                .spawn(move || {
                    WORKER_ID.with(|id| *id.borrow_mut() = worker_id);
                    init_worker_rng(worker_id, 0, base_seed);

                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        worker_loop(worker_id, &catalog, &resolver, augmenter, &queue_for_worker)
                    }));
                    if outcome.is_err() {
                        warn!(worker_id, "worker panicked");
                        queue_for_worker
                            .record_error(ProviderError::pool(format!("worker {worker_id} panicked")));
                        queue_for_worker.shutdown();
                    }
                    queue_for_worker.producer_finished();
                });

            match spawned {
                Ok(handle) => pool.handles.push(handle),
                Err(e) => {
                    queue.producer_finished();
                    pool.shutdown_and_join(&queue);
                    return Err(ProviderError::pool(format!(
                        "failed to spawn worker thread {worker_id}: {e}"
                    )));
                }
            }
        }

        debug!(workers, "worker pool started");
        Ok(pool)
    }

    /// Requests shutdown and joins every worker, draining the queue until
    /// all of them have observed the flag and exited. Bounded even when the
    /// queue is full: each drain releases blocked producers, and each
    /// released producer exits at its next flag check.
    pub(crate) fn shutdown_and_join<L>(&mut self, queue: &BatchQueue<L>) {
        queue.shutdown();
        while !self.handles.iter().all(|handle| handle.is_finished()) {
            queue.drain();
            thread::sleep(JOIN_POLL);
        }
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
        queue.drain();
        debug!("worker pool stopped");
    }
}

fn worker_loop<L>(
    worker_id: usize,
    catalog: &ItemCatalog<L>,
    resolver: &ImageResolver,
    augmenter: Augmenter,
    queue: &BatchQueue<L>,
) where
    L: Clone,
{
    loop {
        if queue.shutdown_requested() {
            break;
        }
        let Some(slice) = catalog.next_slice() else {
            debug!(worker_id, "catalog exhausted");
            break;
        };

        let mut batch = Batch::with_capacity(slice.len());
        let mut failed = false;
        for sample in slice {
            match resolver.fetch(&sample) {
                Ok(image) => batch.push(augmenter.transform(image), sample.label),
                Err(error) => {
                    warn!(worker_id, %error, "sample resolution failed, shutting pool down");
                    queue.record_error(error);
                    queue.shutdown();
                    failed = true;
                    break;
                }
            }
        }
        if failed || !queue.put(batch) {
            break;
        }
    }
}
