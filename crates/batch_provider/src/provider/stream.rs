//! src/provider/stream.rs
//!
//! Consumer-facing façade: `BatchProvider` validates construction and owns
//! the catalog/resolver pair; `into_batches()` turns it into a lazy
//! `BatchStream`, an iterator of `Result<Batch, ProviderError>`.
//!
//! The worker pool is spawned on the first `next()` call, not at
//! construction. On normal exhaustion (one-pass mode), on the first worker
//! failure, or on early termination by the consumer (explicit `close()` or
//! drop), the stream shuts the queue down, waits for every worker to observe
//! the flag and exit, and releases the store handle. A terminated stream
//! yields `None` forever; a fresh pass needs a fresh `BatchProvider`.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::augment::Augmenter;
use crate::batch::Batch;
use crate::catalog::ItemCatalog;
use crate::error::ProviderError;
use crate::provider::config::ProviderConfig;
use crate::provider::pool::WorkerPool;
use crate::provider::queue::{BatchQueue, Pull};
use crate::resolver::ImageResolver;
use crate::sample::{Payload, Sample};
use crate::store::BlobStore;

/// Consumer poll interval on the batch queue.
const QUEUE_POLL: Duration = Duration::from_millis(100);

/// Owns everything needed to stream batches from an item list.
///
/// # Example
/// ```ignore
/// let config = ProviderConfig::builder()
///     .batch_size(32)
///     .workers(16)
///     .cycled(true)
///     .store_path("data/imagenet")
///     .build();
///
/// let provider = BatchProvider::new(items, config)?;
/// for batch in provider.into_batches() {
///     let batch = batch?;
///     // batch.images[i] pairs with batch.labels[i]
/// }
/// ```
#[derive(Debug)]
pub struct BatchProvider<L> {
    catalog: ItemCatalog<L>,
    resolver: ImageResolver,
    augmenter: Augmenter,
    workers: usize,
    queue_capacity: usize,
    base_seed: u64,
}

impl<L> BatchProvider<L>
where
    L: Clone + Send + Sync + 'static,
{
    /// Validates the configuration against `items`, opens the blob store if
    /// payloads are keyed, and shuffles the items once. No worker starts
    /// until the stream is first consumed.
    pub fn new(items: Vec<Sample<L>>, config: ProviderConfig) -> Result<Self, ProviderError> {
        let keyed = matches!(
            items.first().map(|sample| &sample.payload),
            Some(Payload::Key(_))
        );
        config.validate(items.len(), keyed)?;

        let mode = config.effective_mode();
        let resolver = if keyed {
            match &config.store_path {
                Some(path) => ImageResolver::store_backed(
                    BlobStore::open(path)?,
                    config.target_width,
                    config.target_height,
                    mode,
                ),
                None => {
                    return Err(ProviderError::config(
                        "store_path is required when payloads are store keys",
                    ))
                }
            }
        } else {
            ImageResolver::in_memory(config.target_width, config.target_height)
        };

        let base_seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let catalog = ItemCatalog::new(items, config.batch_size, config.cycled, base_seed);

        Ok(Self {
            catalog,
            resolver,
            augmenter: Augmenter::new(mode),
            workers: config.workers,
            queue_capacity: config.queue_capacity,
            base_seed,
        })
    }

    /// Number of batches one epoch yields; the stream's total length in
    /// one-pass mode.
    pub fn batches_per_epoch(&self) -> usize {
        self.catalog.batches_per_epoch()
    }

    /// Consumes the provider and returns the lazy batch sequence. Consuming
    /// by value is what makes a finished stream non-restartable.
    pub fn into_batches(self) -> BatchStream<L> {
        BatchStream {
            startup: Some(Startup {
                catalog: self.catalog,
                resolver: self.resolver,
                augmenter: self.augmenter,
                workers: self.workers,
                queue_capacity: self.queue_capacity,
                base_seed: self.base_seed,
            }),
            queue: None,
            pool: None,
            finished: false,
        }
    }
}

/// Pieces held until the first `next()` call spawns the pool.
struct Startup<L> {
    catalog: ItemCatalog<L>,
    resolver: ImageResolver,
    augmenter: Augmenter,
    workers: usize,
    queue_capacity: usize,
    base_seed: u64,
}

/// Lazy sequence of batches. Finite in one-pass mode, unbounded in cyclic
/// mode. Batches arrive in completion order: workers race, so ordering
/// across an epoch is unspecified.
pub struct BatchStream<L> {
    startup: Option<Startup<L>>,
    queue: Option<Arc<BatchQueue<L>>>,
    pool: Option<WorkerPool>,
    finished: bool,
}

impl<L> BatchStream<L> {
    /// Tears the pool down and releases the store handle. Idempotent, and
    /// always safe to call; iteration after `close()` yields `None`.
    pub fn close(&mut self) {
        self.startup = None;
        if let (Some(mut pool), Some(queue)) = (self.pool.take(), self.queue.as_ref()) {
            pool.shutdown_and_join(queue);
            debug!("batch stream closed");
        }
        self.queue = None;
        self.finished = true;
    }
}

impl<L> BatchStream<L>
where
    L: Clone + Send + Sync + 'static,
{
    fn start(&mut self) -> Result<(), ProviderError> {
        let startup = match self.startup.take() {
            Some(startup) => startup,
            None => return Err(ProviderError::pool("stream already started")),
        };

        let queue = Arc::new(BatchQueue::with_capacity(startup.queue_capacity));
        let pool = WorkerPool::spawn(
            startup.workers,
            Arc::new(startup.catalog),
            Arc::new(startup.resolver),
            startup.augmenter,
            Arc::clone(&queue),
            startup.base_seed,
        )?;

        self.queue = Some(queue);
        self.pool = Some(pool);
        Ok(())
    }
}

impl<L> Iterator for BatchStream<L>
where
    L: Clone + Send + Sync + 'static,
{
    type Item = Result<Batch<L>, ProviderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.queue.is_none() {
            if let Err(error) = self.start() {
                self.finished = true;
                return Some(Err(error));
            }
        }
        let queue = match &self.queue {
            Some(queue) => Arc::clone(queue),
            None => {
                self.finished = true;
                return None;
            }
        };

        loop {
            match queue.pull(QUEUE_POLL) {
                Pull::Batch(batch) => {
                    if queue.shutdown_requested() {
                        // A failure raced this entry into the queue; it is
                        // part of the drained backlog, not the stream.
                        continue;
                    }
                    return Some(Ok(batch));
                }
                Pull::Idle => {
                    if queue.live_producers() == 0 {
                        break;
                    }
                }
            }
        }

        // All workers have exited: either the catalog ran dry (one-pass
        // mode) or a failure shut the pool down. Join and report.
        self.close();
        queue.take_error().map(Err)
    }
}

impl<L> Drop for BatchStream<L> {
    fn drop(&mut self) {
        self.close();
    }
}
