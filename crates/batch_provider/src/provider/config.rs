//! src/provider/config.rs
//!
//! Configuration for provider behaviour.
//!
//! Example:
//! ```ignore
//! let config = ProviderConfig::builder()
//!     .batch_size(32)
//!     .workers(16)
//!     .cycled(true)
//!     .target_width(224)
//!     .target_height(224)
//!     .seed(42)
//!     .build();
//! ```
//!
//! Every parameter is validated at construction; an invalid combination is a
//! `Config` error before any worker thread starts.

use std::path::PathBuf;

use crate::augment::AugmentMode;
use crate::error::ProviderError;

/// Configuration for a `BatchProvider`.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Number of samples per batch (must be > 0 and <= the item count).
    pub batch_size: usize,
    /// Number of worker threads resolving and augmenting samples (must be > 0).
    pub workers: usize,
    /// Cyclic mode: reshuffle and restart indefinitely after each epoch.
    /// One-pass mode terminates after `items.len() / batch_size` batches.
    pub cycled: bool,
    /// Output width of every image in a batch.
    pub target_width: u32,
    /// Output height of every image in a batch.
    pub target_height: u32,
    /// Path to the read-only blob store; required iff payloads are keyed.
    pub store_path: Option<PathBuf>,
    /// Base seed for the construction shuffle, per-epoch reshuffles, and
    /// worker augmentation RNGs. Random when unset.
    pub seed: Option<u64>,
    /// Capacity of the bounded batch queue between workers and consumer.
    pub queue_capacity: usize,
    /// Augmentation override. Defaults to training policy when cycled,
    /// evaluation policy otherwise.
    pub mode: Option<AugmentMode>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            workers: 1,
            cycled: false,
            target_width: 224,
            target_height: 224,
            store_path: None,
            seed: None,
            queue_capacity: 16,
            mode: None,
        }
    }
}

impl ProviderConfig {
    pub fn builder() -> ProviderConfigBuilder {
        ProviderConfigBuilder::default()
    }

    /// Augmentation policy after applying the default coupling to `cycled`.
    pub(crate) fn effective_mode(&self) -> AugmentMode {
        self.mode.unwrap_or(if self.cycled {
            AugmentMode::Train
        } else {
            AugmentMode::Eval
        })
    }

    /// Validates the configuration against the item list it will serve.
    /// `keyed` says whether payloads reference the blob store.
    pub(crate) fn validate(&self, item_count: usize, keyed: bool) -> Result<(), ProviderError> {
        if item_count == 0 {
            return Err(ProviderError::config("item list must not be empty"));
        }
        if self.batch_size == 0 {
            return Err(ProviderError::config("batch_size must be > 0"));
        }
        if self.batch_size > item_count {
            return Err(ProviderError::config(format!(
                "batch_size ({}) exceeds item count ({item_count}); not even one batch per epoch",
                self.batch_size
            )));
        }
        if self.workers == 0 {
            return Err(ProviderError::config("workers must be > 0"));
        }
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ProviderError::config(format!(
                "target dimensions must be positive (got {}x{})",
                self.target_width, self.target_height
            )));
        }
        if self.queue_capacity == 0 {
            return Err(ProviderError::config("queue_capacity must be > 0"));
        }
        if keyed && self.store_path.is_none() {
            return Err(ProviderError::config(
                "store_path is required when payloads are store keys",
            ));
        }
        Ok(())
    }
}

/// Builder for `ProviderConfig` with method chaining.
#[derive(Default)]
pub struct ProviderConfigBuilder {
    config: ProviderConfig,
}

impl ProviderConfigBuilder {
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn cycled(mut self, cycled: bool) -> Self {
        self.config.cycled = cycled;
        self
    }

    pub fn target_width(mut self, width: u32) -> Self {
        self.config.target_width = width;
        self
    }

    pub fn target_height(mut self, height: u32) -> Self {
        self.config.target_height = height;
        self
    }

    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store_path = Some(path.into());
        self
    }

    /// Set the base seed for reproducible shuffles and augmentation.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the bounded queue capacity between workers and the consumer.
    /// Larger values smooth bursts but hold more decoded batches in memory.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Override the augmentation policy independently of `cycled`.
    pub fn mode(mut self, mode: AugmentMode) -> Self {
        self.config.mode = Some(mode);
        self
    }

    pub fn build(self) -> ProviderConfig {
        self.config
    }
}
