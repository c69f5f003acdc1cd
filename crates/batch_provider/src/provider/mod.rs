//! src/provider/mod.rs
//!
//! This module implements the batch streaming engine.
//!
//! The provider decouples expensive per-sample image work (store lookup,
//! decode, crop, flip) from the single consuming training loop, producing
//! fixed-size batches through a bounded queue.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌─────────────┐
//!                 │ ItemCatalog │ (shuffled order + batch cursor)
//!                 └──────┬──────┘
//!                        │ next_slice()
//!                        ↓
//!                 [Worker Threads] ──── ProviderConfig (batch_size, workers, ...)
//!                        │
//!                        │ per item: ImageResolver::fetch → Augmenter::transform
//!                        ↓
//!                 ┌─────────────┐
//!                 │ BatchQueue  │ (bounded, blocking put/get, drain on shutdown)
//!                 └──────┬──────┘
//!                        │
//!                        ↓
//!                 ┌─────────────┐
//!                 │ BatchStream │ (lazy iterator, teardown on exhaustion/drop)
//!                 └─────────────┘
//! ```
//!
//! # Module Structure
//!
//! ```text
//! src/provider/
//! ├── mod.rs     # Public API exports + module-level docs
//! ├── config.rs  # ProviderConfig, builder, and validation
//! ├── queue.rs   # Bounded batch queue with shutdown/drain and error slot
//! ├── pool.rs    # Worker threads: slice → resolve → augment → put
//! ├── stream.rs  # BatchProvider and the consuming BatchStream iterator
//! └── thread.rs  # Thread-local worker ID and seeded RNG
//! ```
//!
//! # Notes
//! - Batches are delivered in completion order, not catalog order; workers
//!   race. Per-batch pairing and per-epoch coverage are the guarantees.
//! - Memory held by the pipeline is O(queue_capacity x batch_size) decoded
//!   images, plus one in-flight batch per worker.
//! - The stream is not restartable; build a fresh `BatchProvider` per pass.

// Module declarations
mod config;
mod pool;
mod queue;
mod stream;
pub(crate) mod thread;

// Public re-exports
pub use config::{ProviderConfig, ProviderConfigBuilder};
pub use stream::{BatchProvider, BatchStream};

pub use thread::{init_worker_rng, worker_gen_bool, worker_gen_range, WORKER_ID, WORKER_RNG};
