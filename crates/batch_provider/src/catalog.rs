//! src/catalog.rs
//!
//! The `ItemCatalog` owns the ordered sample list, the current shuffle order,
//! and the batch cursor. Workers call `next_slice()` concurrently; each call
//! hands out one non-overlapping slice of `batch_size` samples, or signals
//! that the catalog is exhausted.
//!
//! # Slice-snapshot correctness
//!
//! The order is stored as `Arc<[Sample<L>]>` and replaced wholesale on every
//! reshuffle, never mutated in place. A worker that grabbed a slice against
//! the previous order keeps a consistent view through its own `Arc` clone,
//! even while another worker triggers the epoch rollover. The mutex is held
//! only for index bookkeeping; materializing the slice happens after release
//! so image I/O never blocks other workers on the catalog.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::sample::Sample;

#[derive(Debug)]
pub(crate) struct ItemCatalog<L> {
    state: Mutex<CatalogState<L>>,
    batch_size: usize,
    batches_per_epoch: usize,
    cycled: bool,
    base_seed: u64,
}

#[derive(Debug)]
struct CatalogState<L> {
    /// Current epoch's order. Replaced, never mutated, on reshuffle.
    order: Arc<[Sample<L>]>,
    /// Next unissued batch index, `0..=batches_per_epoch`.
    cursor: usize,
    /// Epoch counter, used to derive the reshuffle RNG.
    epoch: usize,
    exhausted: bool,
}

impl<L: Clone> ItemCatalog<L> {
    /// Builds the catalog, shuffling `items` once with the base seed.
    ///
    /// Trailing items beyond `(items.len() / batch_size) * batch_size` are
    /// never issued. Parameter validation happens in the provider config;
    /// callers must pass `0 < batch_size <= items.len()`.
    pub(crate) fn new(mut items: Vec<Sample<L>>, batch_size: usize, cycled: bool, base_seed: u64) -> Self {
        items.shuffle(&mut StdRng::seed_from_u64(base_seed));
        let batches_per_epoch = items.len() / batch_size;
        debug!(
            total_items = items.len(),
            batches_per_epoch, cycled, "catalog ready"
        );
        Self {
            state: Mutex::new(CatalogState {
                order: items.into(),
                cursor: 0,
                epoch: 0,
                exhausted: false,
            }),
            batch_size,
            batches_per_epoch,
            cycled,
            base_seed,
        }
    }

    pub(crate) fn batches_per_epoch(&self) -> usize {
        self.batches_per_epoch
    }

    /// Hands out the next batch slice, or `None` once a one-pass catalog is
    /// exhausted. Exhaustion is control flow, not an error.
    ///
    /// In cyclic mode the epoch boundary replaces the order with a fresh
    /// permutation (seeded `base_seed + epoch`) and resets the cursor, so the
    /// stream never ends.
    pub(crate) fn next_slice(&self) -> Option<Vec<Sample<L>>> {
        let (order, index) = {
            let mut state = self.state.lock().expect("catalog lock poisoned");
            if state.exhausted {
                return None;
            }
            if state.cursor == self.batches_per_epoch {
                if !self.cycled {
                    state.exhausted = true;
                    return None;
                }
                state.epoch += 1;
                let mut items = state.order.to_vec();
                items.shuffle(&mut StdRng::seed_from_u64(
                    self.base_seed.wrapping_add(state.epoch as u64),
                ));
                state.order = items.into();
                state.cursor = 0;
                debug!(epoch = state.epoch, "reshuffled catalog order");
            }
            let index = state.cursor;
            state.cursor += 1;
            (Arc::clone(&state.order), index)
        };

        let start = index * self.batch_size;
        Some(order[start..start + self.batch_size].to_vec())
    }
}
