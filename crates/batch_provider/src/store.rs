//! Read-only key→bytes store backing keyed payloads.
//!
//! The store is opened once, before any worker starts, and the handle is
//! owned by the resolver for the provider's whole lifetime. No writer ever
//! runs concurrently with the provider, so unsynchronized concurrent reads
//! are safe. Keys are the ASCII bytes of the sample's key string; values are
//! encoded image blobs.

use rocksdb::{IteratorMode, Options, DB};
use std::path::Path;

use crate::error::ProviderError;

#[derive(Debug)]
pub struct BlobStore {
    db: DB,
}

impl BlobStore {
    /// Opens the store read-only. The path must exist and the store must be
    /// non-empty; both are construction-time failures, not fetch-time ones.
    pub fn open(path: &Path) -> Result<Self, ProviderError> {
        if !path.exists() {
            return Err(ProviderError::config(format!(
                "store path does not exist: {}",
                path.display()
            )));
        }

        let opts = Options::default();
        let db = DB::open_for_read_only(&opts, path, false).map_err(|e| {
            ProviderError::config(format!("failed to open store at {}: {e}", path.display()))
        })?;

        // Probe the first key so an empty store fails fast.
        match db.iterator(IteratorMode::Start).next() {
            Some(Ok(_)) => Ok(Self { db }),
            Some(Err(e)) => Err(ProviderError::config(format!(
                "failed to read store at {}: {e}",
                path.display()
            ))),
            None => Err(ProviderError::config(format!(
                "store at {} is empty",
                path.display()
            ))),
        }
    }

    /// Looks up the blob for `key`. `Ok(None)` means the key is absent;
    /// the caller decides what a miss means.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ProviderError> {
        self.db.get(key.as_bytes()).map_err(|e| {
            ProviderError::resolution(format!("'{key}'"), format!("store read failed: {e}"))
        })
    }
}
