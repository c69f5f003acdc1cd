//! Error taxonomy for the batch provider.
//!
//! Three classes of failure, matching where they can occur:
//! - `Config`: invalid construction parameters, raised before any worker starts.
//! - `Resolution`: a sample could not be turned into pixels (missing store key,
//!   undecodable bytes, unusable dimensions).
//! - `Pool`: an unexpected failure inside a worker loop (e.g. a panic).
//!
//! Background failures never vanish: the first one recorded by a worker shuts
//! the pool down and is returned to the consumer on its next pull.

use thiserror::Error;

/// Primary error type for all batch provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Invalid construction parameters. Fatal, detected before workers spawn.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// A keyed lookup missed, or retrieved data could not be decoded.
    #[error("failed to resolve sample {sample}: {message}")]
    Resolution { sample: String, message: String },

    /// Unexpected failure inside a worker's loop.
    #[error("worker pool failure: {message}")]
    Pool { message: String },
}

impl ProviderError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub(crate) fn resolution(sample: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            sample: sample.into(),
            message: message.into(),
        }
    }

    pub(crate) fn pool(message: impl Into<String>) -> Self {
        Self::Pool {
            message: message.into(),
        }
    }
}
