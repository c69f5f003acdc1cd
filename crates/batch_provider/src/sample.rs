use image::RgbImage;

/// The pixel data of a sample, fixed at catalog construction.
///
/// Either the pixels are already resident in memory (small datasets that fit
/// in RAM), or the sample carries a key into a read-only byte store holding
/// an encoded image blob (JPEG, PNG, ...). The provider picks its resolver
/// variant once, from the payload of the first sample.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Decoded pixels, resident in memory. Only resized before batching.
    Pixels(RgbImage),
    /// Key into the backing blob store; looked up and decoded per fetch.
    Key(String),
}

impl Payload {
    /// Short descriptor used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Payload::Pixels(_) => "<in-memory>".to_string(),
            Payload::Key(key) => format!("'{key}'"),
        }
    }
}

/// A single data example: an opaque label paired with its pixel payload.
///
/// Labels are passed through to the consumer untouched; the provider never
/// inspects them. `L` can be a class index, a multi-hot vector, or anything
/// else the training loop expects.
#[derive(Debug, Clone)]
pub struct Sample<L> {
    pub label: L,
    pub payload: Payload,
}

impl<L> Sample<L> {
    /// Creates a sample whose pixels are already in memory.
    pub fn from_pixels(label: L, pixels: RgbImage) -> Self {
        Self {
            label,
            payload: Payload::Pixels(pixels),
        }
    }

    /// Creates a sample backed by a store key.
    pub fn from_key(label: L, key: impl Into<String>) -> Self {
        Self {
            label,
            payload: Payload::Key(key.into()),
        }
    }
}
