use image::RgbImage;

/// A fixed-size group of samples delivered to the consumer as one unit.
///
/// `images[i]` is paired with `labels[i]`, matching the catalog slice the
/// batch was assembled from. Every image has the provider's target
/// dimensions. Batches are created by a worker, handed to the queue, and
/// owned by the consumer after the pull.
#[derive(Debug)]
pub struct Batch<L> {
    pub images: Vec<RgbImage>,
    pub labels: Vec<L>,
}

impl<L> Batch<L> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            images: Vec::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, image: RgbImage, label: L) {
        self.images.push(image);
        self.labels.push(label);
    }

    /// Returns the number of samples in the batch.
    pub fn batch_size(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
