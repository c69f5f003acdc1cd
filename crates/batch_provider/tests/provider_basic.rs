//! Single-stream semantics of the batch provider.
//!
//! Tests cover:
//! - One-pass batch counts, coverage, and remainder dropping
//! - Image/label pairing within a batch
//! - Target resizing of in-memory payloads
//! - Construction validation
//! - Idempotent close and non-resumable termination

mod common;
use common::pixel_items;

use anyhow::Result;
use batch_provider::{BatchProvider, ProviderConfig, ProviderError};
use std::collections::HashSet;

// ================================================================================================
// 1. One-pass counting and coverage
// ================================================================================================
#[test]
fn four_items_batch_two_yields_two_batches_covering_all() -> Result<()> {
    let config = ProviderConfig::builder()
        .batch_size(2)
        .workers(2)
        .target_width(4)
        .target_height(4)
        .seed(42)
        .build();
    let provider = BatchProvider::new(pixel_items(4, 8, 8), config)?;
    assert_eq!(provider.batches_per_epoch(), 2);

    let batches: Vec<_> = provider.into_batches().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(batches.len(), 2);

    let mut labels: Vec<usize> = batches.iter().flat_map(|b| b.labels.clone()).collect();
    labels.sort_unstable();
    assert_eq!(labels, vec![0, 1, 2, 3]);
    Ok(())
}

#[test]
fn five_items_batch_two_drops_the_remainder() -> Result<()> {
    let config = ProviderConfig::builder()
        .batch_size(2)
        .workers(2)
        .target_width(4)
        .target_height(4)
        .seed(7)
        .build();
    let provider = BatchProvider::new(pixel_items(5, 8, 8), config)?;

    let batches: Vec<_> = provider.into_batches().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(batches.len(), 2);

    let seen: HashSet<usize> = batches.iter().flat_map(|b| b.labels.clone()).collect();
    assert_eq!(seen.len(), 4);
    Ok(())
}

// ================================================================================================
// 2. Batch shape and pairing
// ================================================================================================
#[test]
fn every_batch_pairs_images_with_their_labels() -> Result<()> {
    // Each source image is a solid color equal to its label, so the pairing
    // survives shuffling and completion-order delivery.
    let config = ProviderConfig::builder()
        .batch_size(3)
        .workers(2)
        .target_width(5)
        .target_height(5)
        .seed(11)
        .build();
    let provider = BatchProvider::new(pixel_items(12, 10, 10), config)?;

    for batch in provider.into_batches() {
        let batch = batch?;
        assert_eq!(batch.batch_size(), 3);
        for (image, &label) in batch.images.iter().zip(batch.labels.iter()) {
            assert_eq!(image.dimensions(), (5, 5));
            assert_eq!(image.get_pixel(0, 0)[0], label as u8);
        }
    }
    Ok(())
}

// ================================================================================================
// 3. Construction validation
// ================================================================================================
#[test]
fn construction_rejects_invalid_parameters() {
    let valid = || {
        ProviderConfig::builder()
            .batch_size(2)
            .workers(1)
            .target_width(4)
            .target_height(4)
    };

    // Empty item list
    let err = BatchProvider::<usize>::new(vec![], valid().build()).unwrap_err();
    assert!(matches!(err, ProviderError::Config { .. }));

    // Zero batch size
    let err = BatchProvider::new(pixel_items(4, 8, 8), valid().batch_size(0).build()).unwrap_err();
    assert!(matches!(err, ProviderError::Config { .. }));

    // Zero workers
    let err = BatchProvider::new(pixel_items(4, 8, 8), valid().workers(0).build()).unwrap_err();
    assert!(matches!(err, ProviderError::Config { .. }));

    // Batch larger than the dataset
    let err = BatchProvider::new(pixel_items(4, 8, 8), valid().batch_size(5).build()).unwrap_err();
    assert!(matches!(err, ProviderError::Config { .. }));

    // Keyed payloads without a store path
    let items = vec![
        batch_provider::Sample::from_key(0usize, "img0"),
        batch_provider::Sample::from_key(1usize, "img1"),
    ];
    let err = BatchProvider::new(items, valid().build()).unwrap_err();
    assert!(matches!(err, ProviderError::Config { .. }));
}

// ================================================================================================
// 4. Termination and close
// ================================================================================================
#[test]
fn close_is_idempotent_and_terminal() -> Result<()> {
    let config = ProviderConfig::builder()
        .batch_size(2)
        .workers(2)
        .cycled(true)
        .target_width(4)
        .target_height(4)
        .seed(3)
        .build();
    let provider = BatchProvider::new(pixel_items(8, 8, 8), config)?;

    let mut stream = provider.into_batches();
    let first = stream.next().expect("cyclic stream yields batches");
    assert!(first.is_ok());

    stream.close();
    stream.close();
    assert!(stream.next().is_none());
    assert!(stream.next().is_none());
    Ok(())
}

#[test]
fn exhausted_stream_stays_done() -> Result<()> {
    let config = ProviderConfig::builder()
        .batch_size(2)
        .workers(1)
        .target_width(4)
        .target_height(4)
        .seed(5)
        .build();
    let provider = BatchProvider::new(pixel_items(4, 8, 8), config)?;

    let mut stream = provider.into_batches();
    assert!(stream.next().is_some());
    assert!(stream.next().is_some());
    assert!(stream.next().is_none());
    assert!(stream.next().is_none());
    Ok(())
}

// ================================================================================================
// 5. Cyclic epochs (single worker, so batch order tracks slice order)
// ================================================================================================
#[test]
fn single_worker_cyclic_epochs_cover_the_same_multiset() -> Result<()> {
    let config = ProviderConfig::builder()
        .batch_size(2)
        .workers(1)
        .cycled(true)
        .target_width(4)
        .target_height(4)
        .seed(42)
        .build();
    let provider = BatchProvider::new(pixel_items(6, 8, 8), config)?;
    let mut stream = provider.into_batches();

    let epoch_labels = |stream: &mut batch_provider::BatchStream<usize>| -> Result<Vec<usize>> {
        let mut labels = Vec::new();
        for _ in 0..3 {
            let batch = stream.next().expect("cyclic stream continues")?;
            labels.extend(batch.labels);
        }
        labels.sort_unstable();
        Ok(labels)
    };

    let first = epoch_labels(&mut stream)?;
    let second = epoch_labels(&mut stream)?;
    assert_eq!(first, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(second, vec![0, 1, 2, 3, 4, 5]);

    stream.close();
    Ok(())
}
