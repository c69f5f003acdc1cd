//! Crop-origin and flip policies applied to decoded images.
//!
//! Training mode jitters the crop origin and flips horizontally with
//! probability 0.5, independently per image; evaluation mode center-crops
//! and never flips, so two fetches of the same source are identical.

use image::{imageops, RgbImage};

use crate::provider::thread::{worker_gen_bool, worker_gen_range};

const FLIP_PROBABILITY: f64 = 0.5;

/// Augmentation policy, fixed at provider construction.
///
/// By default a cyclic provider trains and a one-pass provider evaluates;
/// the config builder can override the pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AugmentMode {
    Train,
    Eval,
}

/// Applies the flip policy after crop, before batch assembly.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Augmenter {
    mode: AugmentMode,
}

impl Augmenter {
    pub(crate) fn new(mode: AugmentMode) -> Self {
        Self { mode }
    }

    pub(crate) fn transform(&self, image: RgbImage) -> RgbImage {
        match self.mode {
            AugmentMode::Eval => image,
            AugmentMode::Train => {
                if worker_gen_bool(FLIP_PROBABILITY) {
                    imageops::flip_horizontal(&image)
                } else {
                    image
                }
            }
        }
    }
}

/// Picks the crop origin along one axis, or `None` if the source is smaller
/// than the target. Training draws uniformly from `[0, source - target]`
/// per call; evaluation always uses the centered origin.
pub(crate) fn crop_origin(source: u32, target: u32, mode: AugmentMode) -> Option<u32> {
    let span = source.checked_sub(target)?;
    Some(match mode {
        AugmentMode::Eval => span / 2,
        AugmentMode::Train => {
            if span == 0 {
                0
            } else {
                worker_gen_range(0..=span)
            }
        }
    })
}
