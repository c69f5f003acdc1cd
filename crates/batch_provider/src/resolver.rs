//! src/resolver.rs
//!
//! The `ImageResolver` turns one sample payload into a pixel tensor of the
//! target dimensions. The variant is a tagged enum fixed at construction by
//! inspecting the first sample's payload, not by runtime type inspection
//! per fetch:
//!
//! - `InMemory`: the payload already holds decoded pixels; only a bilinear
//!   resize to the target size is needed.
//! - `StoreBacked`: the payload is a key into the read-only blob store; the
//!   blob is looked up, decoded to RGB, and cropped to the target size
//!   (random origin when training, centered when evaluating).
//!
//! A missing key, undecodable bytes, or a source smaller than the crop
//! target is a `Resolution` error. The failing fetch never falls back to a
//! previously decoded buffer.

use image::imageops::{self, FilterType};
use image::RgbImage;
use std::sync::Arc;

use crate::augment::{crop_origin, AugmentMode};
use crate::error::ProviderError;
use crate::sample::{Payload, Sample};
use crate::store::BlobStore;

#[derive(Debug)]
pub(crate) enum ImageResolver {
    InMemory {
        width: u32,
        height: u32,
    },
    StoreBacked {
        store: Arc<BlobStore>,
        width: u32,
        height: u32,
        mode: AugmentMode,
    },
}

impl ImageResolver {
    pub(crate) fn in_memory(width: u32, height: u32) -> Self {
        Self::InMemory { width, height }
    }

    pub(crate) fn store_backed(store: BlobStore, width: u32, height: u32, mode: AugmentMode) -> Self {
        Self::StoreBacked {
            store: Arc::new(store),
            width,
            height,
            mode,
        }
    }

    /// Retrieves and decodes the pixels for one sample, at target size.
    pub(crate) fn fetch<L>(&self, sample: &Sample<L>) -> Result<RgbImage, ProviderError> {
        match (self, &sample.payload) {
            (Self::InMemory { width, height }, Payload::Pixels(pixels)) => {
                Ok(imageops::resize(pixels, *width, *height, FilterType::Triangle))
            }
            (
                Self::StoreBacked {
                    store,
                    width,
                    height,
                    mode,
                },
                Payload::Key(key),
            ) => {
                let bytes = store.get(key)?.ok_or_else(|| {
                    ProviderError::resolution(format!("'{key}'"), "key not found in store")
                })?;
                let decoded = image::load_from_memory(&bytes).map_err(|e| {
                    ProviderError::resolution(
                        format!("'{key}'"),
                        format!("failed to decode stored bytes: {e}"),
                    )
                })?;
                let rgb = decoded.to_rgb8();

                let (src_w, src_h) = rgb.dimensions();
                let undersized = || {
                    ProviderError::resolution(
                        format!("'{key}'"),
                        format!("source {src_w}x{src_h} smaller than crop target {width}x{height}"),
                    )
                };
                let x = crop_origin(src_w, *width, *mode).ok_or_else(undersized)?;
                let y = crop_origin(src_h, *height, *mode).ok_or_else(undersized)?;

                Ok(imageops::crop_imm(&rgb, x, y, *width, *height).to_image())
            }
            // The variant is picked from the first sample; a payload of the
            // other kind further down the list is a data error.
            (_, payload) => Err(ProviderError::resolution(
                payload.describe(),
                "payload variant does not match the resolver picked at construction",
            )),
        }
    }
}
