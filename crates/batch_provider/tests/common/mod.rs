use anyhow::Result;
use batch_provider::Sample;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use rocksdb::DB;
use std::io::Cursor;
use std::path::Path;

/// Solid-color image whose channel value encodes a label, so batch pairing
/// can be verified from pixels alone.
pub fn solid_image(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
}

pub fn png_bytes(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}

/// In-memory samples labelled 0..n, each a solid image of its own label.
pub fn pixel_items(n: usize, width: u32, height: u32) -> Vec<Sample<usize>> {
    (0..n)
        .map(|i| Sample::from_pixels(i, solid_image(width, height, i as u8)))
        .collect()
}

/// Writes a throwaway RocksDB store of encoded blobs, then drops the write
/// handle so the provider can reopen it read-only.
pub fn seed_store(path: &Path, entries: &[(String, Vec<u8>)]) -> Result<()> {
    let db = DB::open_default(path)?;
    for (key, value) in entries {
        db.put(key.as_bytes(), value)?;
    }
    Ok(())
}

/// Store-backed fixture: keys `img{i}` mapping to solid PNGs of label i,
/// plus the matching sample list.
pub fn seeded_keyed_items(
    path: &Path,
    n: usize,
    width: u32,
    height: u32,
) -> Result<Vec<Sample<usize>>> {
    let entries = (0..n)
        .map(|i| Ok((format!("img{i}"), png_bytes(&solid_image(width, height, i as u8))?)))
        .collect::<Result<Vec<_>>>()?;
    seed_store(path, &entries)?;
    Ok((0..n).map(|i| Sample::from_key(i, format!("img{i}"))).collect())
}
