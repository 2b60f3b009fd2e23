//! Raster transport encoding and preview downsampling

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::RgbImage;
use std::path::Path;

use crate::error::Result;

/// An RGB8 pixel grid
pub type Raster = RgbImage;

/// Largest preview edge sent back to clients
pub const DEFAULT_PREVIEW_DIMENSION: u32 = 768;

/// JPEG quality used for every encoded raster
pub const JPEG_QUALITY: u8 = 95;

/// MIME type of encoded rasters
pub const JPEG_MIME: &str = "image/jpeg";

/// Load a raster from disk, converting to RGB8
pub fn open(path: &Path) -> Result<Raster> {
    Ok(image::open(path)?.to_rgb8())
}

/// Compress a raster to a JPEG byte stream
pub fn encode_jpeg(raster: &Raster) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    encoder.encode_image(raster)?;
    Ok(bytes)
}

/// Compress a raster to JPEG and base64-encode it for text transport
pub fn encode(raster: &Raster) -> Result<String> {
    Ok(BASE64.encode(encode_jpeg(raster)?))
}

/// Decode a base64 image payload back into a raster
pub fn decode(text: &str) -> Result<Raster> {
    let bytes = BASE64
        .decode(text.trim())
        .map_err(|e| crate::FloorsightError::ImageCodec(format!("invalid base64: {}", e)))?;
    Ok(image::load_from_memory(&bytes)?.to_rgb8())
}

/// Output dimensions of a preview bounded by `max_dimension`.
///
/// `scale = min(max / height, max / width, 1.0)`; both edges are scaled and
/// rounded when `scale < 1.0`, otherwise the input dimensions are returned.
pub fn preview_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    let max = f64::from(max_dimension);
    let scale = (max / f64::from(height)).min(max / f64::from(width)).min(1.0);
    if scale >= 1.0 {
        return (width, height);
    }

    let scaled = |edge: u32| ((f64::from(edge) * scale).round() as u32).clamp(1, edge);
    (scaled(width), scaled(height))
}

/// Downsample a raster so neither edge exceeds `max_dimension`. Never upscales.
pub fn preview(raster: &Raster, max_dimension: u32) -> Raster {
    let (width, height) = raster.dimensions();
    let (target_width, target_height) = preview_dimensions(width, height, max_dimension);
    if (target_width, target_height) == (width, height) {
        return raster.clone();
    }

    image::imageops::resize(raster, target_width, target_height, FilterType::Triangle)
}

/// Preview a raster and encode the result for transport
pub fn encoded_preview(raster: &Raster, max_dimension: u32) -> Result<String> {
    encode(&preview(raster, max_dimension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use proptest::prelude::*;

    fn gradient(width: u32, height: u32) -> Raster {
        RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
    }

    #[test]
    fn test_preview_downsamples_landscape() {
        let raster = gradient(2000, 1000);
        let small = preview(&raster, 768);
        assert_eq!(small.dimensions(), (768, 384));
    }

    #[test]
    fn test_preview_downsamples_portrait() {
        let raster = gradient(500, 1536);
        let small = preview(&raster, 768);
        assert_eq!(small.dimensions(), (250, 768));
    }

    #[test]
    fn test_preview_keeps_small_raster() {
        let raster = gradient(300, 200);
        let same = preview(&raster, 768);
        assert_eq!(same, raster);
    }

    #[test]
    fn test_encode_decode_keeps_dimensions() {
        let raster = gradient(123, 45);
        let encoded = encode(&raster).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.dimensions(), (123, 45));
    }

    #[test]
    fn test_encode_jpeg_magic() {
        let bytes = encode_jpeg(&gradient(8, 8)).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("not base64 at all!").is_err());
        assert!(decode(&BASE64.encode(b"not an image")).is_err());
    }

    proptest! {
        #[test]
        fn prop_preview_never_grows(
            width in 1u32..5000,
            height in 1u32..5000,
            max_dimension in 1u32..2000,
        ) {
            let (w, h) = preview_dimensions(width, height, max_dimension);
            prop_assert!(w <= width);
            prop_assert!(h <= height);
            prop_assert!(w >= 1 && h >= 1);
        }

        #[test]
        fn prop_preview_hits_the_bound(
            width in 1u32..5000,
            height in 1u32..5000,
            max_dimension in 1u32..2000,
        ) {
            let (w, h) = preview_dimensions(width, height, max_dimension);
            if width > max_dimension || height > max_dimension {
                prop_assert!(w == max_dimension || h == max_dimension);
                prop_assert!(w <= max_dimension && h <= max_dimension);
            } else {
                prop_assert_eq!((w, h), (width, height));
            }
        }

        #[test]
        fn prop_preview_is_idempotent(
            width in 1u32..5000,
            height in 1u32..5000,
            max_dimension in 1u32..2000,
        ) {
            let once = preview_dimensions(width, height, max_dimension);
            let twice = preview_dimensions(once.0, once.1, max_dimension);
            prop_assert_eq!(once, twice);
        }
    }
}
