//! End-to-end processing of one image: decode, crop, downscale, encode.
//!
//! This is the work done when the user hits Apply. The caller supplies
//! the original file bytes, the target size, and optionally the crop
//! rectangle the user settled on; with no override the salient crop is
//! detected here.

use thiserror::Error;

use crate::decode::{decode_image, DecodeError, FilterType};
use crate::detect::auto_crop;
use crate::encode::{encode_jpeg, EncodeError, DEFAULT_EXPORT_QUALITY};
use crate::geometry::CropRect;
use crate::transform::crop_image;
use crate::OutputSize;

/// Errors from a full pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to decode source image: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to encode output: {0}")]
    Encode(#[from] EncodeError),

    #[error("invalid target size: {width}x{height}")]
    InvalidTarget { width: u32, height: u32 },
}

/// Result of a pipeline run: the encoded JPEG plus the crop that
/// produced it (so the caller can record a detected crop it did not
/// supply).
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Encoded JPEG bytes at the target size.
    pub jpeg: Vec<u8>,
    /// Output width in pixels (equals the target width).
    pub width: u32,
    /// Output height in pixels (equals the target height).
    pub height: u32,
    /// The crop rectangle used, in source pixels.
    pub crop: CropRect,
}

/// Run the full pipeline over one image.
///
/// Decodes `bytes`, crops to `crop` (clamped to the source) or to the
/// detected salient region when `crop` is `None`, resizes the result to
/// exactly `target` with Lanczos3, and encodes a JPEG at the default
/// export quality.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidTarget`] for a zero-dimension target,
/// and propagates decode and encode failures.
///
/// # Example
///
/// ```no_run
/// use snapcrop_core::{process, OutputSize};
///
/// let bytes = std::fs::read("photo.png").unwrap();
/// let output = process(&bytes, OutputSize::new(1280, 720), None).unwrap();
/// assert_eq!((output.width, output.height), (1280, 720));
/// ```
pub fn process(
    bytes: &[u8],
    target: OutputSize,
    crop: Option<CropRect>,
) -> Result<PipelineOutput, PipelineError> {
    if target.width == 0 || target.height == 0 {
        return Err(PipelineError::InvalidTarget {
            width: target.width,
            height: target.height,
        });
    }

    let image = decode_image(bytes)?;
    let bounds = image.bounds();
    let crop = match crop {
        Some(rect) => rect.clamp_to_bounds(bounds),
        None => auto_crop(&image, target),
    };

    let cropped = crop_image(&image, &crop);
    let resized = crate::decode::resize(&cropped, target.width, target.height, FilterType::Lanczos3)?;
    let jpeg = encode_jpeg(
        &resized.pixels,
        resized.width,
        resized.height,
        DEFAULT_EXPORT_QUALITY,
    )?;

    Ok(PipelineOutput {
        jpeg,
        width: resized.width,
        height: resized.height,
        crop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodedImage;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DecodedImage::new(width, height, vec![120u8; (width * height * 3) as usize]);
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&image.pixels, width, height, ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    #[test]
    fn test_process_produces_target_dimensions() {
        let bytes = png_bytes(640, 480);
        let output = process(&bytes, OutputSize::new(320, 240), None).unwrap();
        assert_eq!(output.width, 320);
        assert_eq!(output.height, 240);
        // JPEG magic
        assert_eq!(&output.jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_process_reports_detected_crop() {
        let bytes = png_bytes(640, 480);
        let output = process(&bytes, OutputSize::new(100, 100), None).unwrap();
        // Square target from a 4:3 source: the crop is the largest square
        assert!((output.crop.width - 480.0).abs() < 1.0);
        assert!((output.crop.height - 480.0).abs() < 1.0);
    }

    #[test]
    fn test_process_honours_crop_override() {
        let bytes = png_bytes(640, 480);
        let rect = CropRect::new(10.0, 20.0, 300.0, 200.0);
        let output = process(&bytes, OutputSize::new(150, 100), Some(rect)).unwrap();
        assert_eq!(output.crop, rect);
        assert_eq!(output.width, 150);
    }

    #[test]
    fn test_process_clamps_out_of_bounds_override() {
        let bytes = png_bytes(200, 200);
        let rect = CropRect::new(150.0, 150.0, 300.0, 300.0);
        let output = process(&bytes, OutputSize::new(50, 50), Some(rect)).unwrap();
        assert!(output.crop.x + output.crop.width <= 200.0);
        assert!(output.crop.y + output.crop.height <= 200.0);
    }

    #[test]
    fn test_process_upscales_small_crop_to_target() {
        let bytes = png_bytes(100, 100);
        let output = process(&bytes, OutputSize::new(400, 400), None).unwrap();
        assert_eq!(output.width, 400);
        assert_eq!(output.height, 400);
    }

    #[test]
    fn test_process_rejects_zero_target() {
        let bytes = png_bytes(100, 100);
        let result = process(&bytes, OutputSize::new(0, 100), None);
        assert!(matches!(result, Err(PipelineError::InvalidTarget { .. })));
    }

    #[test]
    fn test_process_rejects_garbage_bytes() {
        let result = process(b"not an image", OutputSize::new(100, 100), None);
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }
}
