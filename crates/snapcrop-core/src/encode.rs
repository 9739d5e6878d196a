//! JPEG encoding for download outputs.
//!
//! Every finished item leaves the pipeline as a JPEG, matching the
//! original page's `canvas.toBlob(..., "image/jpeg", 0.9)` step. The
//! `image` crate's encoder does the actual compression.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use thiserror::Error;

/// JPEG quality used for downloadable outputs.
pub const DEFAULT_EXPORT_QUALITY: u8 = 90;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality, clamped to 1-100
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` for a zero dimension,
/// `EncodeError::InvalidPixelData` when the buffer length doesn't match
/// `width * height * 3`, and `EncodeError::EncodingFailed` if the
/// encoder itself fails.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_produces_jpeg_markers() {
        let pixels = vec![128u8; 64 * 48 * 3];
        let jpeg = encode_jpeg(&pixels, 64, 48, DEFAULT_EXPORT_QUALITY).unwrap();

        // SOI at the start, EOI at the end
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_rejects_zero_dimensions() {
        let pixels = vec![0u8; 30];
        assert!(matches!(
            encode_jpeg(&pixels, 0, 10, 90),
            Err(EncodeError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            encode_jpeg(&pixels, 10, 0, 90),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_encode_rejects_short_buffer() {
        let pixels = vec![0u8; 10];
        let err = encode_jpeg(&pixels, 10, 10, 90).unwrap_err();
        match err {
            EncodeError::InvalidPixelData { expected, actual } => {
                assert_eq!(expected, 300);
                assert_eq!(actual, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_quality_is_clamped() {
        let pixels = vec![200u8; 16 * 16 * 3];
        // 0 and 255 are out of range but must not panic
        assert!(encode_jpeg(&pixels, 16, 16, 0).is_ok());
        assert!(encode_jpeg(&pixels, 16, 16, 255).is_ok());
    }

    #[test]
    fn test_higher_quality_is_larger() {
        // A noisy image so quality actually changes the byte count
        let pixels: Vec<u8> = (0..64usize * 64 * 3)
            .map(|i| ((i * 97 + i / 7) % 256) as u8)
            .collect();
        let low = encode_jpeg(&pixels, 64, 64, 30).unwrap();
        let high = encode_jpeg(&pixels, 64, 64, 95).unwrap();
        assert!(high.len() > low.len());
    }
}
