//! Decoding of dropped image files.
//!
//! The drop zone accepts anything the browser calls an image, so the
//! format is guessed from the bytes rather than trusted from the file
//! name or MIME type.

use std::io::Cursor;

use image::ImageReader;

use super::{DecodeError, DecodedImage};
use crate::geometry::SourceBounds;

/// Decode an image file from bytes into RGB pixel data.
///
/// The container format is guessed from the magic bytes; JPEG, PNG and
/// WebP are supported. Alpha channels are dropped (composited onto the
/// RGB values the decoder produces) since the output is always JPEG.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the bytes are not a
/// recognized image format, `DecodeError::CorruptedFile` if decoding
/// fails partway.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    Ok(DecodedImage::from_rgb_image(img.into_rgb8()))
}

/// Read an image's dimensions without decoding the pixel data.
///
/// Cheap enough to run at ingestion time for every dropped file; the
/// overlay needs the source bounds before any processing happens.
///
/// # Errors
///
/// Same failure modes as [`decode_image`].
pub fn probe_dimensions(bytes: &[u8]) -> Result<SourceBounds, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    Ok(SourceBounds::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    /// Encode a small RGB gradient as PNG bytes for decoder tests.
    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push((x * 7 % 256) as u8);
                pixels.push((y * 13 % 256) as u8);
                pixels.push(64);
            }
        }
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&pixels, width, height, ExtendedColorType::Rgb8)
            .expect("png encode");
        out
    }

    #[test]
    fn test_decode_png() {
        let bytes = png_fixture(20, 10);
        let img = decode_image(&bytes).expect("decodes");
        assert_eq!(img.width, 20);
        assert_eq!(img.height, 10);
        assert_eq!(img.pixels.len(), 20 * 10 * 3);
    }

    #[test]
    fn test_decode_jpeg() {
        let src = png_fixture(16, 16);
        let decoded = decode_image(&src).expect("decodes");
        let jpeg = crate::encode::encode_jpeg(&decoded.pixels, 16, 16, 90).expect("encodes");
        let img = decode_image(&jpeg).expect("decodes jpeg");
        assert_eq!(img.width, 16);
        assert_eq!(img.height, 16);
    }

    #[test]
    fn test_decode_rejects_non_image() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidFormat));
    }

    #[test]
    fn test_decode_rejects_truncated() {
        let mut bytes = png_fixture(20, 10);
        bytes.truncate(bytes.len() / 2);
        assert!(decode_image(&bytes).is_err());
    }

    #[test]
    fn test_probe_dimensions() {
        let bytes = png_fixture(33, 21);
        let bounds = probe_dimensions(&bytes).expect("probes");
        assert_eq!(bounds.width, 33);
        assert_eq!(bounds.height, 21);
    }

    #[test]
    fn test_probe_rejects_non_image() {
        assert!(probe_dimensions(&[0u8; 16]).is_err());
    }
}
