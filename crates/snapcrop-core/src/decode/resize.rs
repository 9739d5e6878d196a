//! Image resizing for the downscale stage and for analysis previews.
//!
//! The pipeline resizes a cropped region to the exact target resolution
//! (the Pica stage of the original flow); saliency detection resizes the
//! whole source down to a bounded analysis image first. Both go through
//! the `image` crate's resampling filters.

use super::{DecodeError, DecodedImage, FilterType};

/// Resize an image to exact dimensions.
///
/// Aspect ratio is NOT preserved; the caller is expected to have cropped
/// to the right aspect first. Returns a clone when the dimensions already
/// match.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` if either target dimension is
/// zero, `DecodeError::CorruptedFile` if the pixel buffer is inconsistent.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image
        .to_rgb_image()
        .ok_or_else(|| DecodeError::CorruptedFile("pixel buffer size mismatch".to_string()))?;

    let resized = image::imageops::resize(&rgb_image, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Resize so the longest edge is at most `max_edge`, preserving aspect.
///
/// Images already within the limit are returned unchanged (no upscale).
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` for a zero `max_edge`,
/// otherwise the same failures as [`resize`].
pub fn resize_to_fit(
    image: &DecodedImage,
    max_edge: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::InvalidDimensions {
            width: max_edge,
            height: max_edge,
        });
    }

    if image.width <= max_edge && image.height <= max_edge {
        return Ok(image.clone());
    }

    let ratio = image.width as f64 / image.height as f64;
    let (new_width, new_height) = if image.width >= image.height {
        let h = (f64::from(max_edge) / ratio).round() as u32;
        (max_edge, h.max(1))
    } else {
        let w = (f64::from(max_edge) * ratio).round() as u32;
        (w.max(1), max_edge)
    };

    resize(image, new_width, new_height, filter)
}
