//! Pixel-space cropping.
//!
//! The crop rectangle arrives in source pixel coordinates (possibly
//! fractional, after drag mapping); this module is the single place
//! where it is rounded to whole pixels and the region is copied out.

use crate::decode::DecodedImage;
use crate::geometry::CropRect;

/// Copy the region described by a source-space crop rectangle.
///
/// The rectangle is rounded to whole pixels and clamped to the image
/// bounds; the output is at least 1x1. A rectangle covering the whole
/// image returns a plain copy.
pub fn crop_image(image: &DecodedImage, rect: &CropRect) -> DecodedImage {
    let left = (rect.x.round().max(0.0) as u32).min(image.width.saturating_sub(1));
    let top = (rect.y.round().max(0.0) as u32).min(image.height.saturating_sub(1));
    let right = (left + rect.width.round().max(0.0) as u32).min(image.width);
    let bottom = (top + rect.height.round().max(0.0) as u32).min(image.height);

    let out_width = right.saturating_sub(left).max(1);
    let out_height = bottom.saturating_sub(top).max(1);

    if left == 0 && top == 0 && out_width == image.width && out_height == image.height {
        return image.clone();
    }

    let src_stride = (image.width * 3) as usize;
    let out_stride = (out_width * 3) as usize;
    let mut output = vec![0u8; out_stride * out_height as usize];

    for y in 0..out_height as usize {
        let src_start = (top as usize + y) * src_stride + (left * 3) as usize;
        let dst_start = y * out_stride;
        output[dst_start..dst_start + out_stride]
            .copy_from_slice(&image.pixels[src_start..src_start + out_stride]);
    }

    DecodedImage {
        width: out_width,
        height: out_height,
        pixels: output,
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
