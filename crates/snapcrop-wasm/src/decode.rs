//! Image decoding WASM bindings.
//!
//! Exposes the snapcrop-core decoding functions to JavaScript: format
//! sniffing, full decode for preview rendering, and header-only
//! dimension probing for the overlay maths.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode a PNG/JPEG/WebP image from bytes
//! - [`probe_dimensions`] - Read dimensions without a full decode
//! - [`resize_to_fit`] - Downscale an image to fit a maximum edge
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, probe_dimensions } from '@snapcrop/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//!
//! // Cheap: just the header, for overlay layout
//! const [width, height] = probe_dimensions(bytes);
//!
//! // Full decode, for drawing onto a canvas
//! const image = decode_image(bytes);
//! console.log(`Decoded ${image.width}x${image.height}`);
//! ```

use crate::types::{filter_from_u8, JsDecodedImage};
use snapcrop_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an image (PNG, JPEG, or WebP) from bytes.
///
/// The format is sniffed from the bytes; the file name plays no part.
///
/// # Arguments
///
/// * `bytes` - The raw file bytes as a `Uint8Array`
///
/// # Returns
///
/// A `JsDecodedImage` containing the decoded RGB pixel data.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image format or
/// the file is corrupted or truncated.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Read an image's dimensions without decoding its pixels.
///
/// Much cheaper than [`decode_image`] when only the size is needed,
/// which is the case for the crop-overlay layout maths.
///
/// # Returns
///
/// A `Uint32Array` of `[width, height]`.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image format.
#[wasm_bindgen]
pub fn probe_dimensions(bytes: &[u8]) -> Result<Vec<u32>, JsValue> {
    decode::probe_dimensions(bytes)
        .map(|bounds| vec![bounds.width, bounds.height])
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Downscale an image so its longest edge fits `max_edge`, preserving
/// aspect ratio. Images already small enough are returned unchanged.
///
/// # Arguments
///
/// * `image` - The decoded image
/// * `max_edge` - Maximum allowed edge length in pixels
/// * `filter` - Resampling filter: 0 = Nearest, 1 = Bilinear, 2 = Lanczos3
///
/// # Errors
///
/// Returns an error if `max_edge` is zero.
#[wasm_bindgen]
pub fn resize_to_fit(
    image: &JsDecodedImage,
    max_edge: u32,
    filter: u8,
) -> Result<JsDecodedImage, JsValue> {
    let decoded = decode::DecodedImage::new(image.width(), image.height(), image.pixels());
    decode::resize_to_fit(&decoded, max_edge, filter_from_u8(filter))
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}


/// WASM-specific tests that require JsValue.
///
/// The error paths build a `JsValue`, which only exists on wasm32
/// targets. Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_image_rejects_garbage() {
        assert!(decode_image(b"definitely not an image").is_err());
    }

    #[wasm_bindgen_test]
    fn test_probe_dimensions_rejects_garbage() {
        assert!(probe_dimensions(&[0u8; 16]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_resize_to_fit_rejects_zero_edge() {
        let image = JsDecodedImage::new(4, 4, vec![0u8; 4 * 4 * 3]);
        assert!(resize_to_fit(&image, 0, 1).is_err());
    }
}
