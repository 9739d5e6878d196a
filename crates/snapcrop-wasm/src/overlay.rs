//! Crop-overlay WASM bindings.
//!
//! The thumbnail overlay is positioned entirely from Rust: JavaScript
//! hands over the wrap-box size, the source dimensions, and pointer
//! deltas, and gets back screen-space rectangles to style the crop box
//! and shade panels with.
//!
//! # Example
//!
//! ```typescript
//! import { display_metrics, display_crop, shade_rects, drag_crop } from '@snapcrop/wasm';
//!
//! const metrics = display_metrics(wrap.clientWidth, wrap.clientHeight, srcW, srcH);
//! const box = display_crop(crop, metrics);
//! cropBox.style.left = `${box.x}px`;
//! cropBox.style.top = `${box.y}px`;
//!
//! // On pointermove:
//! crop = drag_crop(crop, metrics, e.movementX, e.movementY);
//! ```

use serde_wasm_bindgen::{from_value, to_value};
use snapcrop_core::geometry::{self, CropRect, DisplayMetrics, SourceBounds};
use wasm_bindgen::prelude::*;

fn parse_crop(value: JsValue) -> Result<CropRect, JsValue> {
    from_value(value).map_err(|e| JsValue::from_str(&format!("invalid crop rect: {e}")))
}

fn parse_metrics(value: JsValue) -> Result<DisplayMetrics, JsValue> {
    from_value(value).map_err(|e| JsValue::from_str(&format!("invalid display metrics: {e}")))
}

fn serialize<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Compute how a source image sits inside its wrap box: the
/// aspect-preserving scale and the letterbox offsets.
///
/// # Returns
///
/// A `{ wrap_width, wrap_height, scale, display_width, display_height,
/// offset_x, offset_y }` object, or `null` when the wrap box or the
/// source has no extent (detached element, zero-sized image).
#[wasm_bindgen]
pub fn display_metrics(
    wrap_width: f64,
    wrap_height: f64,
    source_width: u32,
    source_height: u32,
) -> Result<JsValue, JsValue> {
    let source = SourceBounds::new(source_width, source_height);
    match DisplayMetrics::compute(wrap_width, wrap_height, source) {
        Some(metrics) => serialize(&metrics),
        None => Ok(JsValue::NULL),
    }
}

/// Map a source-pixel crop rectangle to screen coordinates inside the
/// wrap box.
///
/// # Arguments
///
/// * `crop` - `{ x, y, width, height }` in source pixels
/// * `metrics` - the object from [`display_metrics`]
#[wasm_bindgen]
pub fn display_crop(crop: JsValue, metrics: JsValue) -> Result<JsValue, JsValue> {
    let crop = parse_crop(crop)?;
    let metrics = parse_metrics(metrics)?;
    serialize(&crop.to_display(&metrics))
}

/// Compute the four shade rectangles (screen coordinates) that darken
/// everything outside the crop box.
///
/// # Returns
///
/// `{ top, right, bottom, left }`, each a screen-space
/// `{ x, y, width, height }`.
#[wasm_bindgen]
pub fn shade_rects(crop: JsValue, metrics: JsValue) -> Result<JsValue, JsValue> {
    let crop = parse_crop(crop)?;
    let metrics = parse_metrics(metrics)?;
    let display = crop.to_display(&metrics);
    serialize(&geometry::shade_rects(&display, &metrics))
}

/// Apply a pointer drag to a crop rectangle.
///
/// `dx`/`dy` are screen-pixel deltas. The crop keeps its size and is
/// clamped so it never leaves the displayed image.
///
/// # Returns
///
/// The updated crop rectangle in source pixels.
#[wasm_bindgen]
pub fn drag_crop(crop: JsValue, metrics: JsValue, dx: f64, dy: f64) -> Result<JsValue, JsValue> {
    let crop = parse_crop(crop)?;
    let metrics = parse_metrics(metrics)?;
    serialize(&geometry::drag(&crop, &metrics, dx, dy))
}
