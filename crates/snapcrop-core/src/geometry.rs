//! Crop-rectangle geometry and overlay mapping.
//!
//! A crop rectangle lives in **source pixel space** (the original image's
//! coordinate system). The thumbnail on screen shows the source letterboxed
//! inside a wrap box, so drawing the crop overlay and handling pointer
//! drags means mapping between the two spaces:
//!
//! - source → screen: multiply by a uniform scale, add a centering offset
//! - screen → source: subtract the offset, divide by the scale
//!
//! The scale is `min(wrap_w / src_w, wrap_h / src_h)`, i.e. the image is
//! fit entirely inside the wrap box and centered. All functions here are
//! pure; the same inputs always produce the same outputs.

use serde::{Deserialize, Serialize};

/// Dimensions of an original (source) image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBounds {
    /// Source width in pixels.
    pub width: u32,
    /// Source height in pixels.
    pub height: u32,
}

impl SourceBounds {
    /// Create new source bounds.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle.
///
/// Used both for crop regions in source pixel space and for their mapped
/// counterparts in screen (wrap box) space; the doc of each function
/// states which space it expects.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    /// Create a new rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clamp this source-space rectangle fully inside the source image.
    ///
    /// The size is capped at the source dimensions (minimum 1px each way),
    /// then the position is clamped so the rectangle does not hang over
    /// any edge. The result always satisfies the store invariant that a
    /// crop rectangle fits entirely within `[0, w] x [0, h]`.
    pub fn clamp_to_bounds(&self, source: SourceBounds) -> CropRect {
        let src_w = f64::from(source.width);
        let src_h = f64::from(source.height);
        let width = self.width.clamp(1.0, src_w.max(1.0));
        let height = self.height.clamp(1.0, src_h.max(1.0));
        let x = self.x.clamp(0.0, (src_w - width).max(0.0));
        let y = self.y.clamp(0.0, (src_h - height).max(0.0));
        CropRect {
            x,
            y,
            width,
            height,
        }
    }

    /// Map this source-space rectangle into screen space.
    pub fn to_display(&self, metrics: &DisplayMetrics) -> CropRect {
        CropRect {
            x: self.x * metrics.scale + metrics.offset_x,
            y: self.y * metrics.scale + metrics.offset_y,
            width: self.width * metrics.scale,
            height: self.height * metrics.scale,
        }
    }

    /// Map this screen-space rectangle back into source space.
    pub fn to_source(&self, metrics: &DisplayMetrics) -> CropRect {
        CropRect {
            x: (self.x - metrics.offset_x) / metrics.scale,
            y: (self.y - metrics.offset_y) / metrics.scale,
            width: self.width / metrics.scale,
            height: self.height / metrics.scale,
        }
    }
}

/// Derived mapping between source pixel space and the rendered wrap box.
///
/// Never persisted; recompute from the current layout on every read
/// (the wrap box resizes with the page).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    /// Wrap box width in screen pixels.
    pub wrap_width: f64,
    /// Wrap box height in screen pixels.
    pub wrap_height: f64,
    /// Uniform source → screen scale factor.
    pub scale: f64,
    /// Width of the scaled image on screen.
    pub display_width: f64,
    /// Height of the scaled image on screen.
    pub display_height: f64,
    /// Horizontal letterbox offset of the scaled image.
    pub offset_x: f64,
    /// Vertical letterbox offset of the scaled image.
    pub offset_y: f64,
}

impl DisplayMetrics {
    /// Compute the mapping for a source image rendered inside a wrap box.
    ///
    /// Returns `None` when either the wrap box or the source image has a
    /// zero dimension (layout not settled yet, or a degenerate image);
    /// callers skip the overlay update in that case.
    pub fn compute(wrap_width: f64, wrap_height: f64, source: SourceBounds) -> Option<Self> {
        if wrap_width <= 0.0 || wrap_height <= 0.0 || source.width == 0 || source.height == 0 {
            return None;
        }
        let src_w = f64::from(source.width);
        let src_h = f64::from(source.height);
        let scale = (wrap_width / src_w).min(wrap_height / src_h);
        let display_width = src_w * scale;
        let display_height = src_h * scale;
        Some(Self {
            wrap_width,
            wrap_height,
            scale,
            display_width,
            display_height,
            offset_x: (wrap_width - display_width) / 2.0,
            offset_y: (wrap_height - display_height) / 2.0,
        })
    }
}

/// Apply a pointer drag to a source-space crop rectangle.
///
/// `dx`/`dy` are the pointer deltas in screen pixels since the drag
/// started from `rect`'s display position. The displayed rectangle is
/// moved by the delta and clamped so it never leaves the displayed image,
/// then mapped back to source space. The size never changes during a
/// drag, so the original width/height are carried through untouched
/// rather than re-derived from the scale.
pub fn drag(rect: &CropRect, metrics: &DisplayMetrics, dx: f64, dy: f64) -> CropRect {
    let display = rect.to_display(metrics);
    let max_x = metrics.offset_x + metrics.display_width - display.width;
    let max_y = metrics.offset_y + metrics.display_height - display.height;
    let next_x = (display.x + dx).clamp(metrics.offset_x, max_x.max(metrics.offset_x));
    let next_y = (display.y + dy).clamp(metrics.offset_y, max_y.max(metrics.offset_y));
    CropRect {
        x: (next_x - metrics.offset_x) / metrics.scale,
        y: (next_y - metrics.offset_y) / metrics.scale,
        width: rect.width,
        height: rect.height,
    }
}

/// The four screen-space rectangles that dim the image outside the crop
/// box: a full-width strip above, a full-width strip below, and side
/// panels level with the box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadeRects {
    pub top: CropRect,
    pub right: CropRect,
    pub bottom: CropRect,
    pub left: CropRect,
}

/// Compute the shade rectangles for a screen-space crop rectangle.
pub fn shade_rects(display_crop: &CropRect, metrics: &DisplayMetrics) -> ShadeRects {
    let crop_right = display_crop.x + display_crop.width;
    let crop_bottom = display_crop.y + display_crop.height;
    ShadeRects {
        top: CropRect::new(0.0, 0.0, metrics.wrap_width, display_crop.y),
        bottom: CropRect::new(
            0.0,
            crop_bottom,
            metrics.wrap_width,
            (metrics.wrap_height - crop_bottom).max(0.0),
        ),
        left: CropRect::new(0.0, display_crop.y, display_crop.x, display_crop.height),
        right: CropRect::new(
            crop_right,
            display_crop.y,
            (metrics.wrap_width - crop_right).max(0.0),
            display_crop.height,
        ),
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for wrap boxes and source images that produce valid metrics.
    fn mapping_strategy() -> impl Strategy<Value = (f64, f64, u32, u32)> {
        (10.0f64..=2000.0, 10.0f64..=2000.0, 1u32..=8000, 1u32..=8000)
    }

    proptest! {
        /// Property: source → screen → source reproduces the rectangle
        /// within floating-point tolerance.
        #[test]
        fn prop_mapping_round_trips(
            (wrap_w, wrap_h, src_w, src_h) in mapping_strategy(),
            x in 0.0f64..=4000.0,
            y in 0.0f64..=4000.0,
            w in 1.0f64..=4000.0,
            h in 1.0f64..=4000.0,
        ) {
            let metrics = DisplayMetrics::compute(wrap_w, wrap_h, SourceBounds::new(src_w, src_h))
                .expect("valid metrics");
            let rect = CropRect::new(x, y, w, h);
            let back = rect.to_display(&metrics).to_source(&metrics);

            let tolerance = 1e-6 * (1.0 / metrics.scale).max(1.0);
            prop_assert!((back.x - rect.x).abs() < tolerance);
            prop_assert!((back.y - rect.y).abs() < tolerance);
            prop_assert!((back.width - rect.width).abs() < tolerance);
            prop_assert!((back.height - rect.height).abs() < tolerance);
        }

        /// Property: a dragged crop never exits the source image bounds,
        /// for any pointer delta.
        #[test]
        fn prop_drag_stays_in_bounds(
            (wrap_w, wrap_h, src_w, src_h) in mapping_strategy(),
            crop_frac_w in 0.05f64..=1.0,
            crop_frac_h in 0.05f64..=1.0,
            dx in -5000.0f64..=5000.0,
            dy in -5000.0f64..=5000.0,
        ) {
            let source = SourceBounds::new(src_w, src_h);
            let metrics = DisplayMetrics::compute(wrap_w, wrap_h, source).expect("valid metrics");
            let crop = CropRect::new(
                0.0,
                0.0,
                (f64::from(src_w) * crop_frac_w).max(1.0),
                (f64::from(src_h) * crop_frac_h).max(1.0),
            )
            .clamp_to_bounds(source);

            let moved = drag(&crop, &metrics, dx, dy);

            let slack = 1e-6 * (1.0 / metrics.scale).max(1.0);
            prop_assert!(moved.x >= -slack);
            prop_assert!(moved.y >= -slack);
            prop_assert!(moved.x + moved.width <= f64::from(src_w) + slack);
            prop_assert!(moved.y + moved.height <= f64::from(src_h) + slack);
        }

        /// Property: a zero-delta drag leaves the rectangle in place.
        #[test]
        fn prop_zero_drag_is_identity(
            (wrap_w, wrap_h, src_w, src_h) in mapping_strategy(),
        ) {
            let source = SourceBounds::new(src_w, src_h);
            let metrics = DisplayMetrics::compute(wrap_w, wrap_h, source).expect("valid metrics");
            let crop = CropRect::new(
                f64::from(src_w) * 0.25,
                f64::from(src_h) * 0.25,
                (f64::from(src_w) * 0.5).max(1.0),
                (f64::from(src_h) * 0.5).max(1.0),
            )
            .clamp_to_bounds(source);

            let moved = drag(&crop, &metrics, 0.0, 0.0);
            let tolerance = 1e-6 * (1.0 / metrics.scale).max(1.0);
            prop_assert!((moved.x - crop.x).abs() < tolerance);
            prop_assert!((moved.y - crop.y).abs() < tolerance);
        }

        /// Property: clamping always produces a rectangle fully inside the
        /// source, and clamping is idempotent.
        #[test]
        fn prop_clamp_contains_and_idempotent(
            src_w in 1u32..=8000,
            src_h in 1u32..=8000,
            x in -10000.0f64..=10000.0,
            y in -10000.0f64..=10000.0,
            w in 0.0f64..=20000.0,
            h in 0.0f64..=20000.0,
        ) {
            let source = SourceBounds::new(src_w, src_h);
            let clamped = CropRect::new(x, y, w, h).clamp_to_bounds(source);

            prop_assert!(clamped.x >= 0.0);
            prop_assert!(clamped.y >= 0.0);
            prop_assert!(clamped.x + clamped.width <= f64::from(src_w).max(1.0));
            prop_assert!(clamped.y + clamped.height <= f64::from(src_h).max(1.0));

            let again = clamped.clamp_to_bounds(source);
            prop_assert_eq!(clamped, again);
        }
    }
}
