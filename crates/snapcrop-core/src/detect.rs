//! Saliency-based auto-crop detection.
//!
//! When an item gets a target size, the page needs a starting crop
//! rectangle before the user has touched anything. The candidate is the
//! largest rectangle with the target's aspect ratio that fits the
//! source; this module decides where to put it.
//!
//! The source is downscaled to a bounded analysis image, a Canny edge
//! map is computed over it, and a sparse grid of candidate windows is
//! scored on edge density plus color saturation with a mild center
//! bias. The best window, mapped back to source coordinates, wins.
//! Small sources skip the analysis entirely and take a centered crop.
//!
//! Detection is deterministic: ties keep the first (top-left-most)
//! grid position, and no randomness is involved anywhere.

use image::{GrayImage, RgbImage};
use imageproc::edges::canny;

use crate::decode::{resize_to_fit, DecodedImage, FilterType};
use crate::geometry::{CropRect, SourceBounds};
use crate::OutputSize;

/// Longest edge of the downscaled analysis image.
const MAX_ANALYSIS_EDGE: u32 = 800;

/// Analysis images at or below this edge skip scoring and center-crop.
const SMALL_ANALYSIS_EDGE: u32 = 200;

/// Candidate positions per axis (GRID_SIZE^2 windows scored).
const GRID_SIZE: u32 = 5;

const CANNY_LOW_THRESHOLD: f32 = 30.0;
const CANNY_HIGH_THRESHOLD: f32 = 80.0;

/// Weight of mean color saturation relative to edge density.
const SATURATION_WEIGHT: f64 = 0.3;

/// Weight of the center-position bias. Small on purpose: it only
/// decides between windows with near-identical content (e.g. flat
/// images), where a centered crop is what a person would pick.
const CENTER_BIAS: f64 = 0.05;

/// Detect the best crop rectangle for a target output size.
///
/// The returned rectangle has the target's aspect ratio, is as large as
/// the source allows, and always lies fully within the source bounds.
pub fn auto_crop(image: &DecodedImage, target: OutputSize) -> CropRect {
    let source = image.bounds();
    let (crop_w, crop_h) = fitted_crop_size(source, target);

    let analysis = match resize_to_fit(image, MAX_ANALYSIS_EDGE, FilterType::Bilinear) {
        Ok(img) => img,
        Err(_) => return centered(source, crop_w, crop_h),
    };

    if analysis.width <= SMALL_ANALYSIS_EDGE || analysis.height <= SMALL_ANALYSIS_EDGE {
        return centered(source, crop_w, crop_h);
    }

    let Some(rgb) = analysis.to_rgb_image() else {
        return centered(source, crop_w, crop_h);
    };
    let gray = image::DynamicImage::ImageRgb8(rgb.clone()).to_luma8();
    let edges = canny(&gray, CANNY_LOW_THRESHOLD, CANNY_HIGH_THRESHOLD);

    // Scale between source and analysis coordinates
    let scale = f64::from(source.width) / f64::from(analysis.width);
    let window_w = ((crop_w / scale).round() as u32).clamp(1, analysis.width);
    let window_h = ((crop_h / scale).round() as u32).clamp(1, analysis.height);

    let (best_x, best_y) = best_window(&edges, &rgb, window_w, window_h);

    CropRect::new(
        f64::from(best_x) * scale,
        f64::from(best_y) * scale,
        crop_w,
        crop_h,
    )
    .clamp_to_bounds(source)
}

/// Largest rectangle with the target aspect that fits the source.
fn fitted_crop_size(source: SourceBounds, target: OutputSize) -> (f64, f64) {
    let src_w = f64::from(source.width);
    let src_h = f64::from(source.height);
    let target_ratio = target.aspect();

    if src_w / src_h > target_ratio {
        (src_h * target_ratio, src_h)
    } else {
        (src_w, src_w / target_ratio)
    }
}

/// Center a crop of the given size in the source.
fn centered(source: SourceBounds, crop_w: f64, crop_h: f64) -> CropRect {
    CropRect::new(
        (f64::from(source.width) - crop_w) / 2.0,
        (f64::from(source.height) - crop_h) / 2.0,
        crop_w,
        crop_h,
    )
    .clamp_to_bounds(source)
}

/// Scan a sparse grid of window positions and return the best-scoring
/// top-left corner, in analysis coordinates.
fn best_window(edges: &GrayImage, rgb: &RgbImage, window_w: u32, window_h: u32) -> (u32, u32) {
    let (width, height) = edges.dimensions();
    let width_range = width.saturating_sub(window_w);
    let height_range = height.saturating_sub(window_h);
    let steps = GRID_SIZE.saturating_sub(1).max(1);
    let x_step = width_range / steps;
    let y_step = height_range / steps;

    let mut best_score = f64::NEG_INFINITY;
    let mut best = (0u32, 0u32);

    for grid_y in 0..GRID_SIZE {
        let y = (grid_y * y_step).min(height_range);
        for grid_x in 0..GRID_SIZE {
            let x = (grid_x * x_step).min(width_range);
            let score = window_score(edges, rgb, x, y, window_w, window_h)
                + CENTER_BIAS * centrality(x, y, window_w, window_h, width, height);
            if score > best_score {
                best_score = score;
                best = (x, y);
            }
        }
    }

    best
}

/// Edge density plus weighted mean saturation, sampled at stride 2.
fn window_score(edges: &GrayImage, rgb: &RgbImage, x: u32, y: u32, w: u32, h: u32) -> f64 {
    let mut samples = 0u64;
    let mut edge_hits = 0u64;
    let mut saturation_sum = 0.0f64;

    let mut py = y;
    while py < y + h {
        let mut px = x;
        while px < x + w {
            samples += 1;
            if edges.get_pixel(px, py)[0] > 0 {
                edge_hits += 1;
            }
            let p = rgb.get_pixel(px, py).0;
            let max = p[0].max(p[1]).max(p[2]);
            let min = p[0].min(p[1]).min(p[2]);
            saturation_sum += f64::from(max - min) / 255.0;
            px += 2;
        }
        py += 2;
    }

    if samples == 0 {
        return 0.0;
    }
    let edge_density = edge_hits as f64 / samples as f64;
    let mean_saturation = saturation_sum / samples as f64;
    edge_density + SATURATION_WEIGHT * mean_saturation
}

/// 1.0 for a window centered in the image, falling off linearly to 0.0
/// at the farthest possible offset.
fn centrality(x: u32, y: u32, w: u32, h: u32, img_w: u32, img_h: u32) -> f64 {
    let window_cx = f64::from(x) + f64::from(w) / 2.0;
    let window_cy = f64::from(y) + f64::from(h) / 2.0;
    let img_cx = f64::from(img_w) / 2.0;
    let img_cy = f64::from(img_h) / 2.0;
    let max_dx = (f64::from(img_w) - f64::from(w)) / 2.0;
    let max_dy = (f64::from(img_h) - f64::from(h)) / 2.0;

    let dx = if max_dx > 0.0 {
        (window_cx - img_cx).abs() / max_dx
    } else {
        0.0
    };
    let dy = if max_dy > 0.0 {
        (window_cy - img_cy).abs() / max_dy
    } else {
        0.0
    };
    (1.0 - (dx + dy) / 2.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_image(width: u32, height: u32, value: u8) -> DecodedImage {
        DecodedImage::new(width, height, vec![value; (width * height * 3) as usize])
    }

    /// Flat gray left half, high-contrast checkerboard right half.
    fn half_textured_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = if x >= width / 2 {
                    if (x / 8 + y / 8) % 2 == 0 {
                        255
                    } else {
                        0
                    }
                } else {
                    128
                };
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_small_source_takes_centered_crop() {
        let img = solid_image(150, 100, 90);
        let crop = auto_crop(&img, OutputSize::new(50, 50));
        assert_eq!(crop.width, 100.0);
        assert_eq!(crop.height, 100.0);
        assert!((crop.x - 25.0).abs() < 1e-9);
        assert_eq!(crop.y, 0.0);
    }

    #[test]
    fn test_flat_image_centers() {
        let img = solid_image(600, 400, 128);
        let crop = auto_crop(&img, OutputSize::new(100, 100));
        assert_eq!(crop.width, 400.0);
        assert_eq!(crop.height, 400.0);
        // Only the center bias differs between windows on a flat image
        assert!((crop.x - 100.0).abs() < 1.0);
        assert_eq!(crop.y, 0.0);
    }

    #[test]
    fn test_crop_gravitates_to_texture() {
        let img = half_textured_image(600, 400);
        let crop = auto_crop(&img, OutputSize::new(100, 100));
        assert_eq!(crop.width, 400.0);
        // The checkerboard half is on the right; the crop should lean there
        assert!(crop.x >= 150.0, "crop.x = {}", crop.x);
    }

    #[test]
    fn test_crop_matches_target_aspect() {
        let img = solid_image(400, 600, 40);
        let crop = auto_crop(&img, OutputSize::new(100, 50));
        assert_eq!(crop.width, 400.0);
        assert_eq!(crop.height, 200.0);
    }

    #[test]
    fn test_crop_for_oversized_target_spans_source() {
        let img = solid_image(100, 100, 40);
        let crop = auto_crop(&img, OutputSize::new(500, 500));
        assert_eq!(crop.width, 100.0);
        assert_eq!(crop.height, 100.0);
        assert_eq!(crop.x, 0.0);
        assert_eq!(crop.y, 0.0);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let img = half_textured_image(600, 400);
        let a = auto_crop(&img, OutputSize::new(200, 100));
        let b = auto_crop(&img, OutputSize::new(200, 100));
        assert_eq!(a, b);
    }

    #[test]
    fn test_crop_always_within_bounds() {
        let img = half_textured_image(640, 480);
        for target in [
            OutputSize::new(100, 100),
            OutputSize::new(1920, 1080),
            OutputSize::new(50, 200),
        ] {
            let crop = auto_crop(&img, target);
            assert!(crop.x >= 0.0);
            assert!(crop.y >= 0.0);
            assert!(crop.x + crop.width <= 640.0);
            assert!(crop.y + crop.height <= 480.0);
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
