//! Snapcrop Core - batch smart-crop engine
//!
//! This crate holds everything the Snapcrop page decides on the Rust side:
//! crop-rectangle geometry and overlay mapping, saliency-based auto-crop
//! detection, the per-image work queue and its state machine, the
//! crop/resize/compress pipeline, and ZIP bundling of finished outputs.
//!
//! The browser (via the `snapcrop-wasm` bindings) only moves bytes and
//! pointer events in and out; no cropping decision lives in JavaScript.

pub mod archive;
pub mod decode;
pub mod detect;
pub mod encode;
pub mod geometry;
pub mod pipeline;
pub mod queue;
pub mod transform;

use serde::{Deserialize, Serialize};

pub use archive::{bundle_ready, download_file_name, size_delta_label, ARCHIVE_FILE_NAME};
pub use decode::DecodedImage;
pub use geometry::{CropRect, DisplayMetrics, SourceBounds};
pub use pipeline::{process, PipelineError, PipelineOutput};
pub use queue::{ItemStatus, OutputBlob, SizeMode, WorkItem, WorkQueue};

/// Target output dimensions for a crop, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSize {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl OutputSize {
    /// Create a new output size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse a `"1280x720"`-style resolution string.
    ///
    /// Returns `None` for anything that is not two positive integers
    /// separated by a single `x`.
    pub fn parse(value: &str) -> Option<Self> {
        let (w, h) = value.split_once('x')?;
        let width: u32 = w.trim().parse().ok()?;
        let height: u32 = h.trim().parse().ok()?;
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height })
    }

    /// Render as `"WIDTHxHEIGHT"`, the dropdown's value format.
    pub fn label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Aspect ratio (width / height).
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}
