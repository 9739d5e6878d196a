//! Snapcrop WASM - WebAssembly bindings for Snapcrop
//!
//! This crate exposes the snapcrop-core batch-cropping engine to
//! JavaScript/TypeScript: the work queue and its state machine, the
//! crop-overlay geometry, image decoding, and zip bundling.
//!
//! # Module Structure
//!
//! - `queue` - The work queue: ingestion, sizes, apply, processing, downloads
//! - `overlay` - Crop-box screen mapping and drag handling
//! - `decode` - Image decoding bindings (decode, probe, thumbnail resize)
//! - `types` - WASM-compatible wrapper types for image data
//!
//! # Usage
//!
//! ```typescript
//! import init, { WorkQueue, display_metrics } from '@snapcrop/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const queue = new WorkQueue();
//! const id = queue.add(file.name, file.size);
//! queue.set_global_resolution("1280x720");
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod logging;
mod overlay;
mod queue;
mod types;

// Re-export public types
pub use decode::{decode_image, probe_dimensions, resize_to_fit};
pub use overlay::{display_crop, display_metrics, drag_crop, shade_rects};
pub use queue::{status_help, status_label, WorkQueue};
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logging::init();
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
