//! Image decoding for Snapcrop.
//!
//! This module provides functionality for:
//! - Decoding dropped image files (JPEG, PNG, WebP - format is guessed)
//! - Probing dimensions without a full decode
//! - Resizing for the downscale stage of the pipeline and for analysis
//!
//! # Architecture
//!
//! Decoding happens inside the WASM module, so everything here is
//! synchronous and single-threaded; the browser keeps the UI responsive
//! by calling in from a Web Worker.

mod load;
mod resize;
mod types;

pub use load::{decode_image, probe_dimensions};
pub use resize::{resize, resize_to_fit};
pub use types::{DecodeError, DecodedImage, FilterType};
