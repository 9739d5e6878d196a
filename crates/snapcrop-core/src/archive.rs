//! Download naming, human-readable sizes, and the bulk zip bundle.

use std::io::{Cursor, Write};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::queue::{ItemStatus, WorkQueue};
use crate::OutputSize;

/// Download name of the bulk archive.
pub const ARCHIVE_FILE_NAME: &str = "all_cropped_images.zip";

/// Errors from building the bulk archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("no finished images to bundle")]
    NothingReady,

    #[error("failed to write archive: {0}")]
    Write(#[from] zip::result::ZipError),

    #[error("failed to write archive: {0}")]
    Io(#[from] std::io::Error),
}

/// Strip the final extension from a file name; a name without one is
/// returned unchanged.
fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        // A dot inside a path-like segment is not an extension
        Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => stem,
        _ => name,
    }
}

/// Download name for a single finished image:
/// `{stem}_{width}x{height}px.jpg`.
pub fn download_file_name(original_name: &str, size: OutputSize) -> String {
    format!(
        "{}_{}x{}px.jpg",
        file_stem(original_name),
        size.width,
        size.height
    )
}

/// Entry name inside the bulk archive: `{stem}_{width}x{height}.jpg`.
/// Differs from [`download_file_name`] in dropping the `px` suffix.
pub fn archive_entry_name(original_name: &str, size: OutputSize) -> String {
    format!(
        "{}_{}x{}.jpg",
        file_stem(original_name),
        size.width,
        size.height
    )
}

/// Human-readable byte count: `512 B`, `1.5 KB`, `2.05 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        return format!("{kb:.1} KB");
    }
    format!("{:.2} MB", kb / 1024.0)
}

/// The per-item size line: `File size: 2.1 MB → 340.5 KB (84% reduced)`.
///
/// With no output yet the arrow points at an em dash. An output larger
/// than the original reads `increased` instead of `reduced`.
pub fn size_delta_label(original: u64, output: Option<u64>) -> String {
    let Some(output) = output else {
        return format!("File size: {} → —", format_file_size(original));
    };
    let delta = if original == 0 {
        0
    } else {
        ((1.0 - output as f64 / original as f64) * 100.0).round() as i64
    };
    let direction = if delta >= 0 { "reduced" } else { "increased" };
    format!(
        "File size: {} → {} ({}% {})",
        format_file_size(original),
        format_file_size(output),
        delta.abs(),
        direction
    )
}

/// Build a deflate-compressed zip of the given `(entry_name, bytes)`
/// pairs.
///
/// # Errors
///
/// Returns [`ArchiveError::NothingReady`] for an empty list, and
/// propagates writer failures.
pub fn bundle(entries: &[(String, &[u8])]) -> Result<Vec<u8>, ArchiveError> {
    if entries.is_empty() {
        return Err(ArchiveError::NothingReady);
    }
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in entries {
        writer.start_file(name, options)?;
        writer.write_all(bytes)?;
    }
    Ok(writer.finish()?.into_inner())
}

/// Bundle every Ready item in the queue into the bulk archive.
pub fn bundle_ready(queue: &WorkQueue) -> Result<Vec<u8>, ArchiveError> {
    let entries: Vec<(String, &[u8])> = queue
        .items()
        .iter()
        .filter(|item| item.status == ItemStatus::Ready)
        .filter_map(|item| {
            let output = item.output.as_ref()?;
            let size = OutputSize::new(output.width, output.height);
            Some((
                archive_entry_name(&item.file_name, size),
                output.bytes.as_slice(),
            ))
        })
        .collect();
    bundle(&entries)
}
