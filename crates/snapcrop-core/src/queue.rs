//! The work queue: every dropped image and its trip through the
//! crop/resize/compress pipeline.
//!
//! # State machine
//!
//! ```text
//! Queued --(size chosen)--> Pending --(apply)--> Processing --(finish)--> Ready
//!    ^                         ^                                            |
//!    +--(size cleared)---------+----(size or crop edited: output discarded)-+
//! ```
//!
//! A size or crop edit while Ready discards the stale output and reverts
//! the item to Pending. Only Pending items can enter Processing (the
//! status gate that prevents pipeline re-entry). A failed pipeline run is
//! logged and the item deliberately stays Processing; there is no retry.
//!
//! There is no cancellation either: removing an item or changing its
//! target mid-flight does not stop the pipeline. A completion for a
//! removed item is dropped silently; a completion after a retarget still
//! lands (the stored output may then predate the new target, which the
//! next apply pass corrects).

use serde::Serialize;

use crate::geometry::{CropRect, SourceBounds};
use crate::OutputSize;

/// Processing status of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// No target size chosen yet.
    Queued,
    /// Target size chosen, crop preview available, not yet applied.
    Pending,
    /// The pipeline is running for this item.
    Processing,
    /// Output blob available for download.
    Ready,
}

impl ItemStatus {
    /// Status chip label.
    pub fn label(self) -> &'static str {
        match self {
            ItemStatus::Queued => "Queued",
            ItemStatus::Pending => "Pending",
            ItemStatus::Processing => "Processing",
            ItemStatus::Ready => "Ready",
        }
    }

    /// Help line shown under the status chip.
    pub fn help(self) -> &'static str {
        match self {
            ItemStatus::Queued => "Select a size to preview the crop.",
            ItemStatus::Pending => "Preview ready. Click Apply to crop.",
            ItemStatus::Processing => "Cropping and compressing...",
            ItemStatus::Ready => "Ready to download.",
        }
    }
}

/// Whether an item follows the global size or carries its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeMode {
    #[default]
    Global,
    Custom,
}

/// A finished output: encoded JPEG plus its dimensions.
#[derive(Debug, Clone, Serialize)]
pub struct OutputBlob {
    /// Encoded JPEG bytes. Not serialized into item snapshots; the
    /// bindings hand bytes to JS separately.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Encoded size in bytes (serialized for the size-delta label).
    pub byte_len: u64,
}

impl OutputBlob {
    /// Wrap encoded bytes with their dimensions.
    pub fn new(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        let byte_len = bytes.len() as u64;
        Self {
            bytes,
            width,
            height,
            byte_len,
        }
    }
}

/// One user-submitted image and its processing state.
#[derive(Debug, Clone, Serialize)]
pub struct WorkItem {
    /// Store-assigned identifier, unique for the page's lifetime.
    pub id: u64,
    /// Original file name, used for download naming.
    pub file_name: String,
    /// Original file size in bytes, for the size-delta line.
    pub file_size: u64,
    /// Source image dimensions, known once the file has been probed.
    pub source: Option<SourceBounds>,
    pub status: ItemStatus,
    pub size_mode: SizeMode,
    /// Effective target size (global or custom, whichever applies).
    pub target: Option<OutputSize>,
    /// Current crop rectangle in source pixels (detected, then possibly
    /// drag-adjusted).
    pub crop: Option<CropRect>,
    /// Target size the current crop was computed for; detection is
    /// skipped while this matches the target.
    pub detected_for: Option<OutputSize>,
    /// Finished output, present only in Ready state.
    pub output: Option<OutputBlob>,
}

impl WorkItem {
    fn new(id: u64, file_name: String, file_size: u64) -> Self {
        Self {
            id,
            file_name,
            file_size,
            source: None,
            status: ItemStatus::Queued,
            size_mode: SizeMode::Global,
            target: None,
            crop: None,
            detected_for: None,
            output: None,
        }
    }

    /// Discard a stale output and fall back to Pending (or Queued when
    /// no target applies anymore).
    fn clear_ready_state(&mut self) {
        self.output = None;
        self.status = if self.target.is_some() {
            ItemStatus::Pending
        } else {
            ItemStatus::Queued
        };
    }
}

/// Per-status item counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub queued: usize,
    pub pending: usize,
    pub processing: usize,
    pub ready: usize,
}

/// Visual tone of the file-counter chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryTone {
    /// Work is queued or running.
    Info,
    /// Items are waiting for an apply.
    Warn,
    /// Everything ready.
    Success,
}

/// File-counter chip content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub text: String,
    pub tone: SummaryTone,
}

/// Apply-button state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyControl {
    pub enabled: bool,
    pub label: String,
}

/// Ordered store of work items, keyed by a monotonically increasing id.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Vec<WorkItem>,
    next_id: u64,
    /// Last applied/previewed global size; new Global-mode items pick
    /// it up when it exists.
    global_size: Option<OutputSize>,
}

impl WorkQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a file: creates a Queued item and returns its id. If a
    /// global size is already in effect the item goes straight to
    /// Pending with that target, like files dropped after a size was
    /// picked.
    pub fn add(&mut self, file_name: &str, file_size: u64) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        let mut item = WorkItem::new(id, file_name.to_string(), file_size);
        if let Some(size) = self.global_size {
            item.target = Some(size);
            item.status = ItemStatus::Pending;
        }
        self.items.push(item);
        id
    }

    /// Remove an item. Any in-flight pipeline run keeps going; its
    /// completion will be dropped by [`WorkQueue::finish`].
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Number of items in the store.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no items remain.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in insertion order.
    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    /// Look up an item by id.
    pub fn get(&self, id: u64) -> Option<&WorkItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut WorkItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// The global size currently in effect, if any.
    pub fn global_size(&self) -> Option<OutputSize> {
        self.global_size
    }

    /// Set the global target size (dropdown or custom width/height).
    ///
    /// Every Global-mode item adopts it: Ready items at a different size
    /// lose their output and drop to Pending; Queued items become
    /// Pending; Ready items already at this exact size stay Ready.
    /// Custom-mode items are untouched. Processing items are retargeted
    /// but keep running (no cancellation).
    pub fn set_global_size(&mut self, size: OutputSize) {
        let changed = self.global_size != Some(size);
        self.global_size = Some(size);
        for item in &mut self.items {
            if item.size_mode == SizeMode::Custom {
                continue;
            }
            if changed && item.status == ItemStatus::Ready {
                item.target = Some(size);
                item.clear_ready_state();
                continue;
            }
            if item.status == ItemStatus::Queued || changed {
                item.target = Some(size);
                if item.status == ItemStatus::Queued {
                    item.status = ItemStatus::Pending;
                }
            }
        }
    }

    /// Give an item its own target size, overriding the global one.
    ///
    /// Any existing output is discarded, even when the size is the one
    /// the item already had: the per-item controls always schedule a
    /// fresh pass.
    pub fn set_item_size(&mut self, id: u64, size: OutputSize) -> bool {
        let Some(item) = self.get_mut(id) else {
            return false;
        };
        item.size_mode = SizeMode::Custom;
        item.target = Some(size);
        if item.status == ItemStatus::Ready {
            item.clear_ready_state();
        } else if item.status != ItemStatus::Processing {
            item.status = ItemStatus::Pending;
        }
        true
    }

    /// Put an item back on the global size ("Follow global" reset).
    ///
    /// With no global size in effect the item returns to Queued. Like
    /// [`WorkQueue::set_item_size`], a Ready item always loses its
    /// output, even when the global size matches the item's old target.
    pub fn reset_item_size(&mut self, id: u64) -> bool {
        let global = self.global_size;
        let Some(item) = self.get_mut(id) else {
            return false;
        };
        item.size_mode = SizeMode::Global;
        item.target = global;
        if item.status == ItemStatus::Ready {
            item.clear_ready_state();
        } else if item.status != ItemStatus::Processing {
            item.status = if global.is_some() {
                ItemStatus::Pending
            } else {
                ItemStatus::Queued
            };
        }
        true
    }

    /// Record the source bounds and detected crop for an item, and the
    /// size the detection was run for. Does not change the status.
    pub fn record_detection(
        &mut self,
        id: u64,
        source: SourceBounds,
        crop: CropRect,
        for_size: OutputSize,
    ) -> bool {
        let Some(item) = self.get_mut(id) else {
            return false;
        };
        item.source = Some(source);
        item.crop = Some(crop.clamp_to_bounds(source));
        item.detected_for = Some(for_size);
        true
    }

    /// Whether detection needs to (re)run for the item's current target.
    pub fn needs_detection(&self, id: u64) -> bool {
        match self.get(id) {
            Some(item) => match item.target {
                Some(target) => item.detected_for != Some(target) || item.crop.is_none(),
                None => false,
            },
            None => true,
        }
    }

    /// Manually adjust an item's crop rectangle (drag edit).
    ///
    /// The rectangle is clamped to the source bounds. A Ready item loses
    /// its output and reverts to Pending. Items whose source is still
    /// unknown are left alone (nothing to clamp against, and no overlay
    /// could have produced the edit).
    pub fn set_crop(&mut self, id: u64, crop: CropRect) -> bool {
        let Some(item) = self.get_mut(id) else {
            return false;
        };
        let Some(source) = item.source else {
            return false;
        };
        item.crop = Some(crop.clamp_to_bounds(source));
        // The adjusted crop belongs to the current target; don't let the
        // next preview pass overwrite it with a fresh detection.
        item.detected_for = item.target;
        if item.status == ItemStatus::Ready {
            item.clear_ready_state();
        }
        true
    }

    /// Move a Pending item into Processing.
    ///
    /// Returns the item's target on success. Any other starting status
    /// is rejected; this is the re-entry gate.
    pub fn begin(&mut self, id: u64) -> Option<OutputSize> {
        let item = self.get_mut(id)?;
        if item.status != ItemStatus::Pending {
            return None;
        }
        let target = item.target?;
        item.status = ItemStatus::Processing;
        Some(target)
    }

    /// Land a finished output: Processing -> Ready.
    ///
    /// A completion for a removed item, or for an item no longer in
    /// Processing, is dropped silently (the no-cancellation rule means
    /// such completions are expected).
    pub fn finish(&mut self, id: u64, output: OutputBlob) -> bool {
        let Some(item) = self.get_mut(id) else {
            return false;
        };
        if item.status != ItemStatus::Processing {
            return false;
        }
        item.output = Some(output);
        item.status = ItemStatus::Ready;
        true
    }

    /// Record a pipeline failure.
    ///
    /// The item stays in Processing: there is no retry and no user-facing
    /// failure state, only the diagnostic log.
    pub fn fail(&mut self, id: u64, error: &str) {
        match self.get(id) {
            Some(item) => {
                log::error!("processing failed for {} (item {}): {}", item.file_name, id, error);
            }
            None => {
                log::error!("processing failed for removed item {}: {}", id, error);
            }
        }
    }

    /// Plan an apply pass: move every item that has an effective target
    /// into Processing and return `(id, target)` pairs for the caller to
    /// run the pipeline on.
    ///
    /// Ready items already at their effective size are skipped, as are
    /// items with no size in effect and items already Processing.
    pub fn apply(&mut self) -> Vec<(u64, OutputSize)> {
        let global = self.global_size;
        let mut plan = Vec::new();
        for item in &mut self.items {
            let effective = match item.size_mode {
                SizeMode::Custom => item.target,
                SizeMode::Global => global,
            };
            let Some(size) = effective else {
                continue;
            };
            match item.status {
                ItemStatus::Ready if item.target == Some(size) => continue,
                ItemStatus::Processing => continue,
                ItemStatus::Ready => {
                    item.target = Some(size);
                    item.clear_ready_state();
                }
                _ => {
                    item.target = Some(size);
                }
            }
            item.status = ItemStatus::Processing;
            plan.push((item.id, size));
        }
        plan
    }

    /// Count items per status.
    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for item in &self.items {
            match item.status {
                ItemStatus::Queued => counts.queued += 1,
                ItemStatus::Pending => counts.pending += 1,
                ItemStatus::Processing => counts.processing += 1,
                ItemStatus::Ready => counts.ready += 1,
            }
        }
        counts
    }

    /// Number of Ready items.
    pub fn ready_count(&self) -> usize {
        self.status_counts().ready
    }

    /// Number of Pending items.
    pub fn pending_count(&self) -> usize {
        self.status_counts().pending
    }

    /// The bulk-download control is shown only when something is Ready.
    pub fn show_download_all(&self) -> bool {
        self.ready_count() > 0
    }

    /// File-counter chip text and tone; `None` when the queue is empty
    /// (the chip is hidden).
    pub fn summary(&self) -> Option<Summary> {
        if self.items.is_empty() {
            return None;
        }
        let counts = self.status_counts();
        let total = self.items.len();
        let summary = if counts.processing > 0 {
            Summary {
                text: format!("Cropping {} {}", counts.processing, plural(total)),
                tone: SummaryTone::Info,
            }
        } else if counts.pending > 0 {
            Summary {
                text: format!("{} {} ready to apply", counts.pending, plural(total)),
                tone: SummaryTone::Warn,
            }
        } else if counts.ready > 0 {
            Summary {
                text: format!("{} {} ready", counts.ready, plural(total)),
                tone: SummaryTone::Success,
            }
        } else {
            Summary {
                text: format!("{} {} ready for cropping", counts.queued, plural(total)),
                tone: SummaryTone::Info,
            }
        };
        Some(summary)
    }

    /// Apply-button label and enablement: enabled with the pending count
    /// in the label, disabled otherwise.
    pub fn apply_label(&self) -> ApplyControl {
        let pending = self.pending_count();
        if pending > 0 {
            ApplyControl {
                enabled: true,
                label: format!("Apply resolution ({pending})"),
            }
        } else {
            ApplyControl {
                enabled: false,
                label: "Apply resolution".to_string(),
            }
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count > 1 {
        "images"
    } else {
        "image"
    }
}
