//! Patch engine counters.
//!
//! Records which strategy each request actually took (fast reject,
//! incremental patch, escalation to a full render) so hosts and tests can
//! confirm that single-line edits never rescan the document.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct PatchMetrics {
    /// Full renders of the visible area, whatever triggered them.
    pub full_rerenders: AtomicU64,
    /// Edits applied by mutating only the edited rows.
    pub incremental_patches: AtomicU64,
    /// Edits that changed nothing on screen.
    pub fast_rejects: AtomicU64,
    /// Edits that fell back to a full render (line removal or compressed scale).
    pub escalations: AtomicU64,
    /// Rows moved by row-block shifts.
    pub rows_shifted: AtomicU64,
    /// Pixel buffer allocations.
    pub reallocations: AtomicU64,
    /// Failures delivered to the listener.
    pub errors_reported: AtomicU64,
    /// Duration (ns) of the most recent full render.
    pub last_full_render_ns: AtomicU64,
    /// Duration (ns) of the most recent incremental patch.
    pub last_patch_ns: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchMetricsSnapshot {
    pub full_rerenders: u64,
    pub incremental_patches: u64,
    pub fast_rejects: u64,
    pub escalations: u64,
    pub rows_shifted: u64,
    pub reallocations: u64,
    pub errors_reported: u64,
    pub last_full_render_ns: u64,
    pub last_patch_ns: u64,
}

impl PatchMetrics {
    pub fn snapshot(&self) -> PatchMetricsSnapshot {
        PatchMetricsSnapshot {
            full_rerenders: self.full_rerenders.load(Ordering::Relaxed),
            incremental_patches: self.incremental_patches.load(Ordering::Relaxed),
            fast_rejects: self.fast_rejects.load(Ordering::Relaxed),
            escalations: self.escalations.load(Ordering::Relaxed),
            rows_shifted: self.rows_shifted.load(Ordering::Relaxed),
            reallocations: self.reallocations.load(Ordering::Relaxed),
            errors_reported: self.errors_reported.load(Ordering::Relaxed),
            last_full_render_ns: self.last_full_render_ns.load(Ordering::Relaxed),
            last_patch_ns: self.last_patch_ns.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    pub(crate) fn record_ns(slot: &AtomicU64, ns: u128) {
        slot.store(u64::try_from(ns).unwrap_or(u64::MAX), Ordering::Relaxed);
    }
}
