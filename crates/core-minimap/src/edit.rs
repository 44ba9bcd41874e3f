//! Two-phase edit capture.
//!
//! The old end position of an edit can only be resolved while the document
//! still holds the old text, so the host reports every change twice: once
//! before mutating (`before_change`) and once after (`after_change`).

use core_text::{LogicalPosition, PositionOracle};

use crate::error::MinimapError;

/// One atomic text mutation with its boundary positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditDescriptor {
    pub offset: usize,
    pub old_len: usize,
    pub new_len: usize,
    /// Position of `offset + old_len` before the change.
    pub old_end: LogicalPosition,
    /// Position of `offset + new_len` after the change.
    pub new_end: LogicalPosition,
}

impl EditDescriptor {
    pub const fn new(
        offset: usize,
        old_len: usize,
        new_len: usize,
        old_end: LogicalPosition,
        new_end: LogicalPosition,
    ) -> Self {
        Self {
            offset,
            old_len,
            new_len,
            old_end,
            new_end,
        }
    }

    /// Logical lines gained (positive) or lost (negative).
    pub fn added_lines(&self) -> isize {
        self.new_end.line as isize - self.old_end.line as isize
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingEdit {
    offset: usize,
    old_len: usize,
    old_end: LogicalPosition,
}

#[derive(Debug, Default)]
pub struct EditTracker {
    pending: Option<PendingEdit>,
}

impl EditTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the end of the range about to be replaced.
    pub fn before_change<D: PositionOracle + ?Sized>(
        &mut self,
        doc: &D,
        offset: usize,
        old_len: usize,
    ) -> Result<(), MinimapError> {
        let old_end = doc.offset_to_position(offset.saturating_add(old_len))?;
        self.pending = Some(PendingEdit {
            offset,
            old_len,
            old_end,
        });
        Ok(())
    }

    /// Resolve the new end and produce the descriptor. The arguments must
    /// repeat the ones given to [`EditTracker::before_change`].
    pub fn after_change<D: PositionOracle + ?Sized>(
        &mut self,
        doc: &D,
        offset: usize,
        old_len: usize,
        new_len: usize,
    ) -> Result<EditDescriptor, MinimapError> {
        let pending = self
            .pending
            .take()
            .filter(|p| p.offset == offset && p.old_len == old_len)
            .ok_or(MinimapError::MissingBeforeChange)?;
        let new_end = doc.offset_to_position(offset.saturating_add(new_len))?;
        Ok(EditDescriptor::new(
            offset,
            old_len,
            new_len,
            pending.old_end,
            new_end,
        ))
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
