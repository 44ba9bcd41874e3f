//! Incremental patch engine.
//!
//! An edit is handled in two phases. [`plan`] resolves every document lookup
//! the patch needs (positions, the inserted text, the part of the edited line
//! that was never on screen, the repaint rectangle) and decides between a
//! fast reject, an escalation to a full render, or a patch. Only then does
//! [`execute`] touch the pixel buffer, and it cannot fail: a patch either
//! completes or was never started.
//!
//! Patch steps, in order:
//! 1. snapshot the visible tail of the old last edited line;
//! 2. shift the rows below the edit by the number of added lines
//!    (at most one row-block move per edit);
//! 3. clear the stale footprint: rest of the first line, interior lines,
//!    prefix of the new last line;
//! 4. paste the tail at the new end of the edit;
//! 5. clear what the tail could not fill and redraw it from the document
//!    (characters that sat past the right edge before the edit);
//! 6. draw the new text.

use core_text::{LogicalPosition, PositionOracle};
use tracing::trace;

use crate::edit::EditDescriptor;
use crate::error::MinimapError;
use crate::pixel::{Pixel, Rect};
use crate::pixel_buffer::PixelBuffer;
use crate::render::{Ink, View, render_text};
use crate::repaint::range_rect;
use crate::scale::Scale;

/// What [`crate::Minimap::apply_edit`] did with an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Nothing visible changed (or there is no buffer yet).
    Skipped,
    /// The edited rows were patched in place.
    Patched(Rect),
    /// The visible area was rendered from scratch.
    FullRender(Rect),
}

impl PatchOutcome {
    /// Rectangle handed to the listener, if any.
    pub fn repaint(&self) -> Option<Rect> {
        match self {
            PatchOutcome::Skipped => None,
            PatchOutcome::Patched(rect) | PatchOutcome::FullRender(rect) => Some(*rect),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkipReason {
    BelowVisible,
    RightOfVisible,
    PastEndOfDocument,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::BelowVisible => "below_visible",
            SkipReason::RightOfVisible => "right_of_visible",
            SkipReason::PastEndOfDocument => "past_end_of_document",
        }
    }
}

#[derive(Debug)]
pub(crate) enum Plan {
    Skip(SkipReason),
    Escalate,
    Patch(PatchPlan),
}

/// Characters of the new last line that follow the copied tail.
#[derive(Debug)]
struct RestOfLine {
    offset: usize,
    pos: LogicalPosition,
    text: String,
}

#[derive(Debug)]
pub(crate) struct PatchPlan {
    offset: usize,
    start: LogicalPosition,
    old_end: LogicalPosition,
    new_end: LogicalPosition,
    added: isize,
    multi_line: bool,
    /// Visible columns right of the new end.
    needs_filling: usize,
    /// Tail pixels carried over from the old end.
    chars_to_copy: usize,
    new_text: String,
    rest: Option<RestOfLine>,
    pub(crate) repaint: Rect,
}

pub(crate) fn plan<D: PositionOracle + ?Sized>(
    doc: &D,
    edit: &EditDescriptor,
    view: View,
) -> Result<Plan, MinimapError> {
    let len = doc.text_length();
    let inconsistent = || MinimapError::InconsistentEdit {
        offset: edit.offset,
        old_len: edit.old_len,
        new_len: edit.new_len,
        text_len: len,
    };

    if edit.offset > len {
        let eof = doc.offset_to_position(len)?;
        if view.row(eof.line) >= view.height {
            return Ok(Plan::Skip(SkipReason::PastEndOfDocument));
        }
        return Err(inconsistent());
    }
    let new_end_offset = edit
        .offset
        .checked_add(edit.new_len)
        .filter(|end| *end <= len)
        .ok_or_else(inconsistent)?;
    let start = doc.offset_to_position(edit.offset)?;
    let new_end = doc.offset_to_position(new_end_offset)?;
    let old_end = edit.old_end;
    if new_end != edit.new_end || old_end < start {
        return Err(inconsistent());
    }

    let (width, height) = (view.width, view.height);
    if view.row(start.line) >= height {
        return Ok(Plan::Skip(SkipReason::BelowVisible));
    }
    let multi_line = !(start.line == old_end.line && old_end.line == new_end.line);
    if !multi_line && start.column >= width {
        return Ok(Plan::Skip(SkipReason::RightOfVisible));
    }

    // Under compression several lines share a row, so clearing the rows of
    // a multi-line edit would also erase its neighbours.
    let added = edit.added_lines();
    let escalate = if added != 0 {
        added < 0
            || view.scale.is_compressed()
            || Scale::for_viewport(height, doc.line_count()).is_compressed()
    } else {
        multi_line && view.scale.is_compressed()
    };
    if escalate {
        return Ok(Plan::Escalate);
    }

    let needs_filling = width.saturating_sub(new_end.column);
    let tail_visible = view.row(old_end.line) < height && view.row(new_end.line) < height;
    let chars_to_copy = if tail_visible {
        needs_filling.min(width.saturating_sub(old_end.column))
    } else {
        0
    };
    let new_text = doc.chars_in_range(edit.offset, edit.new_len)?;
    let rest = if needs_filling > chars_to_copy && view.row(new_end.line) < height {
        rest_of_line(doc, new_end_offset + chars_to_copy, new_end.line, width)?
    } else {
        None
    };

    let end = edit.offset.saturating_add(edit.old_len.max(edit.new_len));
    let mut repaint = range_rect(doc, view, edit.offset..end)?;
    if added != 0 {
        repaint.height = height.saturating_sub(repaint.y);
    }

    Ok(Plan::Patch(PatchPlan {
        offset: edit.offset,
        start,
        old_end,
        new_end,
        added,
        multi_line,
        needs_filling,
        chars_to_copy,
        new_text,
        rest,
        repaint,
    }))
}

fn rest_of_line<D: PositionOracle + ?Sized>(
    doc: &D,
    from: usize,
    line: usize,
    width: usize,
) -> Result<Option<RestOfLine>, MinimapError> {
    if from >= doc.text_length() {
        return Ok(None);
    }
    let pos = doc.offset_to_position(from)?;
    if pos.line != line || pos.column >= width {
        return Ok(None);
    }
    let text = doc
        .chars_at(from)?
        .take_while(|ch| *ch != '\n')
        .take(width - pos.column)
        .collect();
    Ok(Some(RestOfLine {
        offset: from,
        pos,
        text,
    }))
}

/// Apply a planned patch. Returns the number of rows moved.
pub(crate) fn execute(
    buffer: &mut PixelBuffer,
    empty_line: &[Pixel],
    ink: &Ink<'_>,
    view: View,
    plan: &PatchPlan,
) -> usize {
    let (width, height) = (view.width, view.height);
    let (start, old_end, new_end) = (plan.start, plan.old_end, plan.new_end);
    let start_row = view.row(start.line);
    let new_end_row = view.row(new_end.line);

    // Read before the shift below can overwrite the old end row.
    let tail = (plan.chars_to_copy > 0)
        .then(|| buffer.read_run(old_end.column, view.row(old_end.line), plan.chars_to_copy));

    let mut rows_shifted = 0;
    if plan.added != 0 {
        let from = view.row(old_end.line + 1);
        let to = view.row(new_end.line + 1);
        if from < height && to < height {
            let count = (height - from).min(height - to);
            buffer.move_rows(from, to, count, width);
            if to < from {
                for row in to + count..height {
                    buffer.clear_run(0, row, width, empty_line);
                }
            }
            rows_shifted = count;
            trace!(target: "minimap.patch", from, to, count, "rows_shifted");
        }
    }

    let first_fill = if plan.multi_line {
        width.saturating_sub(start.column)
    } else if start.column < new_end.column {
        width
            .saturating_sub(start.column)
            .min(new_end.column - start.column)
    } else {
        0
    };
    buffer.clear_run(start.column, start_row, first_fill, empty_line);

    if plan.multi_line {
        for row in view.row(start.line + 1)..new_end_row.min(height) {
            buffer.clear_run(0, row, width, empty_line);
        }
        if new_end_row < height {
            buffer.clear_run(0, new_end_row, width.min(new_end.column), empty_line);
        }
    }

    if let Some(tail) = &tail {
        buffer.write_run(new_end.column, new_end_row, tail);
    }

    if plan.needs_filling > plan.chars_to_copy && new_end_row < height {
        let from = new_end.column + plan.chars_to_copy;
        buffer.clear_run(from, new_end_row, width - from, empty_line);
        if let Some(rest) = &plan.rest {
            render_text(buffer, ink, view, rest.text.chars(), rest.offset, rest.pos);
        }
    }

    render_text(buffer, ink, view, plan.new_text.chars(), plan.offset, start);
    rows_shifted
}
