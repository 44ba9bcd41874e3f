//! The minimap facade: one pixel buffer kept in sync with one document.
//!
//! All mutation and painting go through a single mutex, so a paint can never
//! observe a half-applied edit. Listener callbacks run after the lock is
//! released.

use std::ops::Range;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use core_glyph::{CoverageLookup, GlobalCoverage};
use core_text::{LogicalPosition, PositionOracle};
use tracing::{debug, trace, warn};

use crate::cell_renderer::CellRenderer;
use crate::edit::EditDescriptor;
use crate::error::MinimapError;
use crate::lifecycle::{CapacityDecision, MinimapState, decide};
use crate::listener::{MinimapId, MinimapListener, ViewportMapper};
use crate::metrics::{PatchMetrics, PatchMetricsSnapshot};
use crate::patch::{self, PatchOutcome, Plan};
use crate::pixel::Rect;
use crate::pixel_buffer::PixelBuffer;
use crate::render::{Ink, render_document};
use crate::repaint;
use crate::scale::Scale;
use crate::surface::{ImageSurface, Surface};

/// Extra pixels allocated beyond the visible size, per axis.
pub const DEFAULT_SLACK: usize = 40;

#[derive(Clone)]
pub struct MinimapOptions {
    pub slack: usize,
    pub renderer: CellRenderer,
    pub coverage: Arc<dyn CoverageLookup>,
}

impl Default for MinimapOptions {
    fn default() -> Self {
        Self {
            slack: DEFAULT_SLACK,
            renderer: CellRenderer::default(),
            coverage: Arc::new(GlobalCoverage),
        }
    }
}

pub struct Minimap {
    id: MinimapId,
    state: Mutex<MinimapState>,
    renderer: CellRenderer,
    coverage: Arc<dyn CoverageLookup>,
    listener: Arc<dyn MinimapListener>,
    metrics: PatchMetrics,
    slack: usize,
}

impl Minimap {
    pub fn new(listener: Arc<dyn MinimapListener>) -> Self {
        Self::with_options(listener, MinimapOptions::default())
    }

    pub fn with_options(listener: Arc<dyn MinimapListener>, options: MinimapOptions) -> Self {
        let id = MinimapId::next();
        debug!(target: "minimap.lifecycle", %id, slack = options.slack, renderer = ?options.renderer, "created");
        Self {
            id,
            state: Mutex::new(MinimapState::new()),
            renderer: options.renderer,
            coverage: options.coverage,
            listener,
            metrics: PatchMetrics::default(),
            slack: options.slack,
        }
    }

    pub fn id(&self) -> MinimapId {
        self.id
    }

    pub fn metrics(&self) -> &PatchMetrics {
        &self.metrics
    }

    pub fn metrics_snapshot(&self) -> PatchMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Make the buffer able to show a `width x height` area of `doc`.
    ///
    /// Returns `true` when the content was regenerated (new allocation,
    /// visible area grew, scale changed, or the buffer was stale).
    pub fn ensure_capacity<D: PositionOracle + ?Sized>(
        &self,
        doc: &D,
        width: usize,
        height: usize,
    ) -> Result<bool, MinimapError> {
        let result = {
            let mut guard = self.lock_state();
            self.ensure_capacity_locked(&mut guard, doc, width, height)
        };
        result.inspect_err(|err| self.report(err))
    }

    fn ensure_capacity_locked<D: PositionOracle + ?Sized>(
        &self,
        state: &mut MinimapState,
        doc: &D,
        width: usize,
        height: usize,
    ) -> Result<bool, MinimapError> {
        let previous = state.view;
        let decision = decide(
            state.buffer.as_ref(),
            state.stale,
            previous,
            width,
            height,
            doc.line_count(),
        );
        if decision == CapacityDecision::Allocate {
            state.buffer = None;
            let alloc_width = width.saturating_add(self.slack);
            let alloc_height = height.saturating_add(self.slack);
            state.buffer = Some(PixelBuffer::try_new(alloc_width, alloc_height)?);
            PatchMetrics::bump(&self.metrics.reallocations, 1);
            debug!(
                target: "minimap.lifecycle",
                id = %self.id,
                alloc_width,
                alloc_height,
                "buffer_allocated"
            );
        }
        state.sync_empty_line(width);
        state.view.width = width;
        state.view.height = height;

        match decision {
            CapacityDecision::Keep => Ok(false),
            CapacityDecision::Allocate => {
                self.rerender_locked(state, doc)?;
                Ok(true)
            }
            CapacityDecision::Rerender(cause) => {
                debug!(target: "minimap.lifecycle", id = %self.id, cause = cause.as_str(), width, height, "rerender_required");
                self.rerender_locked(state, doc)?;
                Ok(true)
            }
        }
    }

    /// Clear the visible area and draw the whole document, recomputing the scale.
    /// No-op without a buffer.
    pub fn full_rerender<D: PositionOracle + ?Sized>(&self, doc: &D) -> Result<(), MinimapError> {
        let result = {
            let mut guard = self.lock_state();
            self.rerender_locked(&mut guard, doc)
        };
        result.inspect_err(|err| self.report(err))
    }

    fn rerender_locked<D: PositionOracle + ?Sized>(
        &self,
        state: &mut MinimapState,
        doc: &D,
    ) -> Result<(), MinimapError> {
        let started = Instant::now();
        let scale = Scale::for_viewport(state.view.height, doc.line_count());
        state.view.scale = scale;
        let view = state.view;
        let Some(buffer) = state.buffer.as_mut() else {
            return Ok(());
        };
        state.stale = true;
        render_document(buffer, &self.ink(), view, doc)?;
        state.stale = false;

        PatchMetrics::bump(&self.metrics.full_rerenders, 1);
        PatchMetrics::record_ns(
            &self.metrics.last_full_render_ns,
            started.elapsed().as_nanos(),
        );
        debug!(
            target: "minimap.lifecycle",
            id = %self.id,
            width = view.width,
            height = view.height,
            lines = doc.line_count(),
            %scale,
            "full_rerender"
        );
        Ok(())
    }

    /// Bring the buffer in line with one document change. `doc` must already
    /// contain the change; `edit.old_end` must have been captured before it.
    ///
    /// The repaint rectangle (if any) goes to the listener; failures go to the
    /// listener's error handler and are returned, and the next edit redraws
    /// everything.
    pub fn apply_edit<D: PositionOracle + ?Sized>(
        &self,
        doc: &D,
        edit: &EditDescriptor,
    ) -> Result<PatchOutcome, MinimapError> {
        let result = {
            let mut guard = self.lock_state();
            self.apply_edit_locked(&mut guard, doc, edit)
        };
        match result {
            Ok(outcome) => {
                if let Some(rect) = outcome.repaint() {
                    self.listener.should_repaint(self.id, rect);
                }
                Ok(outcome)
            }
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    fn apply_edit_locked<D: PositionOracle + ?Sized>(
        &self,
        state: &mut MinimapState,
        doc: &D,
        edit: &EditDescriptor,
    ) -> Result<PatchOutcome, MinimapError> {
        if state.buffer.is_none() {
            trace!(target: "minimap.patch", id = %self.id, "no_buffer");
            return Ok(PatchOutcome::Skipped);
        }
        if state.stale {
            debug!(target: "minimap.patch", id = %self.id, "stale_recovery");
            self.rerender_locked(state, doc)?;
            return Ok(PatchOutcome::FullRender(state.view.area()));
        }

        let started = Instant::now();
        // The document has already changed: a rejected edit leaves the buffer
        // behind it until the next full render.
        let plan = match patch::plan(doc, edit, state.view) {
            Ok(plan) => plan,
            Err(err) => {
                state.stale = true;
                return Err(err);
            }
        };
        match plan {
            Plan::Skip(reason) => {
                PatchMetrics::bump(&self.metrics.fast_rejects, 1);
                trace!(
                    target: "minimap.patch",
                    id = %self.id,
                    offset = edit.offset,
                    reason = reason.as_str(),
                    "fast_reject"
                );
                Ok(PatchOutcome::Skipped)
            }
            Plan::Escalate => {
                PatchMetrics::bump(&self.metrics.escalations, 1);
                debug!(
                    target: "minimap.patch",
                    id = %self.id,
                    offset = edit.offset,
                    added_lines = edit.added_lines(),
                    scale = %state.view.scale,
                    "escalate_full_render"
                );
                self.rerender_locked(state, doc)?;
                Ok(PatchOutcome::FullRender(state.view.area()))
            }
            Plan::Patch(plan) => {
                let view = state.view;
                let Some(buffer) = state.buffer.as_mut() else {
                    return Ok(PatchOutcome::Skipped);
                };
                state.stale = true;
                let shifted = patch::execute(buffer, &state.empty_line, &self.ink(), view, &plan);
                state.stale = false;

                PatchMetrics::bump(&self.metrics.incremental_patches, 1);
                PatchMetrics::bump(&self.metrics.rows_shifted, shifted as u64);
                PatchMetrics::record_ns(&self.metrics.last_patch_ns, started.elapsed().as_nanos());
                trace!(
                    target: "minimap.patch",
                    id = %self.id,
                    offset = edit.offset,
                    old_len = edit.old_len,
                    new_len = edit.new_len,
                    rows_shifted = shifted,
                    repaint = ?plan.repaint,
                    "patched"
                );
                Ok(PatchOutcome::Patched(plan.repaint))
            }
        }
    }

    /// Blit the visible area onto `surface` at its origin. Returns `false`
    /// when there is no buffer to paint.
    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S) -> bool {
        let state = self.lock_state();
        match &state.buffer {
            Some(buffer) => {
                buffer.paint(surface, state.view.width, state.view.height);
                true
            }
            None => false,
        }
    }

    /// Copy of the visible area.
    pub fn snapshot_visible(&self) -> Option<ImageSurface> {
        let state = self.lock_state();
        let buffer = state.buffer.as_ref()?;
        let mut image = ImageSurface::new(state.view.width, state.view.height);
        buffer.paint(&mut image, state.view.width, state.view.height);
        Some(image)
    }

    /// Logical position shown at minimap pixel `(x, y)`.
    pub fn position_from_pixel(&self, x: i64, y: i64) -> LogicalPosition {
        let view = self.lock_state().view;
        repaint::position_from_pixel(view, x, y)
    }

    /// Minimap rectangle covering a document range; `None` without a buffer.
    pub fn repaint_rect_for_range<D: PositionOracle + ?Sized>(
        &self,
        doc: &D,
        range: Range<usize>,
    ) -> Result<Option<Rect>, MinimapError> {
        let Some(view) = self.buffered_view() else {
            return Ok(None);
        };
        repaint::range_rect(doc, view, range).map(Some)
    }

    /// Minimap region showing the host's `visible` editor area.
    pub fn viewport_rect<M: ViewportMapper + ?Sized>(&self, mapper: &M, visible: Rect) -> Option<Rect> {
        let view = self.buffered_view()?;
        Some(repaint::viewport_rect(mapper, view, visible))
    }

    /// [`Minimap::viewport_rect`] grown by one pixel in each direction.
    pub fn repaint_rect_for_viewport<M: ViewportMapper + ?Sized>(
        &self,
        mapper: &M,
        visible: Rect,
    ) -> Option<Rect> {
        self.viewport_rect(mapper, visible).map(|mut rect| {
            rect.width += 1;
            rect.height += 1;
            rect
        })
    }

    pub fn current_scale(&self) -> Scale {
        self.lock_state().view.scale
    }

    pub fn visible_size(&self) -> (usize, usize) {
        let view = self.lock_state().view;
        (view.width, view.height)
    }

    pub fn has_buffer(&self) -> bool {
        self.lock_state().buffer.is_some()
    }

    pub fn is_stale(&self) -> bool {
        self.lock_state().stale
    }

    /// Release the pixel buffer and the empty line. A later
    /// [`Minimap::ensure_capacity`] allocates afresh.
    pub fn dispose(&self) {
        self.lock_state().release();
        debug!(target: "minimap.lifecycle", id = %self.id, "disposed");
    }

    fn buffered_view(&self) -> Option<crate::render::View> {
        let state = self.lock_state();
        state.buffer.as_ref().map(|_| state.view)
    }

    fn ink(&self) -> Ink<'_> {
        Ink {
            renderer: &self.renderer,
            coverage: &*self.coverage,
        }
    }

    /// A panic while the lock was held may have left the buffer half-written:
    /// recover the guard and force the next edit to redraw everything.
    fn lock_state(&self) -> MutexGuard<'_, MinimapState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                guard.stale = true;
                self.state.clear_poison();
                warn!(target: "minimap.error", id = %self.id, "state_lock_poisoned");
                guard
            }
        }
    }

    fn report(&self, err: &MinimapError) {
        PatchMetrics::bump(&self.metrics.errors_reported, 1);
        warn!(target: "minimap.error", id = %self.id, error = %err, "minimap_error");
        self.listener.handle_error(self.id, err);
    }
}

impl std::fmt::Debug for Minimap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Minimap")
            .field("id", &self.id)
            .field("renderer", &self.renderer)
            .field("slack", &self.slack)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::NoopListener;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn minimap_is_send_and_sync() {
        assert_send_sync::<Minimap>();
    }

    #[test]
    fn ids_are_unique() {
        let a = Minimap::new(Arc::new(NoopListener));
        let b = Minimap::new(Arc::new(NoopListener));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn queries_without_buffer() {
        let m = Minimap::new(Arc::new(NoopListener));
        let doc = core_text::Buffer::from_str("t", "abc");
        assert!(!m.has_buffer());
        assert!(m.snapshot_visible().is_none());
        assert_eq!(m.repaint_rect_for_range(&doc, 0..1), Ok(None));
        assert_eq!(m.current_scale(), Scale::ONE);
    }
}
