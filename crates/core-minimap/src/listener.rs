//! Host-facing notification channel.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use core_text::LogicalPosition;

use crate::error::MinimapError;
use crate::pixel::Rect;

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

/// Identity of one minimap instance, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MinimapId(usize);

impl MinimapId {
    pub(crate) fn next() -> Self {
        MinimapId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for MinimapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "minimap#{}", self.0)
    }
}

/// Receives repaint requests and failures. Called without the minimap lock
/// held, so implementations may call back into the minimap (e.g. `paint`).
pub trait MinimapListener: Send + Sync {
    fn should_repaint(&self, id: MinimapId, rect: Rect);

    fn handle_error(&self, id: MinimapId, error: &MinimapError);
}

/// Listener that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl MinimapListener for NoopListener {
    fn should_repaint(&self, _id: MinimapId, _rect: Rect) {}

    fn handle_error(&self, _id: MinimapId, _error: &MinimapError) {}
}

/// Host editor pixel -> logical position conversion, used to project the
/// editor's visible area onto the minimap.
pub trait ViewportMapper {
    fn xy_to_position(&self, x: usize, y: usize) -> LogicalPosition;
}
