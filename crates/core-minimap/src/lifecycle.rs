//! Buffer lifecycle: when to allocate, when to redraw, when to keep.
//!
//! The buffer is allocated with slack in both axes so small viewport changes
//! reuse it. Content is only kept across a resize when the visible area did
//! not grow (rows and columns outside the old area were never maintained) and
//! the scale for the new height is unchanged.

use crate::pixel::Pixel;
use crate::pixel_buffer::PixelBuffer;
use crate::render::View;
use crate::scale::Scale;

#[derive(Debug)]
pub(crate) struct MinimapState {
    pub buffer: Option<PixelBuffer>,
    /// Transparent row of the visible width, used to clear runs.
    pub empty_line: Vec<Pixel>,
    pub view: View,
    /// Set while a mutation is in flight and after a failed or interrupted
    /// one; the next edit or capacity check redraws everything.
    pub stale: bool,
}

impl MinimapState {
    pub fn new() -> Self {
        Self {
            buffer: None,
            empty_line: Vec::new(),
            view: View {
                width: 0,
                height: 0,
                scale: Scale::ONE,
            },
            stale: false,
        }
    }

    /// Regenerate the empty line when the visible width changes.
    pub fn sync_empty_line(&mut self, width: usize) {
        if self.empty_line.len() != width {
            self.empty_line = vec![Pixel::TRANSPARENT; width];
        }
    }

    pub fn release(&mut self) {
        self.buffer = None;
        self.empty_line = Vec::new();
        self.stale = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RerenderCause {
    Stale,
    Grew,
    ScaleChanged,
}

impl RerenderCause {
    pub fn as_str(self) -> &'static str {
        match self {
            RerenderCause::Stale => "stale",
            RerenderCause::Grew => "visible_area_grew",
            RerenderCause::ScaleChanged => "scale_changed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CapacityDecision {
    Allocate,
    Rerender(RerenderCause),
    Keep,
}

/// Decide how to serve a `width x height` visible area showing `lines` lines,
/// given the view the buffer content was last maintained for.
pub(crate) fn decide(
    buffer: Option<&PixelBuffer>,
    stale: bool,
    previous: View,
    width: usize,
    height: usize,
    lines: usize,
) -> CapacityDecision {
    let Some(buffer) = buffer else {
        return CapacityDecision::Allocate;
    };
    if buffer.width() < width || buffer.height() < height {
        CapacityDecision::Allocate
    } else if stale {
        CapacityDecision::Rerender(RerenderCause::Stale)
    } else if width > previous.width || height > previous.height {
        CapacityDecision::Rerender(RerenderCause::Grew)
    } else if Scale::for_viewport(height, lines) != previous.scale {
        CapacityDecision::Rerender(RerenderCause::ScaleChanged)
    } else {
        CapacityDecision::Keep
    }
}
