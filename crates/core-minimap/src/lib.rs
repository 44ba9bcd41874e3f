//! Incremental minimap synchronization.
//!
//! A [`Minimap`] keeps a low-resolution pixel rendering of a whole document
//! (one pixel per character cell, coverage as alpha, lines compressed
//! vertically when they outnumber the rows) consistent with every edit, and
//! reports the smallest rectangle the host has to repaint.
//!
//! Typical host flow:
//! 1. `ensure_capacity(doc, width, height)` whenever the minimap is laid out;
//! 2. for each document change, [`EditTracker::before_change`] before
//!    mutating, [`EditTracker::after_change`] after, then
//!    [`Minimap::apply_edit`] with the resulting [`EditDescriptor`];
//! 3. on [`MinimapListener::should_repaint`], call [`Minimap::paint`].

pub mod cell_renderer;
pub mod edit;
pub mod error;
mod lifecycle;
pub mod listener;
pub mod metrics;
pub mod minimap;
pub mod patch;
pub mod pixel;
pub mod pixel_buffer;
mod render;
mod repaint;
pub mod scale;
pub mod surface;

pub use cell_renderer::{CellRenderer, TokenStyler};
pub use edit::{EditDescriptor, EditTracker};
pub use error::MinimapError;
pub use listener::{MinimapId, MinimapListener, NoopListener, ViewportMapper};
pub use metrics::{PatchMetrics, PatchMetricsSnapshot};
pub use minimap::{DEFAULT_SLACK, Minimap, MinimapOptions};
pub use patch::PatchOutcome;
pub use pixel::{Pixel, Rect};
pub use pixel_buffer::PixelBuffer;
pub use scale::{Scale, scaled_row, unscaled_row};
pub use surface::{ImageSurface, Surface};
