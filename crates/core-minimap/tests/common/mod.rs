#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use core_glyph::CoverageLookup;
use core_minimap::{
    EditTracker, ImageSurface, Minimap, MinimapError, MinimapId, MinimapListener, MinimapOptions,
    PatchOutcome, Rect,
};
use core_text::Buffer;

/// Distinct, non-zero coverage per character so misplaced pixels show up.
pub struct ByCode;

impl CoverageLookup for ByCode {
    fn coverage(&self, ch: char) -> u8 {
        (ch as u32 % 97 + 100) as u8
    }
}

#[derive(Default)]
pub struct RecordingListener {
    pub repaints: Mutex<Vec<(MinimapId, Rect)>>,
    pub errors: Mutex<Vec<(MinimapId, MinimapError)>>,
}

impl RecordingListener {
    pub fn repaints(&self) -> Vec<Rect> {
        self.repaints.lock().unwrap().iter().map(|(_, r)| *r).collect()
    }

    pub fn errors(&self) -> Vec<MinimapError> {
        self.errors.lock().unwrap().iter().map(|(_, e)| e.clone()).collect()
    }
}

impl MinimapListener for RecordingListener {
    fn should_repaint(&self, id: MinimapId, rect: Rect) {
        self.repaints.lock().unwrap().push((id, rect));
    }

    fn handle_error(&self, id: MinimapId, error: &MinimapError) {
        self.errors.lock().unwrap().push((id, error.clone()));
    }
}

pub fn options() -> MinimapOptions {
    MinimapOptions {
        coverage: Arc::new(ByCode),
        ..MinimapOptions::default()
    }
}

pub fn minimap() -> (Minimap, Arc<RecordingListener>) {
    let listener = Arc::new(RecordingListener::default());
    let m = Minimap::with_options(listener.clone(), options());
    (m, listener)
}

/// Minimap laid out at `width x height` over `doc`.
pub fn laid_out(doc: &Buffer, width: usize, height: usize) -> (Minimap, Arc<RecordingListener>) {
    let (m, listener) = minimap();
    m.ensure_capacity(doc, width, height).unwrap();
    (m, listener)
}

/// Replace `old_len` chars at `offset` with `text`, reporting it the way a host would.
pub fn edit(
    m: &Minimap,
    doc: &mut Buffer,
    offset: usize,
    old_len: usize,
    text: &str,
) -> Result<PatchOutcome, MinimapError> {
    let mut tracker = EditTracker::new();
    tracker.before_change(&*doc, offset, old_len)?;
    doc.replace(offset, old_len, text)?;
    let descriptor = tracker.after_change(&*doc, offset, old_len, text.chars().count())?;
    m.apply_edit(&*doc, &descriptor)
}

/// What a freshly created minimap shows for `doc`.
pub fn fresh_render(doc: &Buffer, width: usize, height: usize) -> ImageSurface {
    let (m, _) = laid_out(doc, width, height);
    m.snapshot_visible().unwrap()
}

/// `#` for ink, `.` for transparent; handy in assertion messages.
pub fn ascii(image: &ImageSurface) -> String {
    let mut out = String::new();
    for y in 0..image.height() {
        out.extend(
            image
                .row(y)
                .iter()
                .map(|p| if p.is_transparent() { '.' } else { '#' }),
        );
        out.push('\n');
    }
    out
}
