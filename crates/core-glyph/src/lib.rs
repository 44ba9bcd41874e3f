//! Glyph coverage ("letter thickness") table.
//!
//! Maps every printable ASCII character to an opacity in `[0, 255]` describing
//! how much ink the glyph puts into its cell. The table is measured once per
//! face by rasterizing each glyph onto a monochrome canvas and counting set
//! pixels, then rescaled so the densest glyph lands on 255.
//!
//! Lookup rules:
//! * below `'!'` (controls, space, NUL) -> 0
//! * above `'~'` (non-ASCII, unknown to the face) -> 128
//!
//! A process-wide table is available through [`CoverageTable::global`]. It is
//! built lazily from the built-in 5x7 face unless the host installs its own
//! table first; after that it is never mutated, so concurrent reads need no
//! synchronization.

use std::sync::OnceLock;

use thiserror::Error;
use tracing::debug;

pub mod builtin;
pub mod raster;

pub use builtin::Glyph5x7;
pub use raster::{FaceMetrics, GlyphRasterizer, MonoCanvas};

/// First measured character.
pub const FIRST: char = '!';
/// Last measured character.
pub const LAST: char = '~';
/// Coverage reported for characters above the measured range.
pub const UNKNOWN_COVERAGE: u8 = 128;

const LEN: usize = (LAST as usize) - (FIRST as usize) + 1;

static GLOBAL: OnceLock<CoverageTable> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlyphError {
    #[error("face metrics describe an empty {width}x{height} canvas")]
    EmptyCanvas { width: usize, height: usize },
}

/// Anything able to answer "how much ink does this character put in a cell".
pub trait CoverageLookup: Send + Sync {
    fn coverage(&self, ch: char) -> u8;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageTable {
    values: [u8; LEN],
}

impl CoverageTable {
    /// Measure every printable character of `face`.
    pub fn build<R: GlyphRasterizer + ?Sized>(face: &R) -> Result<Self, GlyphError> {
        let metrics = face.metrics();
        let area = metrics.area();
        if area == 0 {
            return Err(GlyphError::EmptyCanvas {
                width: metrics.max_advance,
                height: metrics.height(),
            });
        }
        let mut canvas = MonoCanvas::new(metrics.max_advance, metrics.height());
        let mut raw = [0usize; LEN];
        let mut max = 0usize;
        for (slot, ch) in raw.iter_mut().zip(FIRST..=LAST) {
            canvas.clear();
            face.draw(ch, &mut canvas, metrics.max_ascent);
            let val = canvas.count_set() * 255 / area;
            *slot = val;
            max = max.max(val);
        }
        let values = raw.map(|v| if max == 0 { 0 } else { (v * 255 / max).min(255) as u8 });
        debug!(
            target: "glyph.coverage",
            width = metrics.max_advance,
            height = metrics.height(),
            max_raw = max,
            "coverage_table_built"
        );
        Ok(Self { values })
    }

    /// Table measured from the built-in 5x7 face.
    pub fn builtin() -> Self {
        Self::build(&Glyph5x7).unwrap_or_else(|_| Self::from_values([UNKNOWN_COVERAGE; LEN]))
    }

    /// Wrap precomputed values for `'!'..='~'` in order.
    pub fn from_values(values: [u8; LEN]) -> Self {
        Self { values }
    }

    pub fn coverage(&self, ch: char) -> u8 {
        if ch < FIRST {
            0
        } else if ch > LAST {
            UNKNOWN_COVERAGE
        } else {
            self.values[ch as usize - FIRST as usize]
        }
    }

    /// Process-wide table, built from the built-in face on first use unless
    /// [`CoverageTable::install`] ran earlier.
    pub fn global() -> &'static CoverageTable {
        GLOBAL.get_or_init(Self::builtin)
    }

    /// Install the process-wide table. Fails (returning the table) once a
    /// table is already in place.
    pub fn install(table: CoverageTable) -> Result<(), CoverageTable> {
        GLOBAL.set(table)
    }
}

impl CoverageLookup for CoverageTable {
    fn coverage(&self, ch: char) -> u8 {
        CoverageTable::coverage(self, ch)
    }
}

/// Handle on the process-wide table.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalCoverage;

impl CoverageLookup for GlobalCoverage {
    fn coverage(&self, ch: char) -> u8 {
        CoverageTable::global().coverage(ch)
    }
}
