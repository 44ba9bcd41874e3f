//! Per-character pixel production.

use std::fmt;
use std::sync::Arc;

use core_glyph::CoverageLookup;

use crate::pixel::Pixel;

/// Token color source for syntax-aware rendering.
pub trait TokenStyler: Send + Sync {
    /// RGB (`0x00RRGGBB`) of the token covering document `offset`, if any.
    fn color_at(&self, offset: usize) -> Option<u32>;
}

/// How a visible character becomes a pixel. Chosen once per minimap.
#[derive(Clone)]
pub enum CellRenderer {
    /// Coverage as alpha over a fixed ink color.
    Plain { ink: u32 },
    /// Coverage as alpha over the token color, `fallback` outside tokens.
    Tokenized {
        fallback: u32,
        styler: Arc<dyn TokenStyler>,
    },
}

impl Default for CellRenderer {
    fn default() -> Self {
        CellRenderer::Plain { ink: 0 }
    }
}

impl fmt::Debug for CellRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellRenderer::Plain { ink } => f.debug_struct("Plain").field("ink", ink).finish(),
            CellRenderer::Tokenized { fallback, .. } => f
                .debug_struct("Tokenized")
                .field("fallback", fallback)
                .finish_non_exhaustive(),
        }
    }
}

impl CellRenderer {
    /// Pixel for `ch` at document `offset`; `None` for whitespace, which
    /// leaves the cell as the clearing steps left it.
    pub fn pixel_for(&self, coverage: &dyn CoverageLookup, ch: char, offset: usize) -> Option<Pixel> {
        if ch.is_whitespace() {
            return None;
        }
        let alpha = coverage.coverage(ch);
        let rgb = match self {
            CellRenderer::Plain { ink } => *ink,
            CellRenderer::Tokenized { fallback, styler } => {
                styler.color_at(offset).unwrap_or(*fallback)
            }
        };
        Some(Pixel::ink(alpha, rgb))
    }
}
