//! Character loops shared by full renders and incremental patches.

use core_glyph::CoverageLookup;
use core_text::{LogicalPosition, PositionOracle};

use crate::cell_renderer::CellRenderer;
use crate::error::MinimapError;
use crate::pixel::Rect;
use crate::pixel_buffer::PixelBuffer;
use crate::scale::{Scale, scaled_row};

/// Visible area and scale the buffer content is maintained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct View {
    pub width: usize,
    pub height: usize,
    pub scale: Scale,
}

impl View {
    pub fn row(&self, line: usize) -> usize {
        scaled_row(line, self.scale)
    }

    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

pub(crate) struct Ink<'a> {
    pub renderer: &'a CellRenderer,
    pub coverage: &'a dyn CoverageLookup,
}

/// Draw `chars`, the document text starting at `offset`, from `pos` onward.
///
/// A newline advances to the next line and stops once that line's row falls
/// below the visible height. Characters past the right edge are skipped but
/// the loop keeps going, since later lines may still be visible.
pub(crate) fn render_text<I>(
    buffer: &mut PixelBuffer,
    ink: &Ink<'_>,
    view: View,
    chars: I,
    offset: usize,
    pos: LogicalPosition,
) where
    I: IntoIterator<Item = char>,
{
    if view.row(pos.line) >= view.height {
        return;
    }
    let mut line = pos.line;
    let mut col = pos.column;
    for (i, ch) in chars.into_iter().enumerate() {
        if ch == '\n' {
            line += 1;
            if view.row(line) >= view.height {
                break;
            }
            col = 0;
            continue;
        }
        if col >= view.width {
            continue;
        }
        if let Some(px) = ink.renderer.pixel_for(ink.coverage, ch, offset + i) {
            buffer.set_pixel(col, view.row(line), px);
        }
        col += 1;
    }
}

/// Clear the visible area and draw the whole document.
pub(crate) fn render_document<D: PositionOracle + ?Sized>(
    buffer: &mut PixelBuffer,
    ink: &Ink<'_>,
    view: View,
    doc: &D,
) -> Result<(), MinimapError> {
    let chars = doc.chars_at(0)?;
    buffer.clear_region(view.area());
    render_text(buffer, ink, view, chars, 0, LogicalPosition::origin());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;

    struct Full;
    impl CoverageLookup for Full {
        fn coverage(&self, _ch: char) -> u8 {
            255
        }
    }

    fn alphas(buffer: &PixelBuffer, y: usize, width: usize) -> String {
        buffer.row(y)[..width]
            .iter()
            .map(|p| if p.is_transparent() { '.' } else { '#' })
            .collect()
    }

    fn render(text: &str, width: usize, height: usize) -> PixelBuffer {
        let doc = Buffer::from_str("t", text);
        let mut buffer = PixelBuffer::try_new(width + 2, height + 2).unwrap();
        let renderer = CellRenderer::Plain { ink: 0 };
        let ink = Ink {
            renderer: &renderer,
            coverage: &Full,
        };
        let view = View {
            width,
            height,
            scale: Scale::for_viewport(height, doc.line_count()),
        };
        render_document(&mut buffer, &ink, view, &doc).unwrap();
        buffer
    }

    #[test]
    fn whitespace_and_line_ends_stay_clear() {
        let b = render("ab c\n d\n", 6, 4);
        assert_eq!(alphas(&b, 0, 6), "##.#..");
        assert_eq!(alphas(&b, 1, 6), ".#....");
        assert_eq!(alphas(&b, 2, 6), "......");
    }

    #[test]
    fn long_lines_are_cut_at_the_right_edge() {
        let b = render("abcdefgh\nxy", 4, 4);
        assert_eq!(alphas(&b, 0, 4), "####");
        assert_eq!(alphas(&b, 1, 4), "##..");
        // Slack columns are never drawn.
        assert!(b.get(4, 0).is_some_and(|p| p.is_transparent()));
    }

    #[test]
    fn stops_at_visible_height() {
        let b = render("a\nb\nc\nd\ne\nf", 3, 20);
        assert_eq!(alphas(&b, 5, 3), "#..");
        let b = render("a\nb\nc", 3, 2);
        // Three lines in two rows compresses; nothing lands past row 1.
        assert_eq!(alphas(&b, 2, 3), "...");
        assert_eq!(alphas(&b, 3, 3), "...");
    }
}
