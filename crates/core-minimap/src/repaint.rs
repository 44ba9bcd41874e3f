//! Text ranges and host viewports projected onto minimap pixels.

use std::ops::Range;

use core_text::{LogicalPosition, PositionOracle};

use crate::error::MinimapError;
use crate::listener::ViewportMapper;
use crate::pixel::Rect;
use crate::render::View;
use crate::scale::unscaled_row;

/// Rectangle to repaint after `range` of the document changed.
///
/// Ranges reaching past the end of the document cover everything from the
/// first affected line to the bottom; same-line ranges cover the rest of that
/// row; multi-line ranges cover full rows. Widths include one extra pixel.
pub(crate) fn range_rect<D: PositionOracle + ?Sized>(
    doc: &D,
    view: View,
    range: Range<usize>,
) -> Result<Rect, MinimapError> {
    let len = doc.text_length();
    let full_width = view.width + 1;
    let to_bottom = |line: usize| {
        let y = view.row(line);
        Rect::new(0, y, full_width, (view.height + 1).saturating_sub(y))
    };

    if range.start > len {
        let eof = doc.offset_to_position(len)?;
        return Ok(to_bottom(eof.line));
    }
    let start = doc.offset_to_position(range.start)?;
    let end_offset = range.end.max(range.start);
    if end_offset > len {
        return Ok(to_bottom(start.line));
    }
    let end = doc.offset_to_position(end_offset)?;

    let top = view.row(start.line);
    // Under compression the next line can share the end line's row.
    let bottom = (view.row(end.line) + 1).max(view.row(end.line + 1));
    if start.line == end.line {
        Ok(Rect::new(
            start.column,
            top,
            full_width.saturating_sub(start.column),
            bottom - top,
        ))
    } else {
        Ok(Rect::new(0, top, full_width, bottom - top))
    }
}

/// Minimap region showing the host's `visible` editor area.
///
/// Corners are resolved through the host mapper; the right bound takes the
/// wider of the top and bottom rows since rows can end at different columns.
pub(crate) fn viewport_rect<M: ViewportMapper + ?Sized>(
    mapper: &M,
    view: View,
    visible: Rect,
) -> Rect {
    let start = mapper.xy_to_position(visible.x, visible.y);
    let top_right = mapper.xy_to_position(visible.right(), visible.y);
    let bottom_right = mapper.xy_to_position(visible.right(), visible.bottom());

    let right = top_right.column.max(bottom_right.column);
    let width = view
        .width
        .saturating_sub(start.column)
        .min(right.saturating_sub(start.column))
        .saturating_sub(1);
    let top = view.row(start.line);
    let height = view.row(bottom_right.line).saturating_sub(top);
    Rect::new(start.column, top, width, height)
}

/// Logical position under minimap pixel `(x, y)`; negative coordinates clamp to 0.
pub(crate) fn position_from_pixel(view: View, x: i64, y: i64) -> LogicalPosition {
    let x = usize::try_from(x.max(0)).unwrap_or(usize::MAX);
    let y = usize::try_from(y.max(0)).unwrap_or(usize::MAX);
    LogicalPosition::new(unscaled_row(y, view.scale), x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::Scale;
    use core_text::Buffer;

    const VIEW: View = View {
        width: 40,
        height: 40,
        scale: Scale::ONE,
    };

    fn doc() -> Buffer {
        Buffer::from_str("t", "int x = 2;\nint y = 4;\n")
    }

    #[test]
    fn same_line_range_covers_rest_of_row() {
        assert_eq!(range_rect(&doc(), VIEW, 4..5).unwrap(), Rect::new(4, 0, 37, 1));
    }

    #[test]
    fn multi_line_range_covers_full_rows() {
        assert_eq!(range_rect(&doc(), VIEW, 4..13).unwrap(), Rect::new(0, 0, 41, 2));
    }

    #[test]
    fn ranges_past_the_end_cover_to_bottom() {
        // Document length is 22; the last (empty) line is line 2.
        assert_eq!(range_rect(&doc(), VIEW, 30..31).unwrap(), Rect::new(0, 2, 41, 39));
        assert_eq!(range_rect(&doc(), VIEW, 12..40).unwrap(), Rect::new(0, 1, 41, 40));
    }

    #[test]
    fn compressed_rows_keep_at_least_one_row() {
        let view = View {
            width: 10,
            height: 2,
            scale: Scale::for_viewport(2, 6),
        };
        let doc = Buffer::from_str("t", "a\nb\nc\nd\ne\nf");
        let r = range_rect(&doc, view, 2..3).unwrap();
        assert_eq!((r.y, r.height), (0, 1));
    }

    #[test]
    fn compressed_multi_line_range_covers_end_row() {
        let view = View {
            width: 10,
            height: 2,
            scale: Scale::for_viewport(2, 6),
        };
        let doc = Buffer::from_str("t", "a\nb\nc\nd\ne\nf");
        // Lines 2..=4 land on rows 0 and 1.
        assert_eq!(range_rect(&doc, view, 4..9).unwrap(), Rect::new(0, 0, 11, 2));
    }

    struct Grid;
    impl ViewportMapper for Grid {
        // 8 px per column, 16 px per line.
        fn xy_to_position(&self, x: usize, y: usize) -> LogicalPosition {
            LogicalPosition::new(y / 16, x / 8)
        }
    }

    #[test]
    fn viewport_projection() {
        let r = viewport_rect(&Grid, VIEW, Rect::new(16, 32, 160, 320));
        // columns 2..22, lines 2..22
        assert_eq!(r, Rect::new(2, 2, 19, 20));
        let narrow = View { width: 10, ..VIEW };
        assert_eq!(viewport_rect(&Grid, narrow, Rect::new(16, 32, 160, 320)).width, 7);
    }

    #[test]
    fn pixel_positions_clamp_negative() {
        assert_eq!(position_from_pixel(VIEW, -3, -9), LogicalPosition::new(0, 0));
        let compressed = View {
            scale: Scale::for_viewport(40, 400),
            ..VIEW
        };
        // 40 / 400 -> 0.099
        assert_eq!(position_from_pixel(compressed, 5, 10), LogicalPosition::new(101, 5));
    }
}
