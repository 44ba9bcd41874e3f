//! Property-based tests for the line <-> row mapping.

use core_minimap::{Scale, scaled_row, unscaled_row};
use proptest::prelude::*;

proptest! {
    // Later lines never land on earlier rows.
    #[test]
    fn scaled_rows_are_monotonic(height in 1usize..500, lines in 1usize..20_000, a in 0usize..20_000, b in 0usize..20_000) {
        let scale = Scale::for_viewport(height, lines);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(scaled_row(lo, scale) <= scaled_row(hi, scale));
    }

    // Unless clamped to the minimum, the last line stays inside the viewport.
    #[test]
    fn last_line_fits(height in 1usize..500, lines in 1usize..20_000) {
        prop_assume!(lines <= height * 500);
        let scale = Scale::for_viewport(height, lines);
        prop_assert!(scaled_row(lines - 1, scale) < height);
    }

    // Mapping a line to its row and back never overshoots the line.
    #[test]
    fn unscaling_rounds_down(height in 1usize..500, lines in 1usize..20_000, line in 0usize..20_000) {
        let scale = Scale::for_viewport(height, lines);
        prop_assert!(unscaled_row(scaled_row(line, scale), scale) <= line);
    }

    // More lines in the same height never loosen the scale.
    #[test]
    fn scale_shrinks_with_line_count(height in 0usize..500, a in 0usize..20_000, b in 0usize..20_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let tight = Scale::for_viewport(height, hi);
        let loose = Scale::for_viewport(height, lo);
        prop_assert!(tight <= loose);
        prop_assert!(loose <= Scale::ONE);
        prop_assert!(tight >= Scale::MIN);
    }
}

#[test]
fn short_documents_render_one_to_one() {
    for lines in 0..10 {
        assert_eq!(Scale::for_viewport(10, lines), Scale::ONE);
        assert_eq!(scaled_row(lines, Scale::ONE), lines);
        assert_eq!(unscaled_row(lines, Scale::ONE), lines);
    }
}

#[test]
fn zero_height_is_smallest_scale() {
    assert_eq!(Scale::for_viewport(0, 100), Scale::MIN);
    assert_eq!(Scale::for_viewport(0, 0), Scale::MIN);
}
