//! Logical line <-> physical row mapping.
//!
//! The scale is kept in thousandths so both directions are exact integer
//! arithmetic and every caller agrees on which row a line lands in.

use std::fmt;

const UNIT: usize = 1000;

/// Vertical compression of the minimap. [`Scale::ONE`] renders one logical
/// line per pixel row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Scale {
    millis: usize,
}

impl Scale {
    pub const ONE: Scale = Scale { millis: UNIT };
    pub const MIN: Scale = Scale { millis: 1 };

    /// Scale for showing `lines` logical lines in `height` rows.
    ///
    /// More rows than lines pins to 1:1. Otherwise the ratio is floored to
    /// three decimals and reduced by one unit so the last line still maps
    /// inside the visible height.
    pub fn for_viewport(height: usize, lines: usize) -> Scale {
        let lines = lines.max(1);
        if height > lines {
            return Scale::ONE;
        }
        let millis = (height.saturating_mul(UNIT) / lines).saturating_sub(1);
        Scale {
            millis: millis.max(Scale::MIN.millis),
        }
    }

    pub const fn millis(self) -> usize {
        self.millis
    }

    pub fn as_f64(self) -> f64 {
        self.millis as f64 / UNIT as f64
    }

    pub const fn is_one(self) -> bool {
        self.millis == UNIT
    }

    pub const fn is_compressed(self) -> bool {
        self.millis < UNIT
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::ONE
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.millis / UNIT, self.millis % UNIT)
    }
}

/// `floor(scale * line)`
pub fn scaled_row(line: usize, scale: Scale) -> usize {
    line.saturating_mul(scale.millis) / UNIT
}

/// `floor(row / scale)`
pub fn unscaled_row(row: usize, scale: Scale) -> usize {
    row.saturating_mul(UNIT) / scale.millis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn more_rows_than_lines_is_one_to_one() {
        assert_eq!(Scale::for_viewport(40, 3), Scale::ONE);
        assert_eq!(Scale::for_viewport(40, 39), Scale::ONE);
        assert_eq!(Scale::for_viewport(40, 0), Scale::ONE);
    }

    #[test]
    fn equal_rows_and_lines_compresses_by_one_unit() {
        let s = Scale::for_viewport(40, 40);
        assert_eq!(s.millis(), 999);
        assert!(s.is_compressed());
        assert_eq!(scaled_row(39, s), 38);
    }

    #[test]
    fn ratio_is_floored_to_thousandths() {
        // 100 / 300 = 0.3333.. -> 333 - 1
        assert_eq!(Scale::for_viewport(100, 300).millis(), 332);
        assert_eq!(Scale::for_viewport(100, 300).to_string(), "0.332");
    }

    #[test]
    fn tiny_ratios_clamp_to_min() {
        assert_eq!(Scale::for_viewport(0, 10), Scale::MIN);
        assert_eq!(Scale::for_viewport(2, 5000), Scale::MIN);
    }

    #[test]
    fn last_line_stays_inside_height() {
        for lines in [41usize, 97, 1000, 12_345] {
            let s = Scale::for_viewport(40, lines);
            assert!(scaled_row(lines - 1, s) < 40, "lines={lines} scale={s}");
        }
    }

    #[test]
    fn row_mapping_round_trips_at_one() {
        for line in 0..50 {
            assert_eq!(scaled_row(line, Scale::ONE), line);
            assert_eq!(unscaled_row(line, Scale::ONE), line);
        }
    }

    #[test]
    fn unscaled_row_inverts_within_a_row() {
        let s = Scale::for_viewport(100, 300);
        for row in 0..100 {
            let line = unscaled_row(row, s);
            assert!(scaled_row(line, s) <= row);
        }
    }
}
