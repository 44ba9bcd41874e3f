//! Off-screen monochrome canvas and the glyph rasterizer seam.
//!
//! Coverage measurement only needs to know which pixels of a fixed-size cell a
//! glyph sets, so the canvas is a plain bit grid and a face only has to report
//! its maximum advance / ascent / descent and draw one character at a time.

/// Cell dimensions shared by every glyph of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceMetrics {
    pub max_advance: usize,
    pub max_ascent: usize,
    pub max_descent: usize,
}

impl FaceMetrics {
    pub const fn new(max_advance: usize, max_ascent: usize, max_descent: usize) -> Self {
        Self {
            max_advance,
            max_ascent,
            max_descent,
        }
    }

    pub const fn height(&self) -> usize {
        self.max_ascent + self.max_descent
    }

    pub const fn area(&self) -> usize {
        self.max_advance * self.height()
    }
}

/// A glyph source able to draw single characters onto a [`MonoCanvas`].
pub trait GlyphRasterizer {
    fn metrics(&self) -> FaceMetrics;

    /// Draw `ch` with its baseline at row `baseline`. Pixels falling outside the
    /// canvas are dropped by the canvas itself.
    fn draw(&self, ch: char, canvas: &mut MonoCanvas, baseline: usize);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoCanvas {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl MonoCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    /// Set one pixel; coordinates outside the canvas are ignored.
    pub fn set(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.bits[y * self.width + x] = true;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    /// Number of set pixels.
    pub fn count_set(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_outside_is_dropped() {
        let mut c = MonoCanvas::new(2, 2);
        c.set(1, 1);
        c.set(2, 0);
        c.set(0, 9);
        assert_eq!(c.count_set(), 1);
        assert!(c.get(1, 1));
        assert!(!c.get(2, 0));
        c.clear();
        assert_eq!(c.count_set(), 0);
    }

    #[test]
    fn metrics_area() {
        let m = FaceMetrics::new(6, 7, 1);
        assert_eq!(m.height(), 8);
        assert_eq!(m.area(), 48);
    }
}
