//! Pixel and rectangle value types shared by the buffer and the host surfaces.

/// Packed `0xAARRGGBB` pixel. Alpha carries the glyph coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pixel(u32);

impl Pixel {
    pub const TRANSPARENT: Pixel = Pixel(0);

    pub const fn from_argb(argb: u32) -> Self {
        Pixel(argb)
    }

    /// Pixel of color `rgb` (`0x00RRGGBB`) with opacity `alpha`.
    pub const fn ink(alpha: u8, rgb: u32) -> Self {
        Pixel(((alpha as u32) << 24) | (rgb & 0x00FF_FFFF))
    }

    pub const fn argb(self) -> u32 {
        self.0
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn rgb(self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    pub const fn is_transparent(self) -> bool {
        self.0 == 0
    }
}

/// Axis-aligned rectangle in minimap pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge.
    pub const fn right(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub const fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ink_packs_alpha_over_rgb() {
        let p = Pixel::ink(0x80, 0xFF12_3456);
        assert_eq!(p.argb(), 0x8012_3456);
        assert_eq!(p.alpha(), 0x80);
        assert_eq!(p.rgb(), 0x12_3456);
        assert!(!p.is_transparent());
        assert!(Pixel::default().is_transparent());
    }

    #[test]
    fn rect_edges() {
        let r = Rect::new(2, 3, 4, 5);
        assert_eq!((r.right(), r.bottom()), (6, 8));
        assert!(r.contains(2, 3));
        assert!(!r.contains(6, 3));
        assert!(Rect::new(1, 1, 0, 9).is_empty());
    }
}
