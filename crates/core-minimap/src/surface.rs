//! Paint targets.

use std::io::{self, Write};

use crate::pixel::Pixel;

/// Destination of [`crate::Minimap::paint`]. Rows are delivered top to bottom
/// starting at column 0.
pub trait Surface {
    /// `(width, height)` in pixels; anything beyond is clipped by the caller.
    fn size(&self) -> (usize, usize);

    fn blit_row(&mut self, y: usize, pixels: &[Pixel]);
}

/// In-memory ARGB image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSurface {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl ImageSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::TRANSPARENT; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Transparent outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Pixel::TRANSPARENT
        }
    }

    pub fn row(&self, y: usize) -> &[Pixel] {
        if y >= self.height {
            return &[];
        }
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    pub fn row_is_clear(&self, y: usize) -> bool {
        self.row(y).iter().all(|p| p.is_transparent())
    }

    /// Binary PGM (`P5`) of the alpha channel, ink dark on white.
    pub fn to_pgm(&self) -> Vec<u8> {
        let mut out = format!("P5\n{} {}\n255\n", self.width, self.height).into_bytes();
        out.extend(self.pixels.iter().map(|p| 255 - p.alpha()));
        out
    }

    pub fn write_pgm<W: Write>(&self, mut out: W) -> io::Result<()> {
        out.write_all(&self.to_pgm())?;
        out.flush()
    }
}

impl Surface for ImageSurface {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn blit_row(&mut self, y: usize, pixels: &[Pixel]) {
        if y >= self.height {
            return;
        }
        let n = pixels.len().min(self.width);
        let start = y * self.width;
        self.pixels[start..start + n].copy_from_slice(&pixels[..n]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pgm_header_and_inverted_alpha() {
        let mut s = ImageSurface::new(2, 1);
        s.blit_row(0, &[Pixel::ink(255, 0), Pixel::ink(10, 0)]);
        let pgm = s.to_pgm();
        assert!(pgm.starts_with(b"P5\n2 1\n255\n"));
        assert_eq!(&pgm[pgm.len() - 2..], &[0, 245]);
    }

    #[test]
    fn blit_clips() {
        let mut s = ImageSurface::new(2, 2);
        s.blit_row(5, &[Pixel::ink(1, 0)]);
        s.blit_row(1, &[Pixel::ink(1, 0), Pixel::ink(2, 0), Pixel::ink(3, 0)]);
        assert!(s.row_is_clear(0));
        assert_eq!(s.pixel(1, 1).alpha(), 2);
        assert_eq!(s.pixel(2, 1), Pixel::TRANSPARENT);
    }
}
