//! Row-major pixel grid backing one minimap.
//!
//! Every primitive clips to the allocation and treats zero-sized regions as
//! no-ops. Block copies pick their iteration order explicitly (far end first)
//! so overlapping source and destination rows never clobber unread data.

use crate::error::MinimapError;
use crate::pixel::{Pixel, Rect};
use crate::surface::Surface;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl PixelBuffer {
    /// Allocate a transparent `width x height` buffer, reporting allocation
    /// failure instead of aborting.
    pub fn try_new(width: usize, height: usize) -> Result<Self, MinimapError> {
        let exhausted = MinimapError::CapacityExhausted { width, height };
        let len = width.checked_mul(height).ok_or_else(|| exhausted.clone())?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| exhausted)?;
        pixels.resize(len, Pixel::TRANSPARENT);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Full allocated row; empty when `y` is out of bounds.
    pub fn row(&self, y: usize) -> &[Pixel] {
        if y >= self.height {
            return &[];
        }
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: Pixel) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = pixel;
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Pixel::TRANSPARENT);
    }

    pub fn clear_region(&mut self, region: Rect) {
        for y in region.y..region.bottom().min(self.height) {
            self.fill_run(region.x, y, region.width, Pixel::TRANSPARENT);
        }
    }

    pub fn fill_run(&mut self, x: usize, y: usize, len: usize, pixel: Pixel) {
        if let Some(run) = self.run_mut(x, y, len) {
            run.fill(pixel);
        }
    }

    /// Overwrite pixels starting at `(x, y)` with `src`.
    pub fn write_run(&mut self, x: usize, y: usize, src: &[Pixel]) {
        if let Some(run) = self.run_mut(x, y, src.len()) {
            let n = run.len();
            run.copy_from_slice(&src[..n]);
        }
    }

    /// Clear `len` pixels by copying from a prebuilt transparent line. Runs
    /// longer than `empty_line` are cut to its length.
    pub fn clear_run(&mut self, x: usize, y: usize, len: usize, empty_line: &[Pixel]) {
        let len = len.min(empty_line.len());
        self.write_run(x, y, &empty_line[..len]);
    }

    pub fn read_run(&self, x: usize, y: usize, len: usize) -> Vec<Pixel> {
        if y >= self.height || x >= self.width {
            return Vec::new();
        }
        let len = len.min(self.width - x);
        let start = y * self.width + x;
        self.pixels[start..start + len].to_vec()
    }

    /// Copy `src` so its top-left corner lands on `(dst_x, dst_y)`.
    pub fn copy_region(&mut self, src: Rect, dst_x: usize, dst_y: usize) {
        if src.is_empty() {
            return;
        }
        let width = src
            .width
            .min(self.width.saturating_sub(src.x.max(dst_x)));
        let rows = src
            .height
            .min(self.height.saturating_sub(src.y.max(dst_y)));
        if width == 0 || rows == 0 {
            return;
        }
        if dst_y == src.y {
            for r in 0..rows {
                self.shift_within_row(src.y + r, src.x, dst_x, width);
            }
        } else if dst_y > src.y {
            // Moving down: start at the bottom so source rows are read first.
            for r in (0..rows).rev() {
                self.copy_row(src.y + r, dst_y + r, src.x, dst_x, width);
            }
        } else {
            for r in 0..rows {
                self.copy_row(src.y + r, dst_y + r, src.x, dst_x, width);
            }
        }
    }

    /// Move `count` full-width rows (first `width` columns) from `src_row` to `dst_row`.
    pub fn move_rows(&mut self, src_row: usize, dst_row: usize, count: usize, width: usize) {
        self.copy_region(Rect::new(0, src_row, width, count), 0, dst_row);
    }

    /// Blit the top-left `width x height` corner onto `surface` at origin.
    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S, width: usize, height: usize) {
        let (surface_width, surface_height) = surface.size();
        let cols = width.min(self.width).min(surface_width);
        let rows = height.min(self.height).min(surface_height);
        for y in 0..rows {
            surface.blit_row(y, &self.row(y)[..cols]);
        }
    }

    fn run_mut(&mut self, x: usize, y: usize, len: usize) -> Option<&mut [Pixel]> {
        if len == 0 || y >= self.height || x >= self.width {
            return None;
        }
        let len = len.min(self.width - x);
        let start = y * self.width + x;
        Some(&mut self.pixels[start..start + len])
    }

    // Rows differ, so the two runs never overlap.
    fn copy_row(&mut self, from_row: usize, to_row: usize, from_x: usize, to_x: usize, width: usize) {
        let from = from_row * self.width + from_x;
        let to = to_row * self.width + to_x;
        if from < to {
            let (head, tail) = self.pixels.split_at_mut(to);
            tail[..width].copy_from_slice(&head[from..from + width]);
        } else {
            let (head, tail) = self.pixels.split_at_mut(from);
            head[to..to + width].copy_from_slice(&tail[..width]);
        }
    }

    fn shift_within_row(&mut self, row: usize, from_x: usize, to_x: usize, width: usize) {
        let base = row * self.width;
        if to_x > from_x {
            for c in (0..width).rev() {
                self.pixels[base + to_x + c] = self.pixels[base + from_x + c];
            }
        } else {
            for c in 0..width {
                self.pixels[base + to_x + c] = self.pixels[base + from_x + c];
            }
        }
    }
}
