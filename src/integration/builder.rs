//! Builder for painting leaf masks from simple shapes.

use ndarray::Array2;

use crate::linker::{Mask, Rect};

/// Builder for creating `Mask` objects on a fixed-size canvas.
///
/// Shapes extending past the canvas are clipped.
#[derive(Debug, Clone)]
pub struct MaskBuilder {
    canvas: Array2<bool>,
}

impl MaskBuilder {
    /// Create an empty canvas of `height x width` pixels.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            canvas: Array2::from_elem((height, width), false),
        }
    }

    /// Fill a rectangle.
    pub fn rect(mut self, rect: Rect) -> Self {
        let (height, width) = self.canvas.dim();
        let [top, left, bottom, right] = rect.to_tlbr();
        for r in top..bottom.min(height) {
            for c in left..right.min(width) {
                self.canvas[[r, c]] = true;
            }
        }
        self
    }

    /// Fill a disk centred on `(row, col)`.
    pub fn disk(mut self, row: usize, col: usize, radius: usize) -> Self {
        let r2 = (radius * radius) as i64;
        for ((r, c), px) in self.canvas.indexed_iter_mut() {
            let dr = r as i64 - row as i64;
            let dc = c as i64 - col as i64;
            if dr * dr + dc * dc <= r2 {
                *px = true;
            }
        }
        self
    }

    /// Set a single pixel.
    pub fn pixel(mut self, row: usize, col: usize) -> Self {
        if let Some(px) = self.canvas.get_mut([row, col]) {
            *px = true;
        }
        self
    }

    /// Build the final `Mask`.
    pub fn build(self) -> Mask {
        Mask::new(self.canvas)
    }
}
