use serde::{Deserialize, Serialize};

/// Pixel-aligned rectangle in image coordinates.
///
/// Supports two formats:
/// - TLHW: Top row, Left column, Height, Width
/// - TLBR: Top row, Left column, Bottom row, Right column (exclusive)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Top row
    pub row: usize,
    /// Left column
    pub col: usize,
    /// Number of rows covered
    pub height: usize,
    /// Number of columns covered
    pub width: usize,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLHW format).
    #[inline]
    pub fn new(row: usize, col: usize, height: usize, width: usize) -> Self {
        Self {
            row,
            col,
            height,
            width,
        }
    }

    /// Create a Rect from TLBR format. Bottom and right bounds are exclusive.
    #[inline]
    pub fn from_tlbr(top: usize, left: usize, bottom: usize, right: usize) -> Self {
        Self {
            row: top,
            col: left,
            height: bottom.saturating_sub(top),
            width: right.saturating_sub(left),
        }
    }

    /// Convert to TLBR format: (top, left, bottom, right).
    #[inline]
    pub fn to_tlbr(&self) -> [usize; 4] {
        [
            self.row,
            self.col,
            self.row + self.height,
            self.col + self.width,
        ]
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.height * self.width
    }
}
