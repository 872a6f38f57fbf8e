use serde::{Deserialize, Serialize};

/// A rectangular range of grid positions, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl GridRange {
    /// Create a new range, normalizing so start <= end.
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self {
            start_row: r1.min(r2),
            start_col: c1.min(c2),
            end_row: r1.max(r2),
            end_col: c1.max(c2),
        }
    }

    /// Create a single-cell range.
    pub fn single(row: usize, col: usize) -> Self {
        Self::new(row, col, row, col)
    }

    /// Smallest range covering every position, or `None` for an empty input.
    pub fn bounding<I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        positions.into_iter().fold(None, |acc, (row, col)| match acc {
            None => Some(Self::single(row, col)),
            Some(range) => Some(range.include(row, col)),
        })
    }

    /// Grow the range so it also covers `(row, col)`.
    pub fn include(self, row: usize, col: usize) -> Self {
        Self {
            start_row: self.start_row.min(row),
            start_col: self.start_col.min(col),
            end_row: self.end_row.max(row),
            end_col: self.end_col.max(col),
        }
    }

    /// Check if this range contains a position.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row && row <= self.end_row &&
        col >= self.start_col && col <= self.end_col
    }

    pub fn height(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    pub fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    /// Number of positions in this range.
    pub fn cell_count(&self) -> usize {
        self.height() * self.width()
    }

    /// Iterate over all positions in this range (row-major order).
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> {
        let start_col = self.start_col;
        let end_col = self.end_col;

        (self.start_row..=self.end_row).flat_map(move |r| {
            (start_col..=end_col).map(move |c| (r, c))
        })
    }

    /// Check if this is a single position.
    pub fn is_single(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }
}
