//! Geometry types for terminal coordinates and regions.

use serde::{Deserialize, Serialize};

/// Position in the terminal grid (row, column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Row index (0-based)
    pub row: u16,
    /// Column index (0-based)
    pub col: u16,
}

impl Position {
    /// Create a new position.
    pub fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// Origin position (0, 0).
    pub fn origin() -> Self {
        Self { row: 0, col: 0 }
    }

    /// Clamp this position into the given dimensions.
    pub fn clamped(self, dims: Dimensions) -> Self {
        Self {
            row: self.row.min(dims.rows.saturating_sub(1)),
            col: self.col.min(dims.cols.saturating_sub(1)),
        }
    }
}

/// Dimensions of a terminal or region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Number of rows
    pub rows: u16,
    /// Number of columns
    pub cols: u16,
}

impl Dimensions {
    /// Create new dimensions.
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    /// Total cell count (rows * cols).
    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Dimensions with both axes raised to at least one cell.
    pub fn non_empty(self) -> Self {
        Self {
            rows: self.rows.max(1),
            cols: self.cols.max(1),
        }
    }

    /// Dimensions limited to `max` on each axis.
    pub fn limited_to(self, max: Dimensions) -> Self {
        Self {
            rows: self.rows.min(max.rows),
            cols: self.cols.min(max.cols),
        }
    }

    /// Check if a position lies inside these dimensions.
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(24, 80)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

/// Bounding box for a terminal region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    /// Starting row
    pub row: u16,
    /// Starting column
    pub col: u16,
    /// Width in columns
    pub width: u16,
    /// Height in rows
    pub height: u16,
}

impl Bounds {
    /// Create new bounds.
    pub fn new(row: u16, col: u16, width: u16, height: u16) -> Self {
        Self {
            row,
            col,
            width,
            height,
        }
    }

    /// Bounds covering the whole of `dims`.
    pub fn full(dims: Dimensions) -> Self {
        Self::new(0, 0, dims.cols, dims.rows)
    }

    /// Check if a position is contained within these bounds.
    pub fn contains(&self, pos: &Position) -> bool {
        pos.row >= self.row
            && (pos.row as u32) < self.row as u32 + self.height as u32
            && pos.col >= self.col
            && (pos.col as u32) < self.col as u32 + self.width as u32
    }

    /// Intersect these bounds with a grid of `dims`.
    ///
    /// Returns None when nothing of the region lies inside the grid.
    pub fn clip(&self, dims: Dimensions) -> Option<Bounds> {
        if self.row >= dims.rows || self.col >= dims.cols || self.width == 0 || self.height == 0 {
            return None;
        }
        let width = self.width.min(dims.cols - self.col);
        let height = self.height.min(dims.rows - self.row);
        Some(Bounds::new(self.row, self.col, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_creation() {
        let pos = Position::new(5, 10);
        assert_eq!(pos.row, 5);
        assert_eq!(pos.col, 10);
        assert_eq!(Position::origin(), Position::default());
    }

    #[test]
    fn test_position_clamped() {
        let dims = Dimensions::new(24, 80);
        assert_eq!(Position::new(30, 100).clamped(dims), Position::new(23, 79));
        assert_eq!(Position::new(3, 4).clamped(dims), Position::new(3, 4));
    }

    #[test]
    fn test_dimensions_default() {
        let dims = Dimensions::default();
        assert_eq!(dims.rows, 24);
        assert_eq!(dims.cols, 80);
        assert_eq!(dims.to_string(), "80x24");
    }

    #[test]
    fn test_dimensions_non_empty_and_limits() {
        assert_eq!(Dimensions::new(0, 0).non_empty(), Dimensions::new(1, 1));
        assert_eq!(
            Dimensions::new(500, 120).limited_to(Dimensions::new(300, 300)),
            Dimensions::new(300, 120)
        );
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = Bounds::new(5, 10, 20, 10);

        assert!(bounds.contains(&Position::new(5, 10))); // top-left corner
        assert!(bounds.contains(&Position::new(10, 15))); // inside
        assert!(bounds.contains(&Position::new(14, 29))); // bottom-right corner (inclusive)

        assert!(!bounds.contains(&Position::new(4, 10))); // above
        assert!(!bounds.contains(&Position::new(15, 10))); // below
        assert!(!bounds.contains(&Position::new(10, 9))); // left
        assert!(!bounds.contains(&Position::new(10, 30))); // right
    }

    #[test]
    fn test_bounds_clip() {
        let dims = Dimensions::new(10, 10);

        assert_eq!(
            Bounds::new(8, 8, 5, 5).clip(dims),
            Some(Bounds::new(8, 8, 2, 2))
        );
        assert_eq!(Bounds::new(10, 0, 5, 5).clip(dims), None);
        assert_eq!(Bounds::new(0, 0, 0, 5).clip(dims), None);
        assert_eq!(Bounds::full(dims).clip(dims), Some(Bounds::full(dims)));
    }
}
