//! Terminal grid state buffer and cursor tracking.

use tracing::debug;

use termrelay_core::{Bounds, Cell, CellAttributes, Color, Dimensions, Position};

/// Cursor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Current position
    pub position: Position,
    /// Visibility
    pub visible: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            position: Position::origin(),
            visible: true,
        }
    }
}

impl Cursor {
    /// Create a new cursor at origin.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Terminal grid state buffer.
///
/// Holds the authoritative character/attribute array for one screen plus the
/// emulator state needed to keep applying a byte stream to it (see
/// [`Grid::feed`]).
#[derive(Debug, Clone)]
pub struct Grid {
    /// Cell storage (row-major order)
    cells: Vec<Cell>,
    /// Grid dimensions
    dimensions: Dimensions,
    /// Cursor state
    cursor: Cursor,
    /// Saved cursor position (DECSC, SCOSC, ?1049)
    saved_cursor: Option<Position>,
    /// Scroll region (top, bottom) - 0-indexed, inclusive
    scroll_region: (u16, u16),
    /// Colors and attributes applied to newly written and erased cells
    pen: Cell,
    /// Wrap at the right margin (DECAWM)
    autowrap: bool,
    /// The last column was written; the next printable wraps first
    pub(crate) wrap_pending: bool,
    /// Undecoded input kept between feeds
    pub(crate) carry: Vec<u8>,
    /// Upper bound on `carry` before its front byte is forced out
    carry_limit: Option<usize>,
}

impl Grid {
    /// Create a new grid with the given dimensions.
    ///
    /// All cells are initialized to the blank cell. Zero dimensions are
    /// raised to one.
    pub fn new(dimensions: Dimensions) -> Self {
        let dimensions = dimensions.non_empty();
        Self {
            cells: vec![Cell::default(); dimensions.cell_count()],
            dimensions,
            cursor: Cursor::default(),
            saved_cursor: None,
            scroll_region: (0, dimensions.rows - 1),
            pen: Cell::default(),
            autowrap: true,
            wrap_pending: false,
            carry: Vec::new(),
            carry_limit: None,
        }
    }

    /// Cap the number of buffered bytes of an unfinished sequence.
    pub fn with_carry_limit(mut self, limit: Option<usize>) -> Self {
        self.carry_limit = limit;
        self
    }

    /// Current carry limit.
    pub fn carry_limit(&self) -> Option<usize> {
        self.carry_limit
    }

    /// Bytes received but not yet decoded.
    pub fn pending_input(&self) -> &[u8] {
        &self.carry
    }

    fn index(&self, row: u16, col: u16) -> usize {
        row as usize * self.dimensions.cols as usize + col as usize
    }

    /// Get cell at position (immutable).
    ///
    /// Returns None if position is out of bounds.
    pub fn cell(&self, row: u16, col: u16) -> Option<&Cell> {
        if row < self.dimensions.rows && col < self.dimensions.cols {
            self.cells.get(self.index(row, col))
        } else {
            None
        }
    }

    /// Get mutable cell at position.
    ///
    /// Returns None if position is out of bounds.
    pub fn cell_mut(&mut self, row: u16, col: u16) -> Option<&mut Cell> {
        if row < self.dimensions.rows && col < self.dimensions.cols {
            let idx = self.index(row, col);
            self.cells.get_mut(idx)
        } else {
            None
        }
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Get entire row as a slice.
    ///
    /// Returns None if row is out of bounds.
    pub fn row(&self, row: u16) -> Option<&[Cell]> {
        if row < self.dimensions.rows {
            let start = self.index(row, 0);
            let end = start + self.dimensions.cols as usize;
            Some(&self.cells[start..end])
        } else {
            None
        }
    }

    /// Characters of one row, full width.
    pub fn line(&self, row: u16) -> Option<String> {
        self.row(row)
            .map(|cells| cells.iter().map(|c| c.character).collect())
    }

    /// Extract text from a specific region.
    ///
    /// Trailing whitespace is trimmed from each line.
    pub fn extract_text(&self, bounds: &Bounds) -> String {
        let Some(bounds) = bounds.clip(self.dimensions) else {
            return String::new();
        };
        (bounds.row..bounds.row + bounds.height)
            .map(|row| {
                let line: String = (bounds.col..bounds.col + bounds.width)
                    .filter_map(|col| self.cell(row, col))
                    .map(|c| c.character)
                    .collect();
                line.trim_end().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Convert entire grid to plain text.
    pub fn to_plain_text(&self) -> String {
        self.extract_text(&Bounds::full(self.dimensions))
    }

    /// Get cursor reference.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Move the cursor, clamped to the grid.
    pub fn set_cursor_position(&mut self, position: Position) {
        self.cursor.position = position.clamped(self.dimensions);
        self.wrap_pending = false;
    }

    /// Show or hide the cursor.
    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor.visible = visible;
    }

    /// Get dimensions.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Check if cursor is visible.
    pub fn cursor_visible(&self) -> bool {
        self.cursor.visible
    }

    /// Current pen: the styling applied to written and erased cells.
    pub fn pen(&self) -> &Cell {
        &self.pen
    }

    /// Reset the pen to white on black without attributes.
    pub fn reset_pen(&mut self) {
        self.pen = Cell::default();
    }

    /// Set current cell attributes.
    pub fn set_current_attrs(&mut self, attrs: CellAttributes) {
        self.pen.attrs = attrs;
    }

    /// Set current foreground color.
    pub fn set_current_fg(&mut self, color: Color) {
        self.pen.fg = color;
    }

    /// Set current background color.
    pub fn set_current_bg(&mut self, color: Color) {
        self.pen.bg = color;
    }

    /// Blank cell in the current pen.
    pub(crate) fn blank(&self) -> Cell {
        self.pen.with_character(' ')
    }

    /// Scroll region as inclusive (top, bottom) rows.
    pub fn scroll_region(&self) -> (u16, u16) {
        self.scroll_region
    }

    /// Whether printing past the last column wraps to the next line.
    pub fn autowrap(&self) -> bool {
        self.autowrap
    }

    pub(crate) fn set_autowrap(&mut self, enabled: bool) {
        self.autowrap = enabled;
        if !enabled {
            self.wrap_pending = false;
        }
    }

    /// Save current cursor position.
    pub fn save_cursor(&mut self) {
        self.saved_cursor = Some(self.cursor.position);
    }

    /// Restore the saved cursor position, clamped to the grid.
    ///
    /// The saved position is kept, so it can be restored again.
    pub fn restore_cursor(&mut self) {
        let position = self.saved_cursor.unwrap_or_default();
        self.set_cursor_position(position);
    }

    /// Resize grid, preserving content where possible.
    ///
    /// Content from the top-left corner is preserved up to the smaller of
    /// old and new dimensions. The cursor and saved cursor are clamped to the
    /// new bounds and the scroll region is reset to the full grid.
    pub fn resize(&mut self, new_dimensions: Dimensions) {
        let new_dimensions = new_dimensions.non_empty();
        if new_dimensions == self.dimensions {
            return;
        }

        debug!(from = %self.dimensions, to = %new_dimensions, "Resizing grid");
        let mut new_cells = vec![Cell::default(); new_dimensions.cell_count()];

        let copy_rows = self.dimensions.rows.min(new_dimensions.rows) as usize;
        let copy_cols = self.dimensions.cols.min(new_dimensions.cols) as usize;
        let old_cols = self.dimensions.cols as usize;
        let new_cols = new_dimensions.cols as usize;

        for row in 0..copy_rows {
            new_cells[row * new_cols..row * new_cols + copy_cols]
                .copy_from_slice(&self.cells[row * old_cols..row * old_cols + copy_cols]);
        }

        self.cells = new_cells;
        self.dimensions = new_dimensions;
        self.cursor.position = self.cursor.position.clamped(new_dimensions);
        self.saved_cursor = self.saved_cursor.map(|p| p.clamped(new_dimensions));
        self.scroll_region = (0, new_dimensions.rows - 1);
        self.wrap_pending = false;
    }

    /// Overwrite one cell. Out-of-range positions are ignored.
    pub fn set_tile(&mut self, position: Position, cell: Cell) {
        if let Some(target) = self.cell_mut(position.row, position.col) {
            *target = cell;
        }
    }

    /// Fill a rectangle with `cell`, clipped to the grid.
    pub fn fill_rect(&mut self, bounds: Bounds, cell: Cell) {
        let Some(bounds) = bounds.clip(self.dimensions) else {
            return;
        };
        for row in bounds.row..bounds.row + bounds.height {
            let start = self.index(row, bounds.col);
            self.cells[start..start + bounds.width as usize].fill(cell);
        }
    }

    /// Write `text` on one row starting at `position`, styled like `style`.
    ///
    /// Text past the right edge is dropped.
    pub fn print_str(&mut self, position: Position, text: &str, style: Cell) {
        if position.row >= self.dimensions.rows {
            return;
        }
        for (col, ch) in (position.col..self.dimensions.cols).zip(text.chars()) {
            self.set_tile(Position::new(position.row, col), style.with_character(ch));
        }
    }

    /// Copy the overlapping area of `other` and take over its cursor.
    ///
    /// The cursor position is clamped into this grid.
    pub fn blit_from(&mut self, other: &Grid) {
        let rows = self.dimensions.rows.min(other.dimensions.rows) as usize;
        let cols = self.dimensions.cols.min(other.dimensions.cols) as usize;
        let mine = self.dimensions.cols as usize;
        let theirs = other.dimensions.cols as usize;
        for row in 0..rows {
            self.cells[row * mine..row * mine + cols]
                .copy_from_slice(&other.cells[row * theirs..row * theirs + cols]);
        }
        self.cursor = Cursor {
            position: other.cursor.position.clamped(self.dimensions),
            visible: other.cursor.visible,
        };
        self.wrap_pending = false;
    }

    // Primitives used by the sequence interpreter.

    /// Shift rows `top..=bottom` up by `n`, blanking the rows at the bottom.
    fn shift_up(&mut self, top: u16, bottom: u16, n: u16) {
        if top > bottom || bottom >= self.dimensions.rows {
            return;
        }
        let height = bottom - top + 1;
        let n = n.min(height);
        let cols = self.dimensions.cols as usize;
        let start = top as usize * cols;
        let end = (bottom as usize + 1) * cols;
        self.cells.copy_within(start + n as usize * cols..end, start);
        let blank = self.blank();
        self.cells[end - n as usize * cols..end].fill(blank);
    }

    /// Shift rows `top..=bottom` down by `n`, blanking the rows at the top.
    fn shift_down(&mut self, top: u16, bottom: u16, n: u16) {
        if top > bottom || bottom >= self.dimensions.rows {
            return;
        }
        let height = bottom - top + 1;
        let n = n.min(height);
        let cols = self.dimensions.cols as usize;
        let start = top as usize * cols;
        let end = (bottom as usize + 1) * cols;
        self.cells.copy_within(start..end - n as usize * cols, start + n as usize * cols);
        let blank = self.blank();
        self.cells[start..start + n as usize * cols].fill(blank);
    }

    /// Scroll the scroll region up by `n` lines.
    pub(crate) fn scroll_up(&mut self, n: u16) {
        let (top, bottom) = self.scroll_region;
        self.shift_up(top, bottom, n);
    }

    /// Scroll the scroll region down by `n` lines.
    pub(crate) fn scroll_down(&mut self, n: u16) {
        let (top, bottom) = self.scroll_region;
        self.shift_down(top, bottom, n);
    }

    /// Move down one line, scrolling when at the bottom of the region.
    pub(crate) fn line_feed(&mut self) {
        let (_, bottom) = self.scroll_region;
        let pos = self.cursor.position;
        if pos.row == bottom {
            self.scroll_up(1);
            self.wrap_pending = false;
        } else {
            self.set_cursor_position(Position::new(pos.row + 1, pos.col));
        }
    }

    /// Move up one line, scrolling when at the top of the region.
    pub(crate) fn reverse_line_feed(&mut self) {
        let (top, _) = self.scroll_region;
        let pos = self.cursor.position;
        if pos.row == top {
            self.scroll_down(1);
            self.wrap_pending = false;
        } else {
            self.set_cursor_position(Position::new(pos.row.saturating_sub(1), pos.col));
        }
    }

    /// Set the scroll region from 0-based inclusive rows.
    ///
    /// A single-row region is kept; an inverted one resets to the full grid.
    pub(crate) fn set_scroll_region(&mut self, top: u16, bottom: u16) {
        let last = self.dimensions.rows - 1;
        let bottom = bottom.min(last);
        self.scroll_region = if top <= bottom { (top, bottom) } else { (0, last) };
    }

    /// Insert `n` blank lines at the cursor row, inside the scroll region.
    pub(crate) fn insert_lines(&mut self, n: u16) {
        let (top, bottom) = self.scroll_region;
        let row = self.cursor.position.row;
        if row >= top && row <= bottom {
            self.shift_down(row, bottom, n);
            self.wrap_pending = false;
        }
    }

    /// Delete `n` lines at the cursor row, inside the scroll region.
    pub(crate) fn delete_lines(&mut self, n: u16) {
        let (top, bottom) = self.scroll_region;
        let row = self.cursor.position.row;
        if row >= top && row <= bottom {
            self.shift_up(row, bottom, n);
            self.wrap_pending = false;
        }
    }

    fn cursor_row_span(&self) -> (usize, usize, usize) {
        let pos = self.cursor.position;
        let row_start = self.index(pos.row, 0);
        (
            row_start,
            row_start + pos.col as usize,
            row_start + self.dimensions.cols as usize,
        )
    }

    /// Insert `n` blanks at the cursor, shifting the rest of the row right.
    pub(crate) fn insert_chars(&mut self, n: u16) {
        let (_, at, end) = self.cursor_row_span();
        let n = (n as usize).min(end - at);
        self.cells.copy_within(at..end - n, at + n);
        let blank = self.blank();
        self.cells[at..at + n].fill(blank);
        self.wrap_pending = false;
    }

    /// Delete `n` cells at the cursor, shifting the rest of the row left.
    pub(crate) fn delete_chars(&mut self, n: u16) {
        let (_, at, end) = self.cursor_row_span();
        let n = (n as usize).min(end - at);
        self.cells.copy_within(at + n..end, at);
        let blank = self.blank();
        self.cells[end - n..end].fill(blank);
        self.wrap_pending = false;
    }

    /// Blank `n` cells from the cursor without shifting.
    pub(crate) fn erase_chars(&mut self, n: u16) {
        let (_, at, end) = self.cursor_row_span();
        let n = (n as usize).min(end - at);
        let blank = self.blank();
        self.cells[at..at + n].fill(blank);
        self.wrap_pending = false;
    }

    /// Erase in display: 0 = cursor to end, 1 = start to cursor, 2/3 = all.
    pub(crate) fn erase_display(&mut self, mode: u32) {
        let (_, at, _) = self.cursor_row_span();
        let blank = self.blank();
        let total = self.cells.len();
        match mode {
            0 => self.cells[at..total].fill(blank),
            1 => self.cells[..=at].fill(blank),
            2 | 3 => self.cells.fill(blank),
            _ => {}
        }
    }

    /// Erase in line: 0 = cursor to end, 1 = start to cursor, 2 = whole row.
    pub(crate) fn erase_line(&mut self, mode: u32) {
        let (start, at, end) = self.cursor_row_span();
        let blank = self.blank();
        match mode {
            0 => self.cells[at..end].fill(blank),
            1 => self.cells[start..=at].fill(blank),
            2 | 3 => self.cells[start..end].fill(blank),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_rows(rows: &[&str]) -> Grid {
        let cols = rows.iter().map(|r| r.chars().count()).max().unwrap_or(1) as u16;
        let mut grid = Grid::new(Dimensions::new(rows.len() as u16, cols));
        for (row, text) in rows.iter().enumerate() {
            grid.print_str(Position::new(row as u16, 0), text, Cell::default());
        }
        grid
    }

    #[test]
    fn test_grid_new() {
        let grid = Grid::new(Dimensions::new(24, 80));
        assert_eq!(grid.dimensions().rows, 24);
        assert_eq!(grid.dimensions().cols, 80);
        assert_eq!(grid.cursor().position, Position::origin());
        assert!(grid.cursor_visible());
        assert_eq!(grid.scroll_region(), (0, 23));
        assert!(grid.autowrap());
        assert_eq!(grid.cells().len(), 24 * 80);
    }

    #[test]
    fn test_zero_dimensions_are_raised() {
        let grid = Grid::new(Dimensions::new(0, 0));
        assert_eq!(grid.dimensions(), Dimensions::new(1, 1));
        assert_eq!(grid.cells().len(), 1);
    }

    #[test]
    fn test_grid_cell_access() {
        let mut grid = Grid::new(Dimensions::new(10, 10));

        let cell = grid.cell(0, 0).unwrap();
        assert_eq!(cell.character, ' ');

        if let Some(cell) = grid.cell_mut(5, 5) {
            cell.character = 'X';
        }
        assert_eq!(grid.cell(5, 5).unwrap().character, 'X');

        assert!(grid.cell(10, 10).is_none());
        assert!(grid.cell_mut(10, 10).is_none());
    }

    #[test]
    fn test_grid_row_and_line() {
        let grid = grid_with_rows(&["0123456789", "abc"]);

        let row = grid.row(0).unwrap();
        assert_eq!(row.len(), 10);
        assert_eq!(row[0].character, '0');
        assert_eq!(row[9].character, '9');
        assert_eq!(grid.line(1).unwrap(), "abc       ");

        assert!(grid.row(2).is_none());
        assert!(grid.line(2).is_none());
    }

    #[test]
    fn test_grid_extract_text() {
        let grid = grid_with_rows(&["          ", " HELLO    "]);
        assert_eq!(grid.extract_text(&Bounds::new(1, 1, 20, 5)), "HELLO");
        assert_eq!(grid.extract_text(&Bounds::new(9, 0, 1, 1)), "");
    }

    #[test]
    fn test_grid_to_plain_text() {
        let grid = grid_with_rows(&["XOXOX", "OXOXO", "XOXOX"]);
        let text = grid.to_plain_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["XOXOX", "OXOXO", "XOXOX"]);
    }

    #[test]
    fn test_grid_resize_preserve() {
        let mut grid = Grid::new(Dimensions::new(5, 5));
        grid.fill_rect(Bounds::new(0, 0, 5, 5), Cell::new('A'));

        grid.resize(Dimensions::new(10, 10));
        assert_eq!(grid.dimensions(), Dimensions::new(10, 10));

        assert_eq!(grid.cell(0, 0).unwrap().character, 'A');
        assert_eq!(grid.cell(4, 4).unwrap().character, 'A');
        assert_eq!(grid.cell(4, 5).unwrap().character, ' ');
        assert_eq!(grid.cell(9, 9).unwrap().character, ' ');
        assert_eq!(grid.scroll_region(), (0, 9));
    }

    #[test]
    fn test_grid_resize_shrink_clamps_cursors() {
        let mut grid = Grid::new(Dimensions::new(10, 10));
        grid.set_tile(Position::new(2, 2), Cell::new('M'));
        grid.set_cursor_position(Position::new(8, 8));
        grid.save_cursor();
        grid.set_scroll_region(2, 9);

        grid.resize(Dimensions::new(5, 5));
        assert_eq!(grid.dimensions().rows, 5);
        assert_eq!(grid.cell(2, 2).unwrap().character, 'M');
        assert_eq!(grid.cursor().position, Position::new(4, 4));
        assert_eq!(grid.scroll_region(), (0, 4));

        grid.set_cursor_position(Position::origin());
        grid.restore_cursor();
        assert_eq!(grid.cursor().position, Position::new(4, 4));
    }

    #[test]
    fn test_cursor_default() {
        let cursor = Cursor::default();
        assert_eq!(cursor.position, Position::origin());
        assert!(cursor.visible);
    }

    #[test]
    fn test_cursor_save_restore() {
        let mut grid = Grid::new(Dimensions::new(24, 80));

        grid.set_cursor_position(Position::new(10, 20));
        grid.save_cursor();

        grid.set_cursor_position(Position::new(5, 5));
        assert_eq!(grid.cursor().position, Position::new(5, 5));

        grid.restore_cursor();
        assert_eq!(grid.cursor().position, Position::new(10, 20));

        // The slot is kept for repeated restores.
        grid.set_cursor_position(Position::new(1, 1));
        grid.restore_cursor();
        assert_eq!(grid.cursor().position, Position::new(10, 20));
    }

    #[test]
    fn test_set_cursor_position_clamps() {
        let mut grid = Grid::new(Dimensions::new(24, 80));
        grid.set_cursor_position(Position::new(100, 100));
        assert_eq!(grid.cursor().position, Position::new(23, 79));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut grid = Grid::new(Dimensions::new(5, 5));
        grid.fill_rect(Bounds::new(3, 3, 10, 10), Cell::new('#'));
        assert_eq!(grid.to_plain_text(), "\n\n\n   ##\n   ##");
        grid.fill_rect(Bounds::new(7, 7, 2, 2), Cell::new('!'));
        assert!(!grid.to_plain_text().contains('!'));
    }

    #[test]
    fn test_print_str_truncates() {
        let mut grid = Grid::new(Dimensions::new(2, 6));
        let style = Cell::with_colors(' ', Color::Yellow, Color::Blue);
        grid.print_str(Position::new(1, 3), "status", style);
        assert_eq!(grid.line(1).unwrap(), "   sta");
        assert_eq!(grid.cell(1, 3).unwrap().fg, Color::Yellow);
        assert_eq!(grid.cell(1, 3).unwrap().bg, Color::Blue);
        assert_eq!(grid.line(0).unwrap(), "      ");
    }

    #[test]
    fn test_blit_from_clamps_cursor() {
        let mut source = grid_with_rows(&["abcdef", "ghijkl", "mnopqr"]);
        source.set_cursor_position(Position::new(2, 5));
        source.set_cursor_visible(false);

        let mut frame = Grid::new(Dimensions::new(2, 4));
        frame.blit_from(&source);
        assert_eq!(frame.line(0).unwrap(), "abcd");
        assert_eq!(frame.line(1).unwrap(), "ghij");
        assert_eq!(frame.cursor().position, Position::new(1, 3));
        assert!(!frame.cursor_visible());
    }

    #[test]
    fn test_scroll_region_shifts() {
        let mut grid = grid_with_rows(&["0", "1", "2", "3", "4"]);
        grid.set_scroll_region(1, 3);
        grid.scroll_up(1);
        assert_eq!(grid.to_plain_text(), "0\n2\n3\n\n4");
        grid.scroll_down(2);
        assert_eq!(grid.to_plain_text(), "0\n\n\n2\n4");
    }

    #[test]
    fn test_invalid_scroll_region_resets() {
        let mut grid = Grid::new(Dimensions::new(10, 10));
        grid.set_scroll_region(2, 5);
        assert_eq!(grid.scroll_region(), (2, 5));
        grid.set_scroll_region(5, 5);
        assert_eq!(grid.scroll_region(), (5, 5));
        grid.set_scroll_region(6, 5);
        assert_eq!(grid.scroll_region(), (0, 9));
        grid.set_scroll_region(3, 200);
        assert_eq!(grid.scroll_region(), (3, 9));
    }

    #[test]
    fn test_insert_delete_lines_outside_region_are_noops() {
        let mut grid = grid_with_rows(&["0", "1", "2", "3"]);
        grid.set_scroll_region(1, 2);
        grid.set_cursor_position(Position::new(3, 0));
        grid.insert_lines(1);
        grid.delete_lines(1);
        assert_eq!(grid.to_plain_text(), "0\n1\n2\n3");

        grid.set_cursor_position(Position::new(1, 0));
        grid.insert_lines(1);
        assert_eq!(grid.to_plain_text(), "0\n\n1\n3");
    }

    #[test]
    fn test_character_shifts_use_pen() {
        let mut grid = grid_with_rows(&["abcdef"]);
        grid.set_current_bg(Color::Red);
        grid.set_cursor_position(Position::new(0, 1));

        grid.insert_chars(2);
        assert_eq!(grid.line(0).unwrap(), "a  bcd");
        assert_eq!(grid.cell(0, 1).unwrap().bg, Color::Red);

        grid.delete_chars(3);
        assert_eq!(grid.line(0).unwrap(), "acd   ");
        assert_eq!(grid.cell(0, 5).unwrap().bg, Color::Red);

        grid.erase_chars(100);
        assert_eq!(grid.line(0).unwrap(), "a     ");
    }

    #[test]
    fn test_erase_modes_are_inclusive() {
        let mut grid = grid_with_rows(&["aaaa", "bbbb", "cccc"]);
        grid.set_cursor_position(Position::new(1, 1));
        grid.erase_line(1);
        assert_eq!(grid.line(1).unwrap(), "  bb");
        grid.erase_display(0);
        assert_eq!(grid.to_plain_text(), "aaaa\n\n");

        let mut grid = grid_with_rows(&["aaaa", "bbbb", "cccc"]);
        grid.set_cursor_position(Position::new(1, 2));
        grid.erase_display(1);
        assert_eq!(grid.to_plain_text(), "\n   b\ncccc");
        grid.erase_display(2);
        assert_eq!(grid.to_plain_text(), "\n\n");
    }
}
