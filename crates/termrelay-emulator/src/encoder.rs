//! Differential update encoder.
//!
//! Turns a [`Grid`] back into an escape-sequence byte stream. Given the grid
//! a client is known to show, only the cells that differ are emitted; without
//! one, the whole screen is redrawn.

use termrelay_core::{Cell, Color, Position};

use crate::grid::{Cursor, Grid};

/// Reset prologue every payload starts with.
///
/// Afterwards the client pen is black on black, not bold, not inverse.
pub const RESET_PROLOGUE: &[u8] = b"\x1b[0m\x1b[40m\x1b[30m";

/// Output options for one client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Swap red/blue (and yellow/cyan) in emitted colors
    pub red_blue_swap: bool,
}

/// Emitted pen state, as the client sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pen {
    fg: u8,
    bg: u8,
    bold: bool,
    inverse: bool,
}

impl Pen {
    /// State right after [`RESET_PROLOGUE`].
    const AFTER_RESET: Pen = Pen {
        fg: 0,
        bg: 0,
        bold: false,
        inverse: false,
    };

    /// Emit one SGR with the parameters that differ from `self`, in the
    /// order fg, bg, bold, inverse.
    fn transition(&mut self, target: Pen, out: &mut Vec<u8>) {
        let mut params: Vec<u32> = Vec::with_capacity(4);
        if target.fg != self.fg {
            params.push(30 + u32::from(target.fg));
        }
        if target.bg != self.bg {
            params.push(40 + u32::from(target.bg));
        }
        if target.bold != self.bold {
            params.push(if target.bold { 1 } else { 22 });
        }
        if target.inverse != self.inverse {
            params.push(if target.inverse { 7 } else { 27 });
        }
        if !params.is_empty() {
            push_csi(out, &params, b'm');
        }
        *self = target;
    }
}

fn push_csi(out: &mut Vec<u8>, params: &[u32], final_byte: u8) {
    out.extend_from_slice(b"\x1b[");
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            out.push(b';');
        }
        out.extend_from_slice(p.to_string().as_bytes());
    }
    out.push(final_byte);
}

fn push_position(out: &mut Vec<u8>, pos: Position) {
    push_csi(
        out,
        &[u32::from(pos.row) + 1, u32::from(pos.col) + 1],
        b'H',
    );
}

fn shows_cursor_at(cursor: &Cursor, pos: Position) -> bool {
    cursor.visible && cursor.position == pos
}

/// Differential update encoder.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    options: EncodeOptions,
}

impl Encoder {
    /// Create an encoder with the given options.
    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }

    /// Options in effect.
    pub fn options(&self) -> EncodeOptions {
        self.options
    }

    /// Full redraw of `grid`.
    pub fn update_cycle(&self, grid: &Grid) -> Vec<u8> {
        self.encode(grid, None, None)
    }

    /// Changes from `previous` to `grid`, ignoring cells whose new character
    /// is in `skip`.
    pub fn restricted_update_cycle(
        &self,
        grid: &Grid,
        previous: &Grid,
        skip: Option<&[char]>,
    ) -> Vec<u8> {
        self.encode(grid, Some(previous), skip)
    }

    /// Encode `grid` relative to `reference`.
    ///
    /// Replaying the output on a terminal that shows `reference` makes it
    /// show `grid`, with the cursor drawn as a color-swapped cell when
    /// visible. Returns an empty payload when nothing changed. `reference`
    /// must have the same dimensions as `grid`.
    pub fn encode(&self, grid: &Grid, reference: Option<&Grid>, skip: Option<&[char]>) -> Vec<u8> {
        let dims = grid.dimensions();
        if let Some(reference) = reference {
            debug_assert_eq!(
                reference.dimensions(),
                dims,
                "reference grid must match the encoded grid"
            );
        }
        let reference = reference.filter(|r| r.dimensions() == dims);
        let skip = skip.unwrap_or(&[]);

        let cursor = *grid.cursor();
        let previous_cursor = reference.map(|r| *r.cursor());
        let cursor_changed = previous_cursor.is_some_and(|c| c != cursor);

        let mut out = Vec::with_capacity(RESET_PROLOGUE.len() + 16);
        out.extend_from_slice(RESET_PROLOGUE);
        let mut pen = Pen::AFTER_RESET;
        let mut next: Option<Position> = None;
        let mut written = false;

        let cells = grid.cells();
        let cols = dims.cols as usize;

        for (idx, cell) in cells.iter().enumerate() {
            let pos = Position::new((idx / cols) as u16, (idx % cols) as u16);

            if let (Some(reference), Some(previous)) = (reference, previous_cursor) {
                // The visual cursor is baked into cell colors, so both the old
                // and the new cursor cell are redrawn when it changes.
                let forced = cursor_changed
                    && (shows_cursor_at(&cursor, pos) || shows_cursor_at(&previous, pos));
                if !forced && (*cell == reference.cells()[idx] || skip.contains(&cell.character)) {
                    continue;
                }
            }

            if next != Some(pos) {
                push_position(&mut out, pos);
            }
            pen.transition(self.pen_for(cell, shows_cursor_at(&cursor, pos)), &mut out);
            push_char(&mut out, cell.character);
            written = true;

            next = (pos.col + 1 < dims.cols).then(|| Position::new(pos.row, pos.col + 1));
        }

        let moved = previous_cursor.map_or(true, |c| c.position != cursor.position);
        if !written && !moved {
            return Vec::new();
        }
        push_position(&mut out, cursor.position);
        out
    }

    fn pen_for(&self, cell: &Cell, at_cursor: bool) -> Pen {
        let mut fg = cell.fg.resolve_fg();
        let mut bg = cell.bg.resolve_bg();
        if self.options.red_blue_swap {
            fg = fg.swap_red_blue();
            bg = bg.swap_red_blue();
        }
        if at_cursor {
            std::mem::swap(&mut fg, &mut bg);
        }
        Pen {
            fg: color_index(fg),
            bg: color_index(bg),
            bold: cell.attrs.bold,
            inverse: cell.attrs.inverse,
        }
    }
}

fn color_index(color: Color) -> u8 {
    // Resolved colors are always basic; guard the sentinel anyway.
    color.index().min(7)
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let c = if (c as u32) < 0x20 { ' ' } else { c };
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use termrelay_core::{CellAttributes, Dimensions};

    fn hidden(rows: u16, cols: u16) -> Grid {
        let mut grid = Grid::new(Dimensions::new(rows, cols));
        grid.set_cursor_visible(false);
        grid
    }

    fn replay(rows: u16, cols: u16, payload: &[u8]) -> Grid {
        let mut grid = Grid::new(Dimensions::new(rows, cols));
        grid.feed(payload);
        grid
    }

    #[test]
    fn test_hello_scenario() {
        let mut grid = Grid::new(Dimensions::new(24, 80));
        grid.feed(b"\x1b[2J\x1b[1;1HHello");

        let out = Encoder::default().update_cycle(&grid);
        assert!(out.starts_with(RESET_PROLOGUE));
        assert!(out.ends_with(b"\x1b[1;6H"));

        let client = replay(24, 80, &out);
        for col in 0..5 {
            assert_eq!(client.cell(0, col), grid.cell(0, col));
        }
        assert_eq!(client.cursor().position, Position::new(0, 5));
        // The visible cursor is drawn as an inverted blank.
        let cursor_cell = client.cell(0, 5).unwrap();
        assert_eq!(cursor_cell.fg, Color::Black);
        assert_eq!(cursor_cell.bg, Color::White);
    }

    #[test]
    fn test_sgr_diff_emits_only_changes() {
        let mut grid = hidden(1, 2);
        grid.set_tile(Position::new(0, 0), Cell::with_colors('a', Color::Red, Color::Black));
        grid.set_tile(Position::new(0, 1), Cell::with_colors('b', Color::Green, Color::Black));

        let out = Encoder::default().update_cycle(&grid);
        assert_eq!(
            out,
            b"\x1b[0m\x1b[40m\x1b[30m\x1b[1;1H\x1b[31ma\x1b[32mb\x1b[1;1H".to_vec()
        );
    }

    #[test]
    fn test_attribute_transitions() {
        let mut grid = hidden(1, 3);
        let bold = Cell {
            attrs: CellAttributes::default().with_bold().with_inverse(),
            ..Cell::new('x')
        };
        grid.set_tile(Position::new(0, 0), bold);
        grid.set_tile(Position::new(0, 1), Cell::new('y'));
        grid.set_tile(Position::new(0, 2), Cell::new('z'));

        let out = Encoder::default().update_cycle(&grid);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[37;1;7mx\x1b[22;27my"));
        assert!(text.contains("yz"));
    }

    #[test]
    fn test_identical_grids_encode_to_nothing() {
        let mut grid = Grid::new(Dimensions::new(5, 10));
        grid.feed(b"\x1b[31mred\x1b[0m plain");
        let encoder = Encoder::default();
        assert!(encoder.encode(&grid, Some(&grid), None).is_empty());
    }

    #[test]
    fn test_delta_only_touches_changed_cells() {
        let mut before = hidden(2, 10);
        before.feed(b"abc");
        let mut after = before.clone();
        after.feed(b"\x08d");

        let out = Encoder::default().restricted_update_cycle(&after, &before, None);
        assert_eq!(
            out,
            b"\x1b[0m\x1b[40m\x1b[30m\x1b[1;3H\x1b[37md\x1b[1;4H".to_vec()
        );

        let mut client = before.clone();
        client.feed(&out);
        assert_eq!(client.cells(), after.cells());
    }

    #[test]
    fn test_cursor_only_move() {
        let before = hidden(3, 3);
        let mut after = before.clone();
        after.set_cursor_position(Position::new(2, 1));

        let out = Encoder::default().encode(&after, Some(&before), None);
        assert_eq!(out, b"\x1b[0m\x1b[40m\x1b[30m\x1b[3;2H".to_vec());
    }

    #[test]
    fn test_moving_visible_cursor_redraws_both_cells() {
        let mut before = Grid::new(Dimensions::new(1, 4));
        before.feed(b"ab\x1b[1;1H");
        let mut after = before.clone();
        after.set_cursor_position(Position::new(0, 1));

        let out = Encoder::default().encode(&after, Some(&before), None);
        let client = replay(1, 4, &out);
        // Old cursor cell restored to normal colors, new one inverted.
        assert_eq!(client.cell(0, 0), Some(&Cell::new('a')));
        assert_eq!(client.cell(0, 1).unwrap().bg, Color::White);
        assert_eq!(client.cell(0, 2).unwrap().character, ' ');
    }

    #[test]
    fn test_skip_set_ignores_characters() {
        let before = hidden(1, 4);
        let mut after = before.clone();
        after.print_str(Position::origin(), "x.x.", Cell::default());

        let out = Encoder::default().restricted_update_cycle(&after, &before, Some(&['x']));
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains('x'));
        assert_eq!(text.matches('.').count(), 2);

        // A full redraw never skips.
        let full = Encoder::default().encode(&after, None, Some(&['x']));
        assert!(String::from_utf8(full).unwrap().contains("x.x."));
    }

    #[test]
    fn test_red_blue_swap() {
        let mut grid = hidden(1, 1);
        grid.set_tile(Position::origin(), Cell::with_colors('r', Color::Red, Color::Cyan));

        let plain = String::from_utf8(Encoder::default().update_cycle(&grid)).unwrap();
        assert!(plain.contains("\x1b[31;46mr"));

        let swapped = Encoder::new(EncodeOptions { red_blue_swap: true });
        let text = String::from_utf8(swapped.update_cycle(&grid)).unwrap();
        assert!(text.contains("\x1b[34;43mr"));
    }

    #[test]
    fn test_default_colors_and_control_chars() {
        let mut grid = hidden(1, 2);
        grid.set_tile(
            Position::origin(),
            Cell::with_colors('\u{1}', Color::Default, Color::Default),
        );

        let out = Encoder::default().update_cycle(&grid);
        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.contains("\x1b[37m "));
        assert!(!out.contains(&0x01));
    }

    #[test]
    fn test_new_row_gets_cursor_position() {
        let mut before = hidden(3, 3);
        before.feed(b"aaabbbccc");
        let mut after = before.clone();
        after.set_tile(Position::new(0, 2), Cell::new('X'));
        after.set_tile(Position::new(1, 0), Cell::new('Y'));

        let out = Encoder::default().restricted_update_cycle(&after, &before, None);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[1;3H\x1b[37mX\x1b[2;1HY"));
    }
}
