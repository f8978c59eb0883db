//! Byte stream interpreter: applies escape sequences and text to a [`Grid`].

use tracing::trace;

use termrelay_core::{Bounds, Cell, CellAttributes, Color, Position};

use crate::grid::Grid;
use crate::matcher::{match_sequence, MatchResult, SequenceMatch};
use crate::sequence::SequenceId;

const ESC: u8 = 0x1b;
const TAB_WIDTH: u16 = 8;

/// Result of decoding one unit from the front of the pending input.
enum Step {
    /// This many bytes were applied.
    Consumed(usize),
    /// The front of the input is an unfinished sequence or code point.
    Incomplete,
}

impl Grid {
    /// Apply raw output bytes from the producer.
    ///
    /// Input is decoded into control sequences and UTF-8 text. An unfinished
    /// escape sequence or code point at the end is kept and completed by the
    /// next call, so splitting a stream at arbitrary points gives the same
    /// result as feeding it whole.
    pub fn feed(&mut self, bytes: &[u8]) {
        let mut pending = std::mem::take(&mut self.carry);
        pending.extend_from_slice(bytes);

        let mut offset = 0;
        while offset < pending.len() {
            let rest = &pending[offset..];
            match self.decode(rest) {
                Step::Consumed(n) => offset += n,
                Step::Incomplete => match self.carry_limit() {
                    Some(limit) if rest.len() > limit => {
                        trace!(pending = rest.len(), limit, "Carry limit exceeded, emitting byte");
                        self.put_literal(rest[0]);
                        offset += 1;
                    }
                    _ => break,
                },
            }
        }

        pending.drain(..offset);
        self.carry = pending;
    }

    fn decode(&mut self, rest: &[u8]) -> Step {
        match rest[0] {
            ESC => match match_sequence(rest, rest.len()) {
                MatchResult::Matched(m) => {
                    self.dispatch(&m);
                    Step::Consumed(m.consumed)
                }
                MatchResult::Partial => Step::Incomplete,
                MatchResult::NoMatch => {
                    self.put_char(' ');
                    Step::Consumed(1)
                }
            },
            b if b < 0x20 => {
                self.execute(b);
                Step::Consumed(1)
            }
            b if b < 0x80 => {
                self.put_char(b as char);
                Step::Consumed(1)
            }
            _ => self.decode_utf8(rest),
        }
    }

    fn decode_utf8(&mut self, rest: &[u8]) -> Step {
        let window = &rest[..rest.len().min(4)];
        let text = match std::str::from_utf8(window) {
            Ok(text) => text,
            Err(e) if e.valid_up_to() > 0 => {
                std::str::from_utf8(&window[..e.valid_up_to()]).unwrap_or_default()
            }
            Err(e) if e.error_len().is_none() => return Step::Incomplete,
            Err(_) => {
                self.put_char(char::REPLACEMENT_CHARACTER);
                return Step::Consumed(1);
            }
        };
        match text.chars().next() {
            Some(c) => {
                self.put_char(c);
                Step::Consumed(c.len_utf8())
            }
            None => Step::Consumed(1),
        }
    }

    /// Write a byte that could not be decoded as text.
    fn put_literal(&mut self, byte: u8) {
        match byte {
            b if b < 0x20 => self.put_char(' '),
            b if b < 0x80 => self.put_char(b as char),
            _ => self.put_char(char::REPLACEMENT_CHARACTER),
        }
    }

    /// Write a printable character at the cursor in the current pen.
    fn put_char(&mut self, c: char) {
        let dims = self.dimensions();
        if self.wrap_pending {
            self.wrap_pending = false;
            let row = self.cursor().position.row;
            self.set_cursor_position(Position::new(row, 0));
            self.line_feed();
        }

        let pos = self.cursor().position;
        let cell = self.pen().with_character(c);
        self.set_tile(pos, cell);

        if pos.col + 1 < dims.cols {
            self.set_cursor_position(Position::new(pos.row, pos.col + 1));
        } else if self.autowrap() {
            self.wrap_pending = true;
        }
    }

    /// Execute a C0 control byte.
    fn execute(&mut self, byte: u8) {
        let pos = self.cursor().position;
        match byte {
            // BEL
            0x07 => {}

            // Backspace (BS)
            0x08 => self.set_cursor_position(Position::new(pos.row, pos.col.saturating_sub(1))),

            // Horizontal Tab (HT)
            0x09 => {
                let next = (pos.col / TAB_WIDTH + 1) * TAB_WIDTH;
                if next < self.dimensions().cols {
                    self.set_cursor_position(Position::new(pos.row, next));
                } else {
                    self.set_cursor_position(Position::new(pos.row, 0));
                    self.line_feed();
                }
            }

            // Line Feed (LF)
            0x0A => self.line_feed(),

            // Carriage Return (CR)
            0x0D => self.set_cursor_position(Position::new(pos.row, 0)),

            _ => self.put_char(' '),
        }
    }

    fn move_cursor(&mut self, row: i64, col: i64) {
        let dims = self.dimensions();
        let row = row.clamp(0, i64::from(dims.rows) - 1) as u16;
        let col = col.clamp(0, i64::from(dims.cols) - 1) as u16;
        self.set_cursor_position(Position::new(row, col));
    }

    fn move_relative(&mut self, rows: i64, cols: i64) {
        let pos = self.cursor().position;
        self.move_cursor(i64::from(pos.row) + rows, i64::from(pos.col) + cols);
    }

    /// Apply one recognized control sequence.
    fn dispatch(&mut self, m: &SequenceMatch) {
        let pos = self.cursor().position;
        let n = i64::from(m.count(0));
        let count = m.count(0).min(u32::from(u16::MAX)) as u16;

        match m.id {
            SequenceId::CursorUp => self.move_relative(-n, 0),
            SequenceId::CursorDown => self.move_relative(n, 0),
            SequenceId::CursorForward => self.move_relative(0, n),
            SequenceId::CursorBack => self.move_relative(0, -n),
            SequenceId::CursorNextLine => self.move_cursor(i64::from(pos.row) + n, 0),
            SequenceId::CursorPrevLine => self.move_cursor(i64::from(pos.row) - n, 0),
            SequenceId::CursorColumn | SequenceId::ColumnAbsolute => {
                self.move_cursor(i64::from(pos.row), n - 1)
            }
            SequenceId::RowAbsolute => self.move_cursor(n - 1, i64::from(pos.col)),
            SequenceId::CursorHome => self.move_cursor(0, 0),
            SequenceId::CursorPosition | SequenceId::HorizontalVerticalPosition => {
                let row = i64::from(m.count(0)) - 1;
                let col = i64::from(m.count(1)) - 1;
                self.move_cursor(row, col);
            }
            SequenceId::BackTab => {
                let mut col = pos.col;
                for _ in 0..count {
                    if col == 0 {
                        break;
                    }
                    col = (col - 1) / TAB_WIDTH * TAB_WIDTH;
                }
                self.move_cursor(i64::from(pos.row), i64::from(col));
            }

            SequenceId::EraseDisplay | SequenceId::PrivateEraseDisplay => {
                self.erase_display(m.param_or(0, 0))
            }
            SequenceId::EraseLine | SequenceId::PrivateEraseLine => {
                self.erase_line(m.param_or(0, 0))
            }
            SequenceId::InsertLines => self.insert_lines(count),
            SequenceId::DeleteLines => self.delete_lines(count),
            SequenceId::InsertChars => self.insert_chars(count),
            SequenceId::DeleteChars => self.delete_chars(count),
            SequenceId::EraseChars => self.erase_chars(count),
            SequenceId::ScrollUp => self.scroll_up(count),
            SequenceId::ScrollDown => self.scroll_down(count),

            SequenceId::ScrollRegion => {
                let rows = u32::from(self.dimensions().rows);
                let top = m.count(0).min(rows) - 1;
                let bottom = match m.param_or(1, 0) {
                    0 => rows,
                    b => b.min(rows),
                } - 1;
                self.set_scroll_region(top as u16, bottom as u16);
            }

            SequenceId::SelectGraphicRendition => self.select_graphic_rendition(&m.params),

            SequenceId::PrivateModeSet => self.set_private_modes(&m.params, true),
            SequenceId::PrivateModeReset => self.set_private_modes(&m.params, false),

            SequenceId::SaveCursor | SequenceId::SaveCursorAnsi => self.save_cursor(),
            SequenceId::RestoreCursor | SequenceId::RestoreCursorAnsi => self.restore_cursor(),

            SequenceId::Index => self.line_feed(),
            SequenceId::ReverseIndex => self.reverse_line_feed(),
            SequenceId::NextLine => {
                self.line_feed();
                let row = self.cursor().position.row;
                self.set_cursor_position(Position::new(row, 0));
            }

            SequenceId::AlignmentTest => {
                self.fill_rect(Bounds::full(self.dimensions()), Cell::new('E'));
            }

            // Recognized for framing only.
            SequenceId::MouseTracking
            | SequenceId::Repeat
            | SequenceId::RestorePrivateModes
            | SequenceId::KeypadNumeric
            | SequenceId::DesignateG0
            | SequenceId::OscStringTerminated
            | SequenceId::OscBellTerminated
            | SequenceId::SetMode
            | SequenceId::ResetMode
            | SequenceId::DeviceAttributes
            | SequenceId::DeviceAttributesEsc => {}
        }
    }

    /// Process SGR (Select Graphic Rendition) parameters.
    fn select_graphic_rendition(&mut self, params: &[u32]) {
        if params.is_empty() {
            self.reset_pen();
            return;
        }

        for &code in params {
            let mut attrs = self.pen().attrs;
            match code {
                0 => self.reset_pen(),
                1 => self.set_current_attrs(CellAttributes { bold: true, ..attrs }),
                22 => self.set_current_attrs(CellAttributes { bold: false, ..attrs }),
                7 => {
                    attrs.inverse = true;
                    self.set_current_attrs(attrs);
                }
                27 => {
                    attrs.inverse = false;
                    self.set_current_attrs(attrs);
                }
                30..=37 => {
                    if let Some(color) = Color::from_index(code - 30) {
                        self.set_current_fg(color);
                    }
                }
                39 => self.set_current_fg(Color::DEFAULT_FG),
                40..=47 => {
                    if let Some(color) = Color::from_index(code - 40) {
                        self.set_current_bg(color);
                    }
                }
                49 => self.set_current_bg(Color::DEFAULT_BG),
                _ => {}
            }
        }
    }

    fn set_private_modes(&mut self, params: &[u32], enable: bool) {
        for &mode in params {
            match mode {
                7 => self.set_autowrap(enable),
                25 => self.set_cursor_visible(enable),
                1049 if enable => self.save_cursor(),
                1049 => self.restore_cursor(),
                _ => {}
            }
        }
    }
}
