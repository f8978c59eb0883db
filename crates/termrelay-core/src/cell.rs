//! Cell and color types for the terminal grid.

use serde::{Deserialize, Serialize};

/// One of the eight basic ANSI colors, or the "use default" sentinel.
///
/// The numeric index is the SGR offset (`30 + index` for foreground,
/// `40 + index` for background). [`Color::Default`] has index 9 and is
/// resolved to white (foreground) or black (background) when encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// ANSI Black (0)
    Black,
    /// ANSI Red (1)
    Red,
    /// ANSI Green (2)
    Green,
    /// ANSI Yellow (3)
    Yellow,
    /// ANSI Blue (4)
    Blue,
    /// ANSI Magenta (5)
    Magenta,
    /// ANSI Cyan (6)
    Cyan,
    /// ANSI White (7)
    White,
    /// Use the terminal default (9)
    Default,
}

impl Color {
    /// Default foreground color.
    pub const DEFAULT_FG: Color = Color::White;
    /// Default background color.
    pub const DEFAULT_BG: Color = Color::Black;

    /// Color for an SGR index (`0..=7`, or `9` for default).
    ///
    /// Returns None for indices with no basic color (8 is the extended-color
    /// introducer and is not modeled).
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Color::Black),
            1 => Some(Color::Red),
            2 => Some(Color::Green),
            3 => Some(Color::Yellow),
            4 => Some(Color::Blue),
            5 => Some(Color::Magenta),
            6 => Some(Color::Cyan),
            7 => Some(Color::White),
            9 => Some(Color::Default),
            _ => None,
        }
    }

    /// SGR index of this color.
    pub fn index(self) -> u8 {
        match self {
            Color::Black => 0,
            Color::Red => 1,
            Color::Green => 2,
            Color::Yellow => 3,
            Color::Blue => 4,
            Color::Magenta => 5,
            Color::Cyan => 6,
            Color::White => 7,
            Color::Default => 9,
        }
    }

    /// Resolve [`Color::Default`] as a foreground color.
    pub fn resolve_fg(self) -> Self {
        match self {
            Color::Default => Self::DEFAULT_FG,
            other => other,
        }
    }

    /// Resolve [`Color::Default`] as a background color.
    pub fn resolve_bg(self) -> Self {
        match self {
            Color::Default => Self::DEFAULT_BG,
            other => other,
        }
    }

    /// Exchange red with blue and yellow with cyan.
    ///
    /// Some clients render the palette with red and blue channels swapped.
    pub fn swap_red_blue(self) -> Self {
        match self {
            Color::Red => Color::Blue,
            Color::Blue => Color::Red,
            Color::Yellow => Color::Cyan,
            Color::Cyan => Color::Yellow,
            other => other,
        }
    }
}

/// Text attributes for a terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellAttributes {
    /// Bold/bright text
    pub bold: bool,
    /// Reverse video (swap fg/bg)
    pub inverse: bool,
}

impl CellAttributes {
    /// Check if attributes are all default (no formatting).
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Create attributes with bold enabled.
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Create attributes with inverse video enabled.
    pub fn with_inverse(mut self) -> Self {
        self.inverse = true;
        self
    }
}

/// Single character cell in the terminal grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Unicode character (space if empty)
    pub character: char,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Text attributes
    pub attrs: CellAttributes,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            character: ' ',
            fg: Color::DEFAULT_FG,
            bg: Color::DEFAULT_BG,
            attrs: CellAttributes::default(),
        }
    }
}

impl Cell {
    /// Create a new cell with a character and default styling.
    pub fn new(character: char) -> Self {
        Self {
            character,
            ..Default::default()
        }
    }

    /// Create a cell with character and colors.
    pub fn with_colors(character: char, fg: Color, bg: Color) -> Self {
        Self {
            character,
            fg,
            bg,
            attrs: CellAttributes::default(),
        }
    }

    /// Same styling, different character.
    pub fn with_character(self, character: char) -> Self {
        Self { character, ..self }
    }

    /// Check if cell is blank (space with default colors and attributes).
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}
