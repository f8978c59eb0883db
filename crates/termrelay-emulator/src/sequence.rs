//! Control sequence template table.
//!
//! Every recognized escape sequence is described by a [`Template`]: a short
//! list of [`Token`]s mixing literal bytes with parameter placeholders. The
//! table order is the match priority; the first template that matches
//! completely wins.

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// Semantic identity of a recognized control sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceId {
    /// `CSI n @` insert blank characters (ICH)
    InsertChars,
    /// `CSI n A` cursor up (CUU)
    CursorUp,
    /// `CSI n B` cursor down (CUD)
    CursorDown,
    /// `CSI n C` cursor forward (CUF)
    CursorForward,
    /// `CSI n D` cursor back (CUB)
    CursorBack,
    /// `CSI n E` cursor to start of a following line (CNL)
    CursorNextLine,
    /// `CSI n F` cursor to start of a preceding line (CPL)
    CursorPrevLine,
    /// `CSI n G` cursor to column (CHA)
    CursorColumn,
    /// `CSI H` without parameters
    CursorHome,
    /// `CSI row;col H` cursor position (CUP)
    CursorPosition,
    /// `CSI n J` erase in display (ED)
    EraseDisplay,
    /// `CSI ? n J` selective erase in display (DECSED)
    PrivateEraseDisplay,
    /// `CSI n L` insert lines (IL)
    InsertLines,
    /// `CSI n M` delete lines (DL)
    DeleteLines,
    /// `CSI n P` delete characters (DCH)
    DeleteChars,
    /// `CSI n S` scroll up (SU)
    ScrollUp,
    /// `CSI n T` scroll down (SD)
    ScrollDown,
    /// `CSI n K` erase in line (EL)
    EraseLine,
    /// `CSI ? n K` selective erase in line (DECSEL)
    PrivateEraseLine,
    /// `CSI a;b;c;d;e T` mouse highlight tracking (ignored)
    MouseTracking,
    /// `CSI n X` erase characters (ECH)
    EraseChars,
    /// `CSI n Z` cursor backward tabulation (CBT)
    BackTab,
    /// `` CSI n ` `` character position absolute (HPA)
    ColumnAbsolute,
    /// `CSI n b` repeat preceding character (REP, ignored)
    Repeat,
    /// `CSI n m` select graphic rendition (SGR)
    SelectGraphicRendition,
    /// `CSI ? n l` DEC private mode reset (DECRST)
    PrivateModeReset,
    /// `CSI ? n h` DEC private mode set (DECSET)
    PrivateModeSet,
    /// `CSI ? n r` restore DEC private modes (ignored)
    RestorePrivateModes,
    /// `ESC >` numeric keypad mode (ignored)
    KeypadNumeric,
    /// `ESC ( C` designate G0 character set (ignored)
    DesignateG0,
    /// `CSI n d` line position absolute (VPA)
    RowAbsolute,
    /// `CSI top;bottom r` set scrolling region (DECSTBM)
    ScrollRegion,
    /// `ESC ] n ; text ESC \` operating system command (title)
    OscStringTerminated,
    /// `ESC ] n ; text BEL` operating system command (title)
    OscBellTerminated,
    /// `ESC M` reverse index (RI)
    ReverseIndex,
    /// `CSI n h` ANSI set mode (ignored)
    SetMode,
    /// `CSI n l` ANSI reset mode (ignored)
    ResetMode,
    /// `ESC 7` save cursor (DECSC)
    SaveCursor,
    /// `ESC 8` restore cursor (DECRC)
    RestoreCursor,
    /// `CSI s` save cursor (SCOSC)
    SaveCursorAnsi,
    /// `CSI u` restore cursor (SCORC)
    RestoreCursorAnsi,
    /// `CSI row;col f` horizontal and vertical position (HVP)
    HorizontalVerticalPosition,
    /// `CSI n c` primary device attributes (ignored)
    DeviceAttributes,
    /// `ESC c` (treated as primary device attributes, ignored)
    DeviceAttributesEsc,
    /// `ESC # 8` screen alignment test (DECALN)
    AlignmentTest,
    /// `ESC D` index (IND)
    Index,
    /// `ESC E` next line (NEL)
    NextLine,
}

/// One element of a sequence template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Exactly this byte.
    Literal(u8),
    /// Zero or one decimal number.
    OptionalNumber,
    /// Zero or more decimal numbers separated by `;`.
    NumberList,
    /// Any single byte, captured.
    Character,
    /// A run of bytes `>= 0x20`, discarded.
    OptionalString,
}

/// A recognized control sequence pattern.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    /// What the sequence means.
    pub id: SequenceId,
    /// The pattern, matched left to right.
    pub tokens: &'static [Token],
}

use SequenceId as S;
use Token::{Character as C, Literal as L, NumberList as Nl, OptionalNumber as N, OptionalString as Str};

const fn seq(id: SequenceId, tokens: &'static [Token]) -> Template {
    Template { id, tokens }
}

/// All recognized sequences in priority order.
pub static TEMPLATES: &[Template] = &[
    seq(S::InsertChars, &[L(ESC), L(b'['), N, L(b'@')]),
    seq(S::CursorUp, &[L(ESC), L(b'['), N, L(b'A')]),
    seq(S::CursorDown, &[L(ESC), L(b'['), N, L(b'B')]),
    seq(S::CursorForward, &[L(ESC), L(b'['), N, L(b'C')]),
    seq(S::CursorBack, &[L(ESC), L(b'['), N, L(b'D')]),
    seq(S::CursorNextLine, &[L(ESC), L(b'['), N, L(b'E')]),
    seq(S::CursorPrevLine, &[L(ESC), L(b'['), N, L(b'F')]),
    seq(S::CursorColumn, &[L(ESC), L(b'['), N, L(b'G')]),
    seq(S::CursorHome, &[L(ESC), L(b'['), L(b'H')]),
    seq(S::CursorPosition, &[L(ESC), L(b'['), Nl, L(b'H')]),
    seq(S::EraseDisplay, &[L(ESC), L(b'['), N, L(b'J')]),
    seq(S::PrivateEraseDisplay, &[L(ESC), L(b'['), L(b'?'), N, L(b'J')]),
    seq(S::InsertLines, &[L(ESC), L(b'['), N, L(b'L')]),
    seq(S::DeleteLines, &[L(ESC), L(b'['), N, L(b'M')]),
    seq(S::DeleteChars, &[L(ESC), L(b'['), N, L(b'P')]),
    seq(S::ScrollUp, &[L(ESC), L(b'['), N, L(b'S')]),
    seq(S::ScrollDown, &[L(ESC), L(b'['), N, L(b'T')]),
    seq(S::EraseLine, &[L(ESC), L(b'['), N, L(b'K')]),
    seq(S::PrivateEraseLine, &[L(ESC), L(b'['), L(b'?'), N, L(b'K')]),
    seq(
        S::MouseTracking,
        &[
            L(ESC),
            L(b'['),
            N,
            L(b';'),
            N,
            L(b';'),
            N,
            L(b';'),
            N,
            L(b';'),
            N,
            L(b'T'),
        ],
    ),
    seq(S::EraseChars, &[L(ESC), L(b'['), N, L(b'X')]),
    seq(S::BackTab, &[L(ESC), L(b'['), N, L(b'Z')]),
    seq(S::ColumnAbsolute, &[L(ESC), L(b'['), N, L(b'`')]),
    seq(S::Repeat, &[L(ESC), L(b'['), N, L(b'b')]),
    seq(S::SelectGraphicRendition, &[L(ESC), L(b'['), Nl, L(b'm')]),
    seq(S::PrivateModeReset, &[L(ESC), L(b'['), L(b'?'), Nl, L(b'l')]),
    seq(S::PrivateModeSet, &[L(ESC), L(b'['), L(b'?'), Nl, L(b'h')]),
    seq(S::RestorePrivateModes, &[L(ESC), L(b'['), L(b'?'), Nl, L(b'r')]),
    seq(S::KeypadNumeric, &[L(ESC), L(b'>')]),
    seq(S::DesignateG0, &[L(ESC), L(b'('), C]),
    seq(S::RowAbsolute, &[L(ESC), L(b'['), N, L(b'd')]),
    seq(S::ScrollRegion, &[L(ESC), L(b'['), Nl, L(b'r')]),
    seq(
        S::OscStringTerminated,
        &[L(ESC), L(b']'), N, L(b';'), Str, L(ESC), L(b'\\')],
    ),
    seq(
        S::OscBellTerminated,
        &[L(ESC), L(b']'), N, L(b';'), Str, L(BEL)],
    ),
    seq(S::ReverseIndex, &[L(ESC), L(b'M')]),
    seq(S::SetMode, &[L(ESC), L(b'['), Nl, L(b'h')]),
    seq(S::ResetMode, &[L(ESC), L(b'['), Nl, L(b'l')]),
    seq(S::SaveCursor, &[L(ESC), L(b'7')]),
    seq(S::RestoreCursor, &[L(ESC), L(b'8')]),
    seq(S::SaveCursorAnsi, &[L(ESC), L(b'['), L(b's')]),
    seq(S::RestoreCursorAnsi, &[L(ESC), L(b'['), L(b'u')]),
    seq(S::HorizontalVerticalPosition, &[L(ESC), L(b'['), Nl, L(b'f')]),
    seq(S::DeviceAttributes, &[L(ESC), L(b'['), N, L(b'c')]),
    seq(S::DeviceAttributesEsc, &[L(ESC), L(b'c')]),
    seq(S::AlignmentTest, &[L(ESC), L(b'#'), L(b'8')]),
    seq(S::Index, &[L(ESC), L(b'D')]),
    seq(S::NextLine, &[L(ESC), L(b'E')]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_template_starts_with_escape() {
        for template in TEMPLATES {
            assert_eq!(
                template.tokens.first(),
                Some(&Token::Literal(ESC)),
                "{:?} does not start with ESC",
                template.id
            );
        }
    }

    #[test]
    fn test_every_template_ends_with_fixed_byte() {
        // A trailing placeholder would make completion ambiguous.
        for template in TEMPLATES {
            assert!(
                matches!(
                    template.tokens.last(),
                    Some(Token::Literal(_)) | Some(Token::Character)
                ),
                "{:?} ends with an open placeholder",
                template.id
            );
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<_> = TEMPLATES.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), TEMPLATES.len());
    }

    #[test]
    fn test_bare_home_precedes_parameterized_position() {
        let home = TEMPLATES
            .iter()
            .position(|t| t.id == SequenceId::CursorHome)
            .unwrap();
        let cup = TEMPLATES
            .iter()
            .position(|t| t.id == SequenceId::CursorPosition)
            .unwrap();
        assert!(home < cup);
    }
}
