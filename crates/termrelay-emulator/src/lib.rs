//! # termrelay-emulator
//!
//! Terminal emulation for the terminal relay.
//!
//! This crate provides:
//! - A table-driven escape sequence matcher
//! - Terminal grid state with a streaming byte interpreter ([`Grid::feed`])
//! - A differential update encoder that turns grids back into escape sequences
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on termrelay-core
//! and provides terminal emulation functionality.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoder;
pub mod grid;
pub mod matcher;
mod parser;
pub mod sequence;

// Re-export commonly used types
pub use encoder::{EncodeOptions, Encoder, RESET_PROLOGUE};
pub use grid::{Cursor, Grid};
pub use matcher::{match_sequence, MatchResult, SequenceMatch, MAX_PARAMS};
pub use sequence::{SequenceId, Template, Token, TEMPLATES};
