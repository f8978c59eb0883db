//! # termrelay-core
//!
//! Core types for the terminal relay.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other termrelay crates. It provides:
//!
//! - Geometry types (Position, Bounds, Dimensions)
//! - Cell and color types for the terminal grid
//! - Client identifiers
//! - Relay configuration
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other termrelay crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cell;
pub mod config;
pub mod error;
pub mod geometry;
pub mod id;

// Re-export commonly used types
pub use cell::{Cell, CellAttributes, Color};
pub use config::{ProgramSettings, RelayConfig, ServerSettings, TelnetSettings, TerminalSettings};
pub use error::{Error, Result};
pub use geometry::{Bounds, Dimensions, Position};
pub use id::ClientId;
