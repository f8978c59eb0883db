//! # termrelay-session
//!
//! Per-client protocol state for the terminal relay.
//!
//! This crate provides:
//! - The Telnet session (negotiation, NAWS, queued output)
//! - The outbound packet queue with cancellation
//! - The relay client that keeps each viewer's screen in step with the slot
//! - Slots: the shared screen source (PTY program or fixed screen)
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on termrelay-core
//! and termrelay-emulator. Everything here is synchronous; the server crate
//! decides which task owns what.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod packet;
pub mod slot;
pub mod telnet;
pub mod transport;

// Re-export commonly used types
pub use client::{RelayClient, TickOutcome};
pub use packet::{Packet, PacketId, PacketQueue};
pub use slot::{PtySlot, Slot, StaticSlot};
pub use telnet::{SessionState, TelnetSession, HANDSHAKE};
pub use transport::{MemoryTransport, Transport};
