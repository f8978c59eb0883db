//! termrelay server library
//!
//! Networking around the relay engine: the TCP transport, the client
//! registry, the server loop and command line handling. The binary in
//! main.rs wires them to a PTY slot.

pub mod cli;
pub mod registry;
pub mod server;
pub mod transport;

// Re-export commonly used types
pub use cli::{CliOptions, USAGE};
pub use registry::{ClientInfo, ClientRegistry};
pub use server::{RelayServer, REFUSAL_MESSAGE};
pub use transport::TcpTransport;
