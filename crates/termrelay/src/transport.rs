//! TCP adapter for the session [`Transport`] trait.

use std::io::ErrorKind;
use std::net::SocketAddr;

use tokio::net::TcpStream;
use tracing::debug;

use termrelay_session::Transport;

/// Non-blocking view of a client socket.
///
/// End of stream or any error other than `WouldBlock` marks the transport
/// dead; the session closes on its next cycle.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
    alive: bool,
}

impl TcpTransport {
    /// Wrap an accepted stream.
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            stream,
            peer,
            alive: true,
        }
    }

    /// Remote address.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Wait until the socket has something to read (or has closed).
    pub async fn readable(&self) -> std::io::Result<()> {
        self.stream.readable().await
    }
}

impl Transport for TcpTransport {
    fn try_read(&mut self, buf: &mut [u8]) -> usize {
        if !self.alive {
            return 0;
        }
        match self.stream.try_read(buf) {
            Ok(0) => {
                debug!(peer = %self.peer, "end of stream");
                self.alive = false;
                0
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::WouldBlock => 0,
            Err(e) => {
                debug!(peer = %self.peer, error = %e, "read failed");
                self.alive = false;
                0
            }
        }
    }

    fn try_write(&mut self, data: &[u8]) -> usize {
        if !self.alive {
            return 0;
        }
        match self.stream.try_write(data) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::WouldBlock => 0,
            Err(e) => {
                debug!(peer = %self.peer, error = %e, "write failed");
                self.alive = false;
                0
            }
        }
    }

    fn is_alive(&self) -> bool {
        self.alive
    }
}
