//! Byte transport abstraction used by the Telnet session.

use std::collections::VecDeque;

/// Non-blocking, byte-oriented duplex transport.
///
/// Both calls return immediately. A return of zero means nothing could be
/// transferred right now; a failed transport additionally reports
/// `is_alive() == false` afterwards.
pub trait Transport {
    /// Read available bytes into `buf`, returning how many were read.
    fn try_read(&mut self, buf: &mut [u8]) -> usize;

    /// Write as much of `data` as possible, returning how many bytes were taken.
    fn try_write(&mut self, data: &[u8]) -> usize;

    /// Whether the remote end is still connected.
    fn is_alive(&self) -> bool;
}

/// In-memory transport for tests and local loopback.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    incoming: VecDeque<u8>,
    outgoing: Vec<u8>,
    write_budget: Option<usize>,
    alive: bool,
}

impl MemoryTransport {
    /// Create a connected transport with no data.
    pub fn new() -> Self {
        Self {
            alive: true,
            ..Default::default()
        }
    }

    /// Queue bytes as if the remote end had sent them.
    pub fn push_incoming(&mut self, bytes: &[u8]) {
        self.incoming.extend(bytes);
    }

    /// Everything written so far.
    pub fn outgoing(&self) -> &[u8] {
        &self.outgoing
    }

    /// Drain everything written so far.
    pub fn take_outgoing(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outgoing)
    }

    /// Accept only `budget` more bytes in total, then stall. `None` lifts the cap.
    pub fn set_write_budget(&mut self, budget: Option<usize>) {
        self.write_budget = budget;
    }

    /// Simulate the remote end hanging up.
    pub fn disconnect(&mut self) {
        self.alive = false;
    }
}

impl Transport for MemoryTransport {
    fn try_read(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.incoming.len());
        for (slot, byte) in buf.iter_mut().zip(self.incoming.drain(..n)) {
            *slot = byte;
        }
        n
    }

    fn try_write(&mut self, data: &[u8]) -> usize {
        if !self.alive {
            return 0;
        }
        let n = self.write_budget.map_or(data.len(), |budget| budget.min(data.len()));
        if let Some(budget) = self.write_budget.as_mut() {
            *budget -= n;
        }
        self.outgoing.extend_from_slice(&data[..n]);
        n
    }

    fn is_alive(&self) -> bool {
        self.alive
    }
}
