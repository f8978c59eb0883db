//! Telnet session: option negotiation, NAWS decoding and queued output.

use termrelay_core::{Dimensions, TelnetSettings};
use tracing::{debug, trace, warn};

use crate::packet::{PacketId, PacketQueue};
use crate::transport::Transport;

/// Interpret As Command
pub const IAC: u8 = 255;
/// Subnegotiation begin
pub const SB: u8 = 250;
/// Subnegotiation end
pub const SE: u8 = 240;
/// Sender wants to enable an option
pub const WILL: u8 = 251;
/// Sender refuses an option
pub const WONT: u8 = 252;
/// Sender asks the peer to enable an option
pub const DO: u8 = 253;
/// Sender asks the peer to disable an option
pub const DONT: u8 = 254;
/// Echo option
pub const OPT_ECHO: u8 = 1;
/// Suppress-go-ahead option
pub const OPT_SGA: u8 = 3;
/// Negotiate-about-window-size option
pub const OPT_NAWS: u8 = 31;
/// Linemode option
pub const OPT_LINEMODE: u8 = 34;

/// Bytes sent to every new client: server echoes, character mode, request
/// window size reports, then clear the screen.
pub const HANDSHAKE: &[u8] = &[
    IAC, WILL, OPT_ECHO, IAC, WILL, OPT_SGA, IAC, WONT, OPT_LINEMODE, IAC, DO, OPT_NAWS, 0x1b,
    b'[', b'2', b'J',
];

/// Subnegotiation bodies longer than this are abandoned.
const MAX_SUBNEGOTIATION: usize = 512;

const READ_CHUNK: usize = 4096;

/// Lifecycle of a Telnet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Exchanging data.
    Open,
    /// The transport failed or the session was closed. Terminal.
    Closed,
}

enum Subnegotiation {
    Incomplete,
    Abandoned(usize),
    Complete { consumed: usize, naws: Option<Dimensions> },
}

/// Telnet protocol state for one client connection.
#[derive(Debug)]
pub struct TelnetSession {
    state: SessionState,
    queue: PacketQueue,
    pending: Vec<u8>,
    input: Vec<u8>,
    terminal_size: Option<Dimensions>,
    chunk_size: usize,
    handshake_sent: bool,
    /// Inside an abandoned subnegotiation; bytes are dropped until IAC SE.
    discarding: bool,
}

impl TelnetSession {
    /// Create an open session using the configured flush chunk size.
    pub fn new(settings: &TelnetSettings) -> Self {
        Self::with_chunk_size(settings.flush_chunk_size)
    }

    /// Create an open session writing at most `chunk_size` bytes per write.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            state: SessionState::Open,
            queue: PacketQueue::new(),
            pending: Vec::new(),
            input: Vec::new(),
            terminal_size: None,
            chunk_size: chunk_size.max(1),
            handshake_sent: false,
            discarding: false,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True until the session closes.
    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Last size reported by the client through NAWS.
    pub fn terminal_size(&self) -> Option<Dimensions> {
        self.terminal_size
    }

    /// Outbound packets not yet fully written.
    pub fn queue(&self) -> &PacketQueue {
        &self.queue
    }

    /// Run received bytes through the Telnet decoder.
    ///
    /// Data bytes accumulate for [`take_input`](Self::take_input); each
    /// window size report calls `on_resize`. An incomplete command at the
    /// end is kept until more bytes arrive.
    pub fn feed_incoming<F>(&mut self, bytes: &[u8], mut on_resize: F)
    where
        F: FnMut(Dimensions),
    {
        self.pending.extend_from_slice(bytes);
        let buf = std::mem::take(&mut self.pending);
        let mut i = 0;

        while i < buf.len() {
            if self.discarding {
                let (skipped, finished) = skip_subnegotiation(&buf[i..]);
                i += skipped;
                if !finished {
                    break;
                }
                self.discarding = false;
                continue;
            }
            if buf[i] != IAC {
                let run = buf[i..].iter().take_while(|&&b| b != IAC).count();
                self.input.extend_from_slice(&buf[i..i + run]);
                i += run;
                continue;
            }

            let Some(&command) = buf.get(i + 1) else {
                break;
            };
            match command {
                IAC => {
                    self.input.push(IAC);
                    i += 2;
                }
                WILL | WONT | DO | DONT => {
                    let Some(&option) = buf.get(i + 2) else {
                        break;
                    };
                    trace!(command, option, "telnet negotiation ignored");
                    i += 3;
                }
                SB => match parse_subnegotiation(&buf[i + 2..]) {
                    Subnegotiation::Incomplete => break,
                    Subnegotiation::Abandoned(skipped) => {
                        warn!(skipped, "oversized telnet subnegotiation dropped");
                        i += 2 + skipped;
                        self.discarding = true;
                    }
                    Subnegotiation::Complete { consumed, naws } => {
                        i += 2 + consumed;
                        if let Some(size) = naws {
                            debug!(%size, "client window size");
                            self.terminal_size = Some(size);
                            on_resize(size);
                        }
                    }
                },
                _ => i += 2,
            }
        }

        self.pending = buf[i..].to_vec();
    }

    /// Drain data bytes received so far.
    pub fn take_input(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.input)
    }

    /// Queue a payload for sending. Empty payloads are refused.
    pub fn enqueue(&mut self, payload: impl Into<Vec<u8>>) -> Option<PacketId> {
        if !self.is_open() {
            return None;
        }
        self.queue.enqueue(payload.into())
    }

    /// True if the packet is queued and untouched.
    pub fn is_cancellable(&self, id: PacketId) -> bool {
        self.queue.is_cancellable(id)
    }

    /// Withdraw an untouched packet.
    pub fn cancel(&mut self, id: PacketId) -> bool {
        self.queue.cancel(id)
    }

    /// Queue the option negotiation and screen clear. Only the first call
    /// has any effect.
    pub fn handshake(&mut self) {
        if self.handshake_sent {
            return;
        }
        self.handshake_sent = true;
        self.enqueue(HANDSHAKE);
    }

    /// Write queued bytes while the transport keeps accepting them.
    ///
    /// Returns the number of bytes written.
    pub fn flush_outgoing<T>(&mut self, transport: &mut T) -> usize
    where
        T: Transport + ?Sized,
    {
        if !self.is_open() {
            return 0;
        }
        let mut total = 0;
        loop {
            let chunk = self.queue.gather(self.chunk_size);
            if chunk.is_empty() {
                break;
            }
            let written = transport.try_write(&chunk);
            if !transport.is_alive() {
                warn!(queued = self.queue.pending_bytes(), "write failed, closing session");
                self.close();
                break;
            }
            if written == 0 {
                break;
            }
            self.queue.advance(written);
            total += written;
        }
        total
    }

    /// Read everything the transport has, decode it, then flush output.
    ///
    /// Returns the number of bytes written.
    pub fn cycle<T, F>(&mut self, transport: &mut T, mut on_resize: F) -> usize
    where
        T: Transport + ?Sized,
        F: FnMut(Dimensions),
    {
        if !self.is_open() {
            return 0;
        }
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let n = transport.try_read(&mut buf);
            if n == 0 {
                break;
            }
            self.feed_incoming(&buf[..n], &mut on_resize);
        }
        if !transport.is_alive() {
            debug!("transport gone, closing session");
            self.close();
            return 0;
        }
        self.flush_outgoing(transport)
    }

    /// Close the session and drop anything still queued.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
        self.queue.clear();
    }
}

/// Parse a subnegotiation body, starting just after `IAC SB`.
fn parse_subnegotiation(body: &[u8]) -> Subnegotiation {
    let mut data = Vec::new();
    let mut j = 0;
    loop {
        if j > MAX_SUBNEGOTIATION {
            return Subnegotiation::Abandoned(j);
        }
        let Some(&b) = body.get(j) else {
            return Subnegotiation::Incomplete;
        };
        if b != IAC {
            data.push(b);
            j += 1;
            continue;
        }
        match body.get(j + 1) {
            None => return Subnegotiation::Incomplete,
            Some(&IAC) => {
                data.push(IAC);
                j += 2;
            }
            Some(&SE) => {
                j += 2;
                break;
            }
            Some(_) => j += 2,
        }
    }

    let naws = match data.as_slice() {
        [OPT_NAWS, w1, w2, h1, h2] => Some(Dimensions::new(
            u16::from_be_bytes([*h1, *h2]),
            u16::from_be_bytes([*w1, *w2]),
        )),
        _ => None,
    };
    Subnegotiation::Complete { consumed: j, naws }
}

/// Scan an abandoned subnegotiation for its IAC SE.
///
/// Returns the bytes consumed and whether the terminator was found. A lone
/// trailing IAC is left unconsumed.
fn skip_subnegotiation(body: &[u8]) -> (usize, bool) {
    let mut j = 0;
    while j < body.len() {
        if body[j] != IAC {
            j += 1;
            continue;
        }
        match body.get(j + 1) {
            None => break,
            Some(&SE) => return (j + 2, true),
            Some(_) => j += 2,
        }
    }
    (j, false)
}
