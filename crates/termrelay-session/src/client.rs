//! Per-connection relay state: what the client shows and what to send next.

use termrelay_core::{ClientId, Dimensions, RelayConfig};
use termrelay_emulator::{EncodeOptions, Encoder, Grid};
use tracing::{debug, info};

use crate::packet::PacketId;
use crate::telnet::TelnetSession;
use crate::transport::Transport;

const CLEAR_SCREEN: &[u8] = b"\x1b[2J";
const HIDE_CURSOR: &[u8] = b"\x1b[?25l";

/// Result of one [`RelayClient::tick`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Keystrokes received from the client, to forward to the slot
    pub input: Vec<u8>,
    /// New client view size, if the client resized during this tick
    pub resized: Option<Dimensions>,
    /// Bytes written to the transport during this tick
    pub bytes_sent: usize,
    /// The connection is gone; the client should be dropped
    pub closed: bool,
}

/// One connected viewer of the shared slot.
///
/// The client keeps a baseline grid mirroring what its terminal displays,
/// and sends only the difference between that baseline and the slot's
/// current screen. A delta that has not started leaving the queue when the
/// next tick arrives is withdrawn and replaced, so a slow connection skips
/// intermediate frames instead of falling further behind.
#[derive(Debug)]
pub struct RelayClient {
    id: ClientId,
    session: TelnetSession,
    encoder: Encoder,
    size: Dimensions,
    max_size: Dimensions,
    baseline: Grid,
    last_frame: Option<Grid>,
    pending: Option<PacketId>,
    full_redraw: bool,
}

impl RelayClient {
    /// Create a client and queue its opening handshake.
    pub fn new(id: ClientId, config: &RelayConfig) -> Self {
        let size = config.terminal.default_dimensions();
        let mut session = TelnetSession::new(&config.telnet);
        session.handshake();
        session.enqueue(HIDE_CURSOR);

        Self {
            id,
            session,
            encoder: Encoder::new(EncodeOptions {
                red_blue_swap: config.terminal.red_blue_swap,
            }),
            size,
            max_size: config.terminal.max_dimensions(),
            baseline: Grid::new(size),
            last_frame: None,
            pending: None,
            full_redraw: true,
        }
    }

    /// Client identifier.
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Size of the client's view.
    pub fn dimensions(&self) -> Dimensions {
        self.size
    }

    /// Underlying Telnet session.
    pub fn session(&self) -> &TelnetSession {
        &self.session
    }

    /// Grid the client is known to display.
    pub fn baseline(&self) -> &Grid {
        &self.baseline
    }

    /// True once the connection has closed.
    pub fn is_closed(&self) -> bool {
        !self.session.is_open()
    }

    /// Exchange bytes with the client and bring its view up to `source`.
    pub fn tick<T>(&mut self, transport: &mut T, source: &Grid) -> TickOutcome
    where
        T: Transport + ?Sized,
    {
        let mut reported = None;
        let mut bytes_sent = self.session.cycle(transport, |size| reported = Some(size));

        if self.is_closed() {
            return TickOutcome {
                input: self.session.take_input(),
                bytes_sent,
                closed: true,
                ..Default::default()
            };
        }

        let resized = reported.and_then(|size| self.apply_resize(size));

        let mut frame = Grid::new(self.size);
        frame.blit_from(source);

        if let Some(id) = self.pending.take() {
            if self.session.cancel(id) {
                debug!(client = %self.id, packet = %id, "stale delta withdrawn");
                self.last_frame = None;
            } else if let Some(sent) = self.last_frame.take() {
                self.baseline = sent;
            }
        }

        if self.full_redraw {
            let payload = self.encoder.update_cycle(&frame);
            self.session.enqueue(payload);
            self.baseline = frame;
            self.full_redraw = false;
        } else {
            let payload = self
                .encoder
                .restricted_update_cycle(&frame, &self.baseline, None);
            if let Some(id) = self.session.enqueue(payload) {
                self.pending = Some(id);
                self.last_frame = Some(frame);
            }
        }

        bytes_sent += self.session.flush_outgoing(transport);
        if bytes_sent > 0 {
            debug!(client = %self.id, bytes_sent, "tick flushed");
        }

        TickOutcome {
            input: self.session.take_input(),
            resized,
            bytes_sent,
            closed: self.is_closed(),
        }
    }

    /// Adopt a size reported by the client. Returns the new size if it changed.
    fn apply_resize(&mut self, reported: Dimensions) -> Option<Dimensions> {
        if reported.rows == 0 || reported.cols == 0 {
            debug!(client = %self.id, %reported, "ignoring empty window size");
            return None;
        }
        let size = reported.limited_to(self.max_size);
        if size == self.size {
            return None;
        }

        info!(client = %self.id, from = %self.size, to = %size, "client resized");
        self.size = size;

        // Whatever delta is in flight was computed for the old size.
        if let Some(id) = self.pending.take() {
            self.session.cancel(id);
        }
        self.last_frame = None;

        self.baseline.resize(size);
        self.baseline.feed(CLEAR_SCREEN);
        self.session.enqueue(CLEAR_SCREEN);
        self.full_redraw = true;
        Some(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telnet::{HANDSHAKE, IAC, OPT_NAWS, SB, SE};
    use crate::transport::MemoryTransport;
    use termrelay_emulator::RESET_PROLOGUE;

    fn config() -> RelayConfig {
        RelayConfig::default()
    }

    fn source(text: &[u8]) -> Grid {
        let mut grid = Grid::new(Dimensions::new(24, 80));
        grid.feed(b"\x1b[?25l");
        grid.feed(text);
        grid
    }

    fn naws(cols: u16, rows: u16) -> Vec<u8> {
        let mut bytes = vec![IAC, SB, OPT_NAWS];
        bytes.extend_from_slice(&cols.to_be_bytes());
        bytes.extend_from_slice(&rows.to_be_bytes());
        bytes.extend_from_slice(&[IAC, SE]);
        bytes
    }

    /// Replay everything after the handshake on a fresh terminal.
    fn replay(output: &[u8], dims: Dimensions) -> Grid {
        assert!(output.starts_with(HANDSHAKE));
        let mut mirror = Grid::new(dims);
        mirror.feed(&output[HANDSHAKE.len()..]);
        mirror
    }

    #[test]
    fn test_first_tick_sends_handshake_and_full_redraw() {
        let mut client = RelayClient::new(ClientId::new(), &config());
        let mut transport = MemoryTransport::new();

        let outcome = client.tick(&mut transport, &source(b"Hello"));

        let out = transport.outgoing();
        assert!(out.starts_with(HANDSHAKE));
        let rest = &out[HANDSHAKE.len()..];
        assert!(rest.starts_with(HIDE_CURSOR));
        assert!(rest[HIDE_CURSOR.len()..].starts_with(RESET_PROLOGUE));
        assert_eq!(outcome.bytes_sent, out.len());
        assert!(!outcome.closed);

        let mirror = replay(out, client.dimensions());
        assert_eq!(mirror.line(0).unwrap().trim_end(), "Hello");
    }

    #[test]
    fn test_unchanged_source_sends_nothing() {
        let mut client = RelayClient::new(ClientId::new(), &config());
        let mut transport = MemoryTransport::new();
        let screen = source(b"still");

        client.tick(&mut transport, &screen);
        transport.take_outgoing();
        let outcome = client.tick(&mut transport, &screen);

        assert_eq!(outcome.bytes_sent, 0);
        assert!(transport.outgoing().is_empty());
    }

    #[test]
    fn test_delta_brings_client_up_to_date() {
        let mut client = RelayClient::new(ClientId::new(), &config());
        let mut transport = MemoryTransport::new();

        client.tick(&mut transport, &source(b"one"));
        let later = source(b"one\r\ntwo");
        client.tick(&mut transport, &later);
        // The delta was fully written, so the next tick commits it.
        client.tick(&mut transport, &later);

        let mirror = replay(transport.outgoing(), client.dimensions());
        assert_eq!(mirror.cells(), later.cells());
        assert_eq!(client.baseline().cells(), later.cells());
    }

    #[test]
    fn test_stale_delta_is_replaced() {
        let mut client = RelayClient::new(ClientId::new(), &config());
        let mut transport = MemoryTransport::new();
        client.tick(&mut transport, &source(b""));

        transport.set_write_budget(Some(0));
        client.tick(&mut transport, &source(b"A"));
        assert_eq!(client.session().queue().len(), 1);

        let newest = source(b"AB");
        client.tick(&mut transport, &newest);
        // The first delta never left, so only its replacement is queued.
        assert_eq!(client.session().queue().len(), 1);

        transport.set_write_budget(None);
        client.tick(&mut transport, &newest);
        let mirror = replay(transport.outgoing(), client.dimensions());
        assert_eq!(mirror.cells(), newest.cells());
    }

    #[test]
    fn test_partially_sent_delta_is_committed() {
        let mut client = RelayClient::new(ClientId::new(), &config());
        let mut transport = MemoryTransport::new();
        client.tick(&mut transport, &source(b""));

        transport.set_write_budget(Some(4));
        client.tick(&mut transport, &source(b"first"));

        transport.set_write_budget(None);
        let newest = source(b"first\r\nsecond");
        client.tick(&mut transport, &newest);
        client.tick(&mut transport, &newest);

        let mirror = replay(transport.outgoing(), client.dimensions());
        assert_eq!(mirror.cells(), newest.cells());
    }

    #[test]
    fn test_resize_clears_and_redraws() {
        let mut client = RelayClient::new(ClientId::new(), &config());
        let mut transport = MemoryTransport::new();
        let screen = source(b"resize me");
        client.tick(&mut transport, &screen);
        transport.take_outgoing();

        transport.push_incoming(&naws(40, 10));
        let outcome = client.tick(&mut transport, &screen);

        assert_eq!(outcome.resized, Some(Dimensions::new(10, 40)));
        assert_eq!(client.dimensions(), Dimensions::new(10, 40));
        let out = transport.outgoing();
        assert!(out.starts_with(CLEAR_SCREEN));
        assert!(out[CLEAR_SCREEN.len()..].starts_with(RESET_PROLOGUE));

        let mut mirror = Grid::new(Dimensions::new(10, 40));
        mirror.feed(out);
        assert_eq!(mirror.line(0).unwrap().trim_end(), "resize me");
    }

    #[test]
    fn test_resize_is_clamped_and_zero_ignored() {
        let mut cfg = config();
        cfg.terminal.max_rows = 50;
        cfg.terminal.max_cols = 100;
        let mut client = RelayClient::new(ClientId::new(), &cfg);
        let mut transport = MemoryTransport::new();

        transport.push_incoming(&naws(500, 0));
        let outcome = client.tick(&mut transport, &source(b""));
        assert_eq!(outcome.resized, None);
        assert_eq!(client.dimensions(), Dimensions::new(24, 80));

        transport.push_incoming(&naws(500, 400));
        let outcome = client.tick(&mut transport, &source(b""));
        assert_eq!(outcome.resized, Some(Dimensions::new(50, 100)));
    }

    #[test]
    fn test_input_is_forwarded() {
        let mut client = RelayClient::new(ClientId::new(), &config());
        let mut transport = MemoryTransport::new();
        transport.push_incoming(b"ls\r");

        let outcome = client.tick(&mut transport, &source(b""));
        assert_eq!(outcome.input, b"ls\r".to_vec());
    }

    #[test]
    fn test_disconnect_closes_client() {
        let mut client = RelayClient::new(ClientId::new(), &config());
        let mut transport = MemoryTransport::new();
        transport.push_incoming(b"q");
        transport.disconnect();

        let outcome = client.tick(&mut transport, &source(b""));
        assert!(outcome.closed);
        assert_eq!(outcome.input, b"q".to_vec());
        assert!(client.is_closed());
    }
}
