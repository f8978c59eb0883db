//! TCP relay server: one task per client plus a slot ticker.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use termrelay_core::{ClientId, Error, RelayConfig, Result};
use termrelay_session::{RelayClient, Slot};

use crate::registry::ClientRegistry;
use crate::transport::TcpTransport;

/// Sent to connections beyond the client limit before hanging up.
pub const REFUSAL_MESSAGE: &[u8] = b"Too many viewers connected, try again later.\r\n";

/// Relays one shared slot to every connected Telnet client.
pub struct RelayServer {
    config: Arc<RelayConfig>,
    slot: Mutex<Box<dyn Slot>>,
    registry: ClientRegistry,
    shutdown: watch::Sender<bool>,
}

impl std::fmt::Debug for RelayServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayServer")
            .field("listen", &self.config.server.listen_address())
            .field("clients", &self.registry.count())
            .finish_non_exhaustive()
    }
}

impl RelayServer {
    /// Create a server relaying `slot`.
    pub fn new(config: RelayConfig, slot: impl Slot + 'static) -> Self {
        let registry = ClientRegistry::new(config.server.max_clients);
        let (shutdown, _) = watch::channel(false);
        Self {
            config: Arc::new(config),
            slot: Mutex::new(Box::new(slot)),
            registry,
            shutdown,
        }
    }

    /// Server configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Connected clients.
    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Run `f` with exclusive access to the slot.
    pub fn with_slot<R>(&self, f: impl FnOnce(&mut dyn Slot) -> R) -> R {
        let mut slot = self.lock_slot();
        f(&mut **slot)
    }

    /// Ask the accept loop and every client task to stop.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Bind the configured listen address.
    pub async fn bind(&self) -> Result<TcpListener> {
        let address = self.config.server.listen_address();
        TcpListener::bind(&address).await.map_err(|e| {
            error!("Failed to bind {}: {}", address, e);
            Error::Io(e)
        })
    }

    /// Accept clients until shutdown or until the slot exits.
    pub async fn run(self: Arc<Self>, listener: TcpListener) -> Result<()> {
        info!(address = ?listener.local_addr().ok(), "relay listening");

        let mut stop = self.shutdown.subscribe();
        let ticker = tokio::spawn(Arc::clone(&self).tick_slot());

        while !stopping(&mut stop) {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.admit(stream, peer).await,
                    Err(e) => warn!(error = %e, "accept failed"),
                },
                _ = stop.changed() => break,
            }
        }

        ticker.abort();
        info!("relay stopped");
        Ok(())
    }

    async fn admit(self: &Arc<Self>, mut stream: TcpStream, peer: SocketAddr) {
        let dimensions = self.config.terminal.default_dimensions();
        match self.registry.register(peer, dimensions) {
            Ok(id) => {
                info!(client = %id, %peer, "client connected");
                tokio::spawn(Arc::clone(self).serve_client(id, stream, peer));
            }
            Err(e) => {
                warn!(%peer, error = %e, "refusing client");
                if let Err(e) = stream.write_all(REFUSAL_MESSAGE).await {
                    debug!(%peer, error = %e, "refusal not delivered");
                }
                if let Err(e) = stream.shutdown().await {
                    debug!(%peer, error = %e, "refused connection not shut down cleanly");
                }
            }
        }
    }

    async fn tick_slot(self: Arc<Self>) {
        let mut ticks = interval(Duration::from_millis(self.config.server.tick_ms));
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;
            let alive = {
                let mut slot = self.lock_slot();
                if let Err(e) = slot.poll() {
                    warn!(error = %e, "slot read failed");
                }
                slot.is_alive()
            };
            if !alive {
                info!("slot exited, shutting down");
                self.shutdown();
                break;
            }
        }
    }

    async fn serve_client(self: Arc<Self>, id: ClientId, stream: TcpStream, peer: SocketAddr) {
        let mut transport = TcpTransport::new(stream, peer);
        let mut client = RelayClient::new(id, &self.config);
        let mut ticks = interval(Duration::from_millis(self.config.server.tick_ms));
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stop = self.shutdown.subscribe();

        while !stopping(&mut stop) {
            let outcome = {
                let mut slot = self.lock_slot();
                let outcome = client.tick(&mut transport, slot.grid());
                if !outcome.input.is_empty() {
                    if let Err(e) = slot.send_input(&outcome.input) {
                        warn!(client = %id, error = %e, "input not delivered to slot");
                    }
                }
                outcome
            };

            self.registry
                .record_tick(id, outcome.resized, outcome.bytes_sent);
            if outcome.closed {
                break;
            }

            tokio::select! {
                _ = ticks.tick() => {}
                readable = transport.readable() => {
                    if readable.is_err() {
                        break;
                    }
                }
                _ = stop.changed() => break,
            }
        }

        if let Some(info) = self.registry.remove(id) {
            info!(
                client = %id,
                %peer,
                bytes_sent = info.bytes_sent,
                uptime_secs = info.uptime().as_secs(),
                "client disconnected"
            );
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Box<dyn Slot>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn stopping(stop: &mut watch::Receiver<bool>) -> bool {
    *stop.borrow_and_update()
}
