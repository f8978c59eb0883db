//! Registry of connected clients.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use termrelay_core::{ClientId, Dimensions, Error, Result};

/// What the server knows about one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientInfo {
    /// Client identifier
    pub id: ClientId,
    /// Remote address
    pub peer: SocketAddr,
    /// When the connection was accepted
    pub connected_at: Instant,
    /// Current view size
    pub dimensions: Dimensions,
    /// Total bytes written to the client
    pub bytes_sent: u64,
}

impl ClientInfo {
    /// Time since the client connected.
    pub fn uptime(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

/// Bounded set of connected clients, shared between tasks.
#[derive(Debug, Clone)]
pub struct ClientRegistry {
    clients: Arc<RwLock<HashMap<ClientId, ClientInfo>>>,
    max_clients: usize,
}

impl ClientRegistry {
    /// Create an empty registry admitting at most `max_clients`.
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
            max_clients,
        }
    }

    /// Admit a new connection.
    pub fn register(&self, peer: SocketAddr, dimensions: Dimensions) -> Result<ClientId> {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        if clients.len() >= self.max_clients {
            return Err(Error::ClientLimitReached(self.max_clients));
        }

        let id = ClientId::new();
        clients.insert(
            id,
            ClientInfo {
                id,
                peer,
                connected_at: Instant::now(),
                dimensions,
                bytes_sent: 0,
            },
        );
        Ok(id)
    }

    /// Record a tick's effect on a client.
    pub fn record_tick(&self, id: ClientId, resized: Option<Dimensions>, bytes_sent: usize) {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(info) = clients.get_mut(&id) {
            if let Some(dims) = resized {
                info.dimensions = dims;
            }
            info.bytes_sent += bytes_sent as u64;
        }
    }

    /// Look up a client.
    pub fn get(&self, id: ClientId) -> Option<ClientInfo> {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        clients.get(&id).cloned()
    }

    /// Snapshot of all clients.
    pub fn list(&self) -> Vec<ClientInfo> {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        clients.values().cloned().collect()
    }

    /// Forget a client. Returns its last known state.
    pub fn remove(&self, id: ClientId) -> Option<ClientInfo> {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        clients.remove(&id)
    }

    /// Number of connected clients.
    pub fn count(&self) -> usize {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Admission limit.
    pub fn max_clients(&self) -> usize {
        self.max_clients
    }
}
