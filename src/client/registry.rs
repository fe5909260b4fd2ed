//! Client registry
//!
//! Tracks active connections and enforces the client limit.

use std::collections::HashSet;
use std::net::SocketAddr;

/// Registry for tracking active clients
#[derive(Debug)]
pub struct ClientRegistry {
    clients: HashSet<SocketAddr>,
    max_clients: usize,
}

impl ClientRegistry {
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashSet::new(),
            max_clients,
        }
    }

    /// Registers `addr` unless the registry is full.
    pub fn try_register(&mut self, addr: SocketAddr) -> bool {
        if self.clients.len() >= self.max_clients {
            return false;
        }
        self.clients.insert(addr);
        true
    }

    pub fn remove(&mut self, addr: &SocketAddr) -> bool {
        self.clients.remove(addr)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn max_clients(&self) -> usize {
        self.max_clients
    }
}
