//! Module `client`
//!
//! Per-connection state: who is connected and what they have transferred.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Represents the state of a connected client.
#[derive(Debug)]
pub struct Client {
    addr: SocketAddr,
    connected_at: Instant,
    files_stored: usize,
    files_retrieved: usize,
    bytes_received: u64,
    bytes_sent: u64,
}

impl Client {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connected_at: Instant::now(),
            files_stored: 0,
            files_retrieved: 0,
            bytes_received: 0,
            bytes_sent: 0,
        }
    }

    pub fn record_upload(&mut self, bytes: u64) {
        self.files_stored += 1;
        self.bytes_received += bytes;
    }

    pub fn record_download(&mut self, bytes: u64) {
        self.files_retrieved += 1;
        self.bytes_sent += bytes;
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn files_stored(&self) -> usize {
        self.files_stored
    }

    pub fn files_retrieved(&self) -> usize {
        self.files_retrieved
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    /// Time since the connection was accepted
    pub fn session_duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
