//! Client management
//!
//! Handles client connections, per-connection state and the registry of
//! active sessions.

pub mod handler;
pub mod registry;
pub mod state;

pub use handler::handle_client;
pub use registry::ClientRegistry;
pub use state::Client;
