//! Server core functionality
//!
//! Accept loop and startup wiring for the control listener.

pub mod core;

pub use self::core::Server;
