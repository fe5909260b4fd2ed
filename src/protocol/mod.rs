//! Control connection protocol
//!
//! Handles command parsing, dispatch onto the storage service, and reply
//! formatting.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{Command, parse_command};
pub use handlers::{CommandStatus, handle_command};
pub use responses::format_response;
