pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod storage;

pub use config::ServerConfig;
pub use error::{ServerError, StorageError};
pub use server::Server;
pub use storage::{StorageService, StoredResource};
