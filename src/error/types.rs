//! Error types
//!
//! Domain-specific error types for the storage core and the server around it.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Storage module errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The upload directory could not be resolved or created. Fatal at startup.
    #[error("Could not create the upload directory {path}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cleaned name is not a plain file name inside the storage root.
    #[error("Filename contains invalid path sequence: {0}")]
    InvalidName(String),

    #[error("Could not store file {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Missing, malformed and out-of-root names all surface here.
    #[error("File not found: {0}")]
    NotFound(String),
}

impl StorageError {
    pub(crate) fn write(name: &str, source: io::Error) -> Self {
        StorageError::Write {
            name: name.to_string(),
            source,
        }
    }
}

/// Server-level error that encompasses everything the binary can fail with
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
