//! Payload inspection
//!
//! Optional diagnostic hooks run against a payload after it has been stored.
//! Nothing here can fail a store: every error is logged and dropped.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info, warn};
use serde_json::Value;
use thiserror::Error;

/// Side-effect-only hook invoked with the cleaned name and stored path
pub trait PayloadInspector: Send + Sync {
    fn inspect(&self, name: &str, path: &Path);
}

/// One entry of the `data` array of an uploaded JSON document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    pub name: String,
    pub surname: String,
    pub address: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`data` is not an array")]
    NotAnArray,

    #[error("entry {index} has no string field `{field}`")]
    MissingField { index: usize, field: &'static str },
}

/// Logs the sender and message of every entry in a top-level `data` array.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonMessageInspector;

impl JsonMessageInspector {
    pub fn new() -> Self {
        Self
    }

    /// Parses a document and yields its entries in order.
    ///
    /// A missing `data` field yields nothing. Iteration is expected to stop at
    /// the first `Err`.
    pub fn entries(
        reader: impl Read,
    ) -> Result<Vec<Result<MessageEntry, InspectError>>, InspectError> {
        let document: Value = serde_json::from_reader(reader)?;

        let data = match document.get("data") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(InspectError::NotAnArray),
        };

        Ok(data
            .iter()
            .enumerate()
            .map(|(index, item)| parse_entry(index, item))
            .collect())
    }
}

impl PayloadInspector for JsonMessageInspector {
    fn inspect(&self, name: &str, path: &Path) {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Could not reopen {} for inspection: {}", name, e);
                return;
            }
        };

        let entries = match Self::entries(BufReader::new(file)) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping inspection of {}: {}", name, e);
                return;
            }
        };

        for entry in entries {
            match entry {
                Ok(entry) => {
                    info!("name: {}", entry.name);
                    info!("surname: {}", entry.surname);
                    info!("address: {}", entry.address);
                    info!("message: {}", entry.message);
                }
                Err(e) => {
                    debug!("Stopping inspection of {}: {}", name, e);
                    break;
                }
            }
        }
    }
}

fn parse_entry(index: usize, item: &Value) -> Result<MessageEntry, InspectError> {
    let from = item.get("from");
    let sender_field = |field: &'static str| {
        from.and_then(|from| from.get(field))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let missing = |field| InspectError::MissingField { index, field };

    Ok(MessageEntry {
        name: sender_field("name").ok_or_else(|| missing("name"))?,
        surname: sender_field("surname").ok_or_else(|| missing("surname"))?,
        address: sender_field("address")
            .or_else(|| sender_field("adress"))
            .ok_or_else(|| missing("address"))?,
        message: item
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| missing("message"))?,
    })
}
