//! File storage
//!
//! Persists uploaded payloads under a single upload directory and resolves
//! stored names back into readable resources.

pub mod inspect;
pub mod resource;
pub mod service;
pub mod validation;

pub use inspect::{JsonMessageInspector, MessageEntry, PayloadInspector};
pub use resource::StoredResource;
pub use service::StorageService;
