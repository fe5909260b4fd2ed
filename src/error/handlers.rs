//! Error handlers
//!
//! Maps storage errors onto control-connection reply codes.

use log::{error, warn};

use crate::error::types::StorageError;
use crate::protocol::responses::{
    ACTION_ABORTED, FILE_NOT_FOUND, FILE_NAME_NOT_ALLOWED, SERVICE_UNAVAILABLE,
};

/// Log a storage error at the level its kind deserves
pub fn handle_error(err: &StorageError) {
    match err {
        StorageError::InvalidName(_) | StorageError::NotFound(_) => warn!("{}", err),
        StorageError::Write { .. } | StorageError::Init { .. } => error!("{}", err),
    }
}

/// Convert a storage error to its reply code
pub fn error_to_reply_code(err: &StorageError) -> u16 {
    match err {
        StorageError::InvalidName(_) => FILE_NAME_NOT_ALLOWED,
        StorageError::NotFound(_) => FILE_NOT_FOUND,
        StorageError::Write { .. } => ACTION_ABORTED,
        StorageError::Init { .. } => SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_to_reply_code() {
        assert_eq!(
            error_to_reply_code(&StorageError::InvalidName("../x".into())),
            553
        );
        assert_eq!(
            error_to_reply_code(&StorageError::NotFound("x".into())),
            550
        );
        assert_eq!(
            error_to_reply_code(&StorageError::write("x", io::Error::other("boom"))),
            451
        );
    }
}
