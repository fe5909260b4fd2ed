//! Reply codes
//!
//! FTP-style three digit codes and line formatting.

pub const OPENING_TRANSFER: u16 = 150;
pub const OK: u16 = 200;
pub const FILE_STATUS: u16 = 213;
pub const READY: u16 = 220;
pub const GOODBYE: u16 = 221;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const SERVICE_UNAVAILABLE: u16 = 421;
pub const ACTION_ABORTED: u16 = 451;
pub const COMMAND_TOO_LONG: u16 = 500;
pub const SYNTAX_ERROR: u16 = 501;
pub const NOT_IMPLEMENTED: u16 = 502;
pub const FILE_NOT_FOUND: u16 = 550;
pub const EXCEEDED_STORAGE: u16 = 552;
pub const FILE_NAME_NOT_ALLOWED: u16 = 553;

/// Format a reply line
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_response() {
        assert_eq!(format_response(OK, "OK"), "200 OK\r\n");
        assert_eq!(
            format_response(FILE_NOT_FOUND, "File not found: a.txt"),
            "550 File not found: a.txt\r\n"
        );
    }
}
