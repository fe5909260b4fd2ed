//! Command parsing
//!
//! Turns one control line into a [`Command`].

/// A command received on the control connection
#[derive(Debug, PartialEq)]
pub enum Command {
    /// `STOR <size> <name>`: upload exactly `size` bytes under `name`
    Stor { size: u64, name: String },
    /// `RETR <name>`: download a stored file
    Retr(String),
    /// `SIZE <name>`: size of a stored file
    Size(String),
    Noop,
    Quit,
    /// A known command with missing or unparsable arguments
    Malformed(String),
    Unknown(String),
}

/// Parse a raw command line into the `Command` enum
///
/// File names run to the end of the line and may contain spaces.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_uppercase();
    let arg = parts.next().unwrap_or("").trim();

    match cmd.as_str() {
        "STOR" => parse_stor(arg).unwrap_or_else(|| Command::Malformed(trimmed.to_string())),
        "RETR" if !arg.is_empty() => Command::Retr(arg.to_string()),
        "SIZE" if !arg.is_empty() => Command::Size(arg.to_string()),
        "RETR" | "SIZE" => Command::Malformed(trimmed.to_string()),
        "NOOP" => Command::Noop,
        "QUIT" | "Q" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

fn parse_stor(arg: &str) -> Option<Command> {
    let mut parts = arg.splitn(2, char::is_whitespace);
    let size = parts.next()?.parse::<u64>().ok()?;
    let name = parts.next()?.trim();
    if name.is_empty() {
        return None;
    }

    Some(Command::Stor {
        size,
        name: name.to_string(),
    })
}
