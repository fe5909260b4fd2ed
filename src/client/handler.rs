use log::{error, info, warn};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::client::{Client, ClientRegistry};
use crate::config::ServerConfig;
use crate::protocol::responses::COMMAND_TOO_LONG;
use crate::protocol::{CommandStatus, format_response, handle_command, parse_command};
use crate::storage::StorageService;

/// Outcome of reading one command line
#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    Eof,
    Line(String),
    /// The line exceeded the limit and has been discarded up to its newline
    TooLong,
}

/// Handles one client session using Tokio async runtime.
///
/// - Uses BufReader to read command lines; upload payloads are read from the
///   same buffered reader so no bytes are lost between line and payload.
/// - Dispatches commands using `handle_command`.
/// - Removes the client from the registry when the session ends.
pub async fn handle_client(
    stream: TcpStream,
    mut client: Client,
    registry: Arc<Mutex<ClientRegistry>>,
    storage: Arc<StorageService>,
    config: Arc<ServerConfig>,
) {
    let client_addr = client.addr();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        match read_command_line(&mut reader, config.max_command_length).await {
            Ok(LineRead::Eof) => {
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(LineRead::TooLong) => {
                let reply = format_response(COMMAND_TOO_LONG, "Command too long");
                let _ = write_half.write_all(reply.as_bytes()).await;
            }
            Ok(LineRead::Line(line)) => {
                let command = parse_command(&line);
                info!("Received from {}: {:?}", client_addr, &command);

                match handle_command(
                    command,
                    &mut reader,
                    &mut write_half,
                    &mut client,
                    &storage,
                    &config,
                )
                .await
                {
                    Ok(CommandStatus::Continue) => {}
                    Ok(CommandStatus::CloseConnection) => {
                        info!("Client {} requested to quit", client_addr);
                        break;
                    }
                    Err(e) => {
                        warn!("Transfer with {} aborted: {}", client_addr, e);
                        break;
                    }
                }
            }
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        }
    }

    let mut clients = registry.lock().await;
    clients.remove(&client_addr);
    info!(
        "Client {} disconnected after {:?} ({} stored / {} bytes in, {} retrieved / {} bytes out)",
        client_addr,
        client.session_duration(),
        client.files_stored(),
        client.bytes_received(),
        client.files_retrieved(),
        client.bytes_sent()
    );
    if clients.is_empty() {
        info!("No clients connected");
    }
}

/// Reads one line, never buffering more than `max` bytes of it.
///
/// An over-long line is consumed through its newline so its tail is not
/// mistaken for the next command.
async fn read_command_line<R>(reader: &mut R, max: usize) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let limit = max as u64 + 1;
    let mut buf = Vec::new();

    if (&mut *reader).take(limit).read_until(b'\n', &mut buf).await? == 0 {
        return Ok(LineRead::Eof);
    }
    if buf.len() <= max {
        return Ok(LineRead::Line(String::from_utf8_lossy(&buf).into_owned()));
    }

    while !buf.ends_with(b"\n") {
        buf.clear();
        if (&mut *reader).take(limit).read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
    }
    Ok(LineRead::TooLong)
}
