//! Command handlers
//!
//! Executes one parsed command against the storage service. Payload bytes
//! travel inline on the control connection right after a `150` reply.

use std::io::{self, Cursor};
use std::sync::Arc;

use log::info;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::client::Client;
use crate::config::ServerConfig;
use crate::error::StorageError;
use crate::error::handlers::{error_to_reply_code, handle_error};
use crate::protocol::commands::Command;
use crate::protocol::responses::{
    EXCEEDED_STORAGE, FILE_STATUS, GOODBYE, NOT_IMPLEMENTED, OK, OPENING_TRANSFER, SYNTAX_ERROR,
    TRANSFER_COMPLETE, format_response,
};
use crate::storage::{StorageService, StoredResource};

/// What the session loop should do after a command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandStatus {
    Continue,
    CloseConnection,
}

/// Dispatches `command`, writing every reply to `writer`.
///
/// Storage failures become reply lines; only transport errors are returned.
pub async fn handle_command<R, W>(
    command: Command,
    reader: &mut R,
    writer: &mut W,
    client: &mut Client,
    storage: &Arc<StorageService>,
    config: &ServerConfig,
) -> io::Result<CommandStatus>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match command {
        Command::Stor { size, name } => {
            handle_stor(size, name, reader, writer, client, storage, config).await?;
        }
        Command::Retr(name) => handle_retr(name, writer, client, storage).await?,
        Command::Size(name) => match load(storage, name).await? {
            Ok(resource) => {
                send(writer, FILE_STATUS, &resource.size().to_string()).await?;
            }
            Err(e) => send_error(writer, &e).await?,
        },
        Command::Noop => send(writer, OK, "OK").await?,
        Command::Quit => {
            send(writer, GOODBYE, "Goodbye").await?;
            return Ok(CommandStatus::CloseConnection);
        }
        Command::Malformed(line) => {
            send(writer, SYNTAX_ERROR, &format!("Syntax error in arguments: {line}")).await?;
        }
        Command::Unknown(_) => send(writer, NOT_IMPLEMENTED, "Command not implemented").await?,
    }

    Ok(CommandStatus::Continue)
}

async fn handle_stor<R, W>(
    size: u64,
    name: String,
    reader: &mut R,
    writer: &mut W,
    client: &mut Client,
    storage: &Arc<StorageService>,
    config: &ServerConfig,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if size > config.max_file_size_bytes() {
        let msg = format!("File too large, max {} MB", config.max_file_size_mb);
        return send(writer, EXCEEDED_STORAGE, &msg).await;
    }

    send(writer, OPENING_TRANSFER, &format!("Ready for {size} bytes")).await?;

    let mut payload = Vec::new();
    (&mut *reader).take(size).read_to_end(&mut payload).await?;
    if payload.len() as u64 != size {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes for {}, got {}", size, name, payload.len()),
        ));
    }

    let storage = Arc::clone(storage);
    let stored = tokio::task::spawn_blocking(move || storage.store(&name, Cursor::new(payload)))
        .await
        .map_err(io::Error::other)?;

    match stored {
        Ok(stored) => {
            client.record_upload(size);
            send(writer, TRANSFER_COMPLETE, &format!("Stored {stored}")).await
        }
        Err(e) => send_error(writer, &e).await,
    }
}

async fn handle_retr<W>(
    name: String,
    writer: &mut W,
    client: &mut Client,
    storage: &Arc<StorageService>,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let resource = match load(storage, name).await? {
        Ok(resource) => resource,
        Err(e) => return send_error(writer, &e).await,
    };

    let header = format!(
        "{} {} {}",
        resource.size(),
        resource.content_type(),
        resource.uri()
    );
    send(writer, OPENING_TRANSFER, &header).await?;

    let name = resource.name().to_string();
    let mut file = tokio::fs::File::from_std(resource.into_file());
    let sent = tokio::io::copy(&mut file, writer).await?;

    client.record_download(sent);
    info!("Sent {} ({} bytes) to {}", name, sent, client.addr());
    send(writer, TRANSFER_COMPLETE, "Transfer complete").await
}

async fn load(
    storage: &Arc<StorageService>,
    name: String,
) -> io::Result<Result<StoredResource, StorageError>> {
    let storage = Arc::clone(storage);
    tokio::task::spawn_blocking(move || storage.load(&name))
        .await
        .map_err(io::Error::other)
}

async fn send<W: AsyncWrite + Unpin>(writer: &mut W, code: u16, message: &str) -> io::Result<()> {
    writer
        .write_all(format_response(code, message).as_bytes())
        .await?;
    writer.flush().await
}

async fn send_error<W: AsyncWrite + Unpin>(writer: &mut W, err: &StorageError) -> io::Result<()> {
    handle_error(err);
    send(writer, error_to_reply_code(err), &err.to_string()).await
}
