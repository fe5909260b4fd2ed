use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::client::{Client, ClientRegistry, handle_client};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::protocol::format_response;
use crate::protocol::responses::{READY, SERVICE_UNAVAILABLE};
use crate::storage::{JsonMessageInspector, StorageService};

pub struct Server {
    registry: Arc<Mutex<ClientRegistry>>,
    storage: Arc<StorageService>,
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Creates the upload directory and binds the control listener.
    ///
    /// Fails if the directory cannot be created or the socket cannot be bound.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let mut storage = StorageService::new(config.upload_dir_path())?;
        if config.inspect_json {
            storage = storage.with_inspector(JsonMessageInspector::new());
        }

        Self::with_storage(config, storage).await
    }

    /// Binds the control listener around an already initialized storage service.
    pub async fn with_storage(
        config: ServerConfig,
        storage: StorageService,
    ) -> Result<Self, ServerError> {
        let socket = config.control_socket();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e.into());
            }
        };
        info!("Server bound to {}", listener.local_addr()?);

        Ok(Self {
            registry: Arc::new(Mutex::new(ClientRegistry::new(config.max_clients))),
            storage: Arc::new(storage),
            listener,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn start(&self) {
        info!(
            "Starting file drop server on {} (max {} clients, uploads in {})",
            self.config.control_socket(),
            self.config.max_clients,
            self.storage.root().display()
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let registry = Arc::clone(&self.registry);
                    let storage = Arc::clone(&self.storage);
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_new_client(stream, addr, registry, storage, config).await
                        {
                            warn!("Failed to handle client {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Registers a new client, greets it and hands off to the session handler.
async fn handle_new_client(
    mut stream: TcpStream,
    client_addr: SocketAddr,
    registry: Arc<Mutex<ClientRegistry>>,
    storage: Arc<StorageService>,
    config: Arc<ServerConfig>,
) -> Result<(), std::io::Error> {
    {
        let mut clients = registry.lock().await;
        if !clients.try_register(client_addr) {
            let reply = format_response(SERVICE_UNAVAILABLE, "Too many connections. Try again later.");
            stream.write_all(reply.as_bytes()).await?;
            info!("Refused {}: {} clients connected", client_addr, clients.len());
            return Ok(());
        }

        info!(
            "Accepted client: {} ({}/{} clients)",
            client_addr,
            clients.len(),
            clients.max_clients()
        );
    }

    let greeting = format_response(READY, "File drop server ready");
    if let Err(e) = stream.write_all(greeting.as_bytes()).await {
        registry.lock().await.remove(&client_addr);
        return Err(e);
    }

    handle_client(stream, Client::new(client_addr), registry, storage, config).await;
    Ok(())
}
