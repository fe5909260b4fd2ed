use std::net::SocketAddr;

use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use file_drop_server::{Server, ServerConfig, StorageError, StorageService};

// Helper to start a server on an ephemeral port
async fn start_test_server(config: ServerConfig) -> SocketAddr {
    let server = Server::new(config).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(async move { server.start().await });
    addr
}

fn test_config(temp: &TempDir) -> ServerConfig {
    ServerConfig {
        port: 0,
        upload_dir: temp.path().join("uploads").to_string_lossy().to_string(),
        ..ServerConfig::default()
    }
}

struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer,
        }
    }

    async fn read_reply(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        line.trim_end().to_string()
    }

    // Helper to send command and read response
    async fn send_command(&mut self, command: &str) -> String {
        self.writer
            .write_all(format!("{command}\r\n").as_bytes())
            .await
            .unwrap();
        self.read_reply().await
    }

    async fn upload(&mut self, name: &str, content: &[u8]) -> String {
        let reply = self
            .send_command(&format!("STOR {} {}", content.len(), name))
            .await;
        if !reply.starts_with("150") {
            return reply;
        }
        self.writer.write_all(content).await.unwrap();
        self.read_reply().await
    }

    async fn download(&mut self, name: &str) -> Result<Vec<u8>, String> {
        let reply = self.send_command(&format!("RETR {name}")).await;
        if !reply.starts_with("150") {
            return Err(reply);
        }
        let size: usize = reply.split_whitespace().nth(1).unwrap().parse().unwrap();
        let mut content = vec![0; size];
        self.reader.read_exact(&mut content).await.unwrap();
        assert_eq!(self.read_reply().await, "226 Transfer complete");
        Ok(content)
    }
}

#[tokio::test]
async fn test_initial_connection() {
    let temp = TempDir::new().unwrap();
    let addr = start_test_server(test_config(&temp)).await;

    let mut client = TestClient::connect(addr).await;

    assert_eq!(client.read_reply().await, "220 File drop server ready");
    assert!(temp.path().join("uploads").is_dir());
}

#[tokio::test]
async fn test_upload_then_download() {
    let temp = TempDir::new().unwrap();
    let addr = start_test_server(test_config(&temp)).await;
    let mut client = TestClient::connect(addr).await;
    client.read_reply().await;

    assert_eq!(client.upload("report.txt", b"hello").await, "226 Stored report.txt");
    assert_eq!(client.download("report.txt").await.unwrap(), b"hello");
    assert_eq!(client.send_command("SIZE report.txt").await, "213 5");
}

#[tokio::test]
async fn test_overwrite_keeps_latest_content() {
    let temp = TempDir::new().unwrap();
    let addr = start_test_server(test_config(&temp)).await;
    let mut client = TestClient::connect(addr).await;
    client.read_reply().await;

    client.upload("notes.txt", b"first version").await;
    client.upload("./notes.txt", b"second").await;

    assert_eq!(client.download("notes.txt").await.unwrap(), b"second");
}

#[tokio::test]
async fn test_upload_with_traversal_is_rejected() {
    let temp = TempDir::new().unwrap();
    let addr = start_test_server(test_config(&temp)).await;
    let mut client = TestClient::connect(addr).await;
    client.read_reply().await;

    let reply = client.upload("a/../b.txt", b"payload").await;

    assert!(reply.starts_with("553"), "unexpected reply: {reply}");
    assert!(!temp.path().join("uploads").join("b.txt").exists());
    // The session survives a rejected upload
    assert_eq!(client.send_command("NOOP").await, "200 OK");
}

#[tokio::test]
async fn test_download_missing_file() {
    let temp = TempDir::new().unwrap();
    let addr = start_test_server(test_config(&temp)).await;
    let mut client = TestClient::connect(addr).await;
    client.read_reply().await;

    let reply = client.download("missing.txt").await.unwrap_err();

    assert_eq!(reply, "550 File not found: missing.txt");
}

#[tokio::test]
async fn test_too_many_clients() {
    let temp = TempDir::new().unwrap();
    let config = ServerConfig {
        max_clients: 1,
        ..test_config(&temp)
    };
    let addr = start_test_server(config).await;

    let mut first = TestClient::connect(addr).await;
    assert!(first.read_reply().await.starts_with("220"));

    let mut second = TestClient::connect(addr).await;
    assert!(second.read_reply().await.starts_with("421"));
}

#[tokio::test]
async fn test_quit_command() {
    let temp = TempDir::new().unwrap();
    let addr = start_test_server(test_config(&temp)).await;
    let mut client = TestClient::connect(addr).await;
    client.read_reply().await;

    assert_eq!(client.send_command("QUIT").await, "221 Goodbye");

    let mut rest = String::new();
    client.reader.read_to_string(&mut rest).await.unwrap();
    assert!(rest.is_empty());
}

#[tokio::test]
async fn test_startup_fails_when_upload_dir_cannot_be_created() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, b"file").unwrap();
    let config = ServerConfig {
        port: 0,
        upload_dir: blocker.join("uploads").to_string_lossy().to_string(),
        ..ServerConfig::default()
    };

    let result = Server::new(config).await;

    assert!(matches!(
        result,
        Err(file_drop_server::ServerError::Storage(StorageError::Init { .. }))
    ));
}

#[test]
fn test_store_and_load_through_library() {
    let temp = TempDir::new().unwrap();
    let storage = StorageService::new(temp.path().join("uploads")).unwrap();

    let stored = storage.store("report.txt", "hello".as_bytes()).unwrap();
    let mut content = String::new();
    std::io::Read::read_to_string(&mut storage.load(&stored).unwrap(), &mut content).unwrap();

    assert_eq!(stored, "report.txt");
    assert_eq!(content, "hello");
    assert!(matches!(
        storage.load("missing.txt"),
        Err(StorageError::NotFound(_))
    ));
}
