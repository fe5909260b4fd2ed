//! Stored resources
//!
//! The handle `load` returns: an open file plus what a caller needs to serve it.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A stored file opened for reading
#[derive(Debug)]
pub struct StoredResource {
    name: String,
    path: PathBuf,
    size: u64,
    content_type: &'static str,
    file: File,
}

impl StoredResource {
    /// Opens `path` and fails unless it is a regular file.
    pub(crate) fn open(name: &str, path: PathBuf) -> io::Result<Self> {
        let file = File::open(&path)?;
        let metadata = file.metadata()?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            content_type: detect_content_type(&path),
            size: metadata.len(),
            path,
            file,
        })
    }

    /// Name the resource was requested under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path of the stored file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn uri(&self) -> String {
        format!("file://{}", self.path.display())
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Best-effort media type, `application/octet-stream` when unknown
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Gives up the handle and returns the underlying open file
    pub fn into_file(self) -> File {
        self.file
    }
}

impl Read for StoredResource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

/// Sniffs magic bytes first, then falls back to the extension for text formats.
fn detect_content_type(path: &Path) -> &'static str {
    if let Ok(Some(kind)) = infer::get_from_path(path) {
        return kind.mime_type();
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("txt") | Some("log") => "text/plain",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("html") | Some("htm") => "text/html",
        Some("xml") => "application/xml",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
