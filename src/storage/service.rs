//! Storage service
//!
//! Owns the upload directory and implements the store/load contract on top
//! of blocking filesystem calls. Callers in async code go through
//! `spawn_blocking`.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::error::StorageError;
use crate::storage::inspect::PayloadInspector;
use crate::storage::resource::StoredResource;
use crate::storage::validation::{
    TEMP_PREFIX, TEMP_SUFFIX, clean_name, is_temp_name, is_within_root, normalize_path,
    validate_name,
};

/// Stores uploaded files under a single root directory.
///
/// The root is resolved and created once in [`StorageService::new`] and never
/// changes afterwards. Every stored file is a direct child of it.
pub struct StorageService {
    root: PathBuf,
    inspector: Option<Box<dyn PayloadInspector>>,
}

impl StorageService {
    /// Resolves `upload_dir` to an absolute path and creates it if missing.
    ///
    /// Relative paths are taken against the current working directory.
    pub fn new(upload_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let configured = upload_dir.as_ref();
        let init_error = |source| StorageError::Init {
            path: configured.to_path_buf(),
            source,
        };

        let absolute = normalize_path(&std::path::absolute(configured).map_err(init_error)?);
        fs::create_dir_all(&absolute).map_err(init_error)?;
        let root = absolute.canonicalize().map_err(init_error)?;

        info!("Upload directory: {}", root.display());

        Ok(Self {
            root,
            inspector: None,
        })
    }

    /// Installs a diagnostic hook that runs after every successful store.
    pub fn with_inspector(mut self, inspector: impl PayloadInspector + 'static) -> Self {
        self.inspector = Some(Box::new(inspector));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persists `content` under the cleaned form of `name`, replacing any
    /// existing file, and returns the cleaned name.
    ///
    /// Nothing is written when the name is rejected. The content stream is
    /// consumed once and dropped before returning on every path.
    pub fn store<R: Read>(&self, name: &str, mut content: R) -> Result<String, StorageError> {
        let cleaned = clean_name(name);
        if let Err(e) = validate_name(&cleaned) {
            warn!("Rejected upload name {:?}", name);
            return Err(e);
        }

        let target = self.root.join(&cleaned);
        if !is_within_root(&self.root, &target) {
            warn!("Upload name {:?} resolves outside {}", name, self.root.display());
            return Err(StorageError::InvalidName(cleaned));
        }

        let written = match persist(&mut content, &self.root, &target) {
            Ok(written) => written,
            Err(e) => {
                error!("Failed to store {} at {}: {}", cleaned, target.display(), e);
                return Err(StorageError::write(&cleaned, e));
            }
        };

        info!("Stored {} ({} bytes)", cleaned, written);

        if let Some(inspector) = &self.inspector {
            inspector.inspect(&cleaned, &target);
        }

        Ok(cleaned)
    }

    /// Opens the stored file called `name`.
    ///
    /// Any name that does not resolve to a regular file inside the root,
    /// whether missing, malformed or escaping, is reported as `NotFound`.
    pub fn load(&self, name: &str) -> Result<StoredResource, StorageError> {
        let not_found = || StorageError::NotFound(name.to_string());

        let resolved = normalize_path(&self.root.join(name));
        if !is_within_root(&self.root, &resolved) {
            warn!("Requested name {:?} resolves outside {}", name, self.root.display());
            return Err(not_found());
        }

        // Uploads still being written are never served.
        let in_flight = resolved
            .file_name()
            .and_then(|file_name| file_name.to_str())
            .is_some_and(is_temp_name);
        if in_flight {
            return Err(not_found());
        }

        // Symlinks may still point elsewhere.
        let canonical = resolved.canonicalize().map_err(|_| not_found())?;
        if !is_within_root(&self.root, &canonical) {
            warn!("Requested name {:?} links outside {}", name, self.root.display());
            return Err(not_found());
        }

        let resource = StoredResource::open(name, canonical).map_err(|_| not_found())?;
        info!(
            "Loaded {} from {} ({} bytes)",
            name,
            resource.path().display(),
            resource.size()
        );
        Ok(resource)
    }

}

/// Copies `content` into a fresh temporary file in `root` and renames it over
/// `target`. The temporary file is removed on every failure path.
fn persist<R: Read>(content: &mut R, root: &Path, target: &Path) -> io::Result<u64> {
    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(root)?;
    let written = io::copy(content, temp.as_file_mut())?;
    temp.as_file().sync_all()?;

    temp.persist(target).map_err(|e| e.error)?;
    Ok(written)
}
