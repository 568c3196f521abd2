use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Readable handle on a staged file
pub type ByteReader = Pin<Box<dyn AsyncRead + Send>>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Path escapes the storage root: {0}")]
    OutsideRoot(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Writes `data` under `name`, failing with `AlreadyExists` instead of overwriting
    async fn write_new(&self, name: &str, data: &[u8]) -> Result<PathBuf, StorageError>;

    /// Opens a staged regular file for reading
    async fn open_file(&self, name: &str) -> Result<ByteReader, StorageError>;

    /// Check if the storage root is usable
    async fn health_check(&self) -> bool;
}

/// Flat directory on local disk
pub struct LocalStorageService {
    root: PathBuf,
}

impl LocalStorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Resolves `name` to an existing path confined to the root.
    ///
    /// Symlinks are followed before the containment check.
    async fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        let root = match fs::canonicalize(&self.root).await {
            Ok(root) => root,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Storage root {} is missing", self.root.display());
                return Err(StorageError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let resolved = match fs::canonicalize(self.root.join(name)).await {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if !resolved.starts_with(&root) {
            tracing::warn!("Rejected lookup outside storage root: {}", name);
            return Err(StorageError::OutsideRoot(name.to_string()));
        }

        Ok(resolved)
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn write_new(&self, name: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.root.join(name);

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        file.write_all(data).await?;
        file.flush().await?;

        tracing::debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(path)
    }

    async fn open_file(&self, name: &str) -> Result<ByteReader, StorageError> {
        let path = self.resolve(name).await?;

        let metadata = fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let file = File::open(&path).await?;
        Ok(Box::pin(file))
    }

    async fn health_check(&self) -> bool {
        fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}
