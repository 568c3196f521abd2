use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::models::StagedFile;
use crate::services::storage::{ByteReader, StorageError, StorageService};
use crate::utils::naming::generate_stem;
use crate::utils::validation::{validate_content, validate_extension, validate_staged_name};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

/// Attempts at drawing a fresh name when the generated one is already taken
const MAX_NAME_ATTEMPTS: usize = 3;

/// Chunked stream over a staged file
pub type FileStream = ReaderStream<ByteReader>;

/// Validates, names and stores uploads; streams staged files back.
pub struct FileService {
    storage: Arc<dyn StorageService>,
    config: AppConfig,
}

impl FileService {
    pub fn new(storage: Arc<dyn StorageService>, config: AppConfig) -> Self {
        Self { storage, config }
    }

    /// Stages an upload under a generated name.
    ///
    /// Nothing is written when validation fails.
    pub async fn stage(&self, original_filename: &str, data: &[u8]) -> Result<StagedFile, AppError> {
        let extension = validate_extension(original_filename)?;
        validate_content(data, &extension, self.config.validation_policy)?;

        if data.len() > self.config.max_file_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File size {} bytes exceeds maximum allowed {} bytes",
                data.len(),
                self.config.max_file_size
            )));
        }

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let name = format!(
                "{}.{}",
                generate_stem(self.config.naming_strategy, self.config.name_length),
                extension
            );

            match self.storage.write_new(&name, data).await {
                Ok(path) => {
                    tracing::info!(
                        "📦 Staged '{}' as {} ({} bytes)",
                        original_filename,
                        name,
                        data.len()
                    );
                    return Ok(StagedFile {
                        name,
                        extension,
                        path,
                        size: data.len() as u64,
                    });
                }
                Err(StorageError::AlreadyExists(_)) => {
                    tracing::warn!(
                        "Generated name {} already taken (attempt {}/{})",
                        name,
                        attempt,
                        MAX_NAME_ATTEMPTS
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Internal(format!(
            "Could not find a free staging name after {} attempts",
            MAX_NAME_ATTEMPTS
        )))
    }

    /// Opens a staged file as a lazy stream of chunks of at most `chunk_size` bytes.
    ///
    /// Every call opens the file afresh.
    pub async fn retrieve(&self, name: &str) -> Result<FileStream, AppError> {
        validate_staged_name(name)?;

        let reader = self.storage.open_file(name).await?;
        Ok(ReaderStream::with_capacity(reader, self.config.chunk_size))
    }
}
