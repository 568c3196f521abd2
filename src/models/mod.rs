use serde::Serialize;
use std::path::PathBuf;

/// Descriptor of a file written to the staging area
#[derive(Debug, Clone, Serialize)]
pub struct StagedFile {
    /// Generated name including the validated extension
    pub name: String,
    /// Lower-case extension, one of the allow list
    pub extension: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub size: u64,
}
