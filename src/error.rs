use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Failed to read catalog from {path}: {source}")]
    CatalogRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse catalog: {0}")]
    CatalogParse(String),

    #[error("Invalid catalog: {0}")]
    CatalogInvalid(String),

    #[error("Storage I/O failed for key '{key}': {source}")]
    StorageIo { key: String, source: io::Error },

    #[error("Malformed stored value under key '{key}': {source}")]
    StorageFormat {
        key: String,
        source: serde_json::Error,
    },

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode output JSON: {0}")]
    OutputEncode(#[from] serde_json::Error),

    #[error("{0}")]
    SignInRejected(String),

    #[error("Home directory not found")]
    NoHomeDir,
}

pub type Result<T> = std::result::Result<T, AssistantError>;
