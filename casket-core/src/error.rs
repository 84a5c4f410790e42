use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CasketError {
    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Failed to write temporary file for {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to publish {path:?}: {source}")]
    PublishFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CasketError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CasketError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CasketError>;
