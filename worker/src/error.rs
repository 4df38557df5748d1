//! Worker error types

use shared::SharedError;
use thiserror::Error;

/// Result type for worker operations
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Worker error types
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Control server failed to bind {addr}: {source}")]
    ServerStartupFailed {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("Scratch file {path} failed: {source}")]
    ScratchIo { path: String, source: std::io::Error },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config(message: impl Into<String>) -> Self {
        WorkerError::ConfigError { message: message.into() }
    }

    pub fn scratch(path: &std::path::Path, source: std::io::Error) -> Self {
        WorkerError::ScratchIo {
            path: path.display().to_string(),
            source,
        }
    }
}
