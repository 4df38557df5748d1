//! Orchestrator-specific error types

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Failed to spawn worker {name}: {reason}")]
    WorkerSpawnFailed { name: String, reason: String },

    #[error("Worker '{name}' not found")]
    UnknownWorker { name: String },

    #[error("Worker {name} unreachable: {reason}")]
    WorkerUnreachable { name: String, reason: String },

    #[error("Worker {name} answered HTTP {status}")]
    WorkerRejected { name: String, status: u16 },

    #[error("Worker {name} sent an unreadable response: {reason}")]
    InvalidResponse { name: String, reason: String },

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Invalid command: {input}")]
    InvalidCommand { input: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl OrchestratorError {
    pub fn config(field: impl Into<String>) -> Self {
        OrchestratorError::ConfigurationError { field: field.into() }
    }

    pub fn spawn(name: &str, reason: impl std::fmt::Display) -> Self {
        OrchestratorError::WorkerSpawnFailed {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn unknown_worker(name: &str) -> Self {
        OrchestratorError::UnknownWorker { name: name.to_string() }
    }

    /// Transport-level failure (refused, reset, timed out)
    pub fn is_transport(&self) -> bool {
        matches!(self, OrchestratorError::WorkerUnreachable { .. })
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
