//! Shared error types for the worker fleet

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Unknown failure type: {input}")]
    UnknownFailureKind { input: String },

    #[error("Invalid worker spec '{input}': {reason}")]
    InvalidWorkerSpec { input: String, reason: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
