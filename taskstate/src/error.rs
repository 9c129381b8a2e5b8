//! Error types for the task tree, metrics, and session persistence.

use thiserror::Error;

/// Failures raised by task tree addressing and state changes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task does not exist: {0}")]
    MalformedTaskId(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Failures raised by the cost accumulator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CostError {
    #[error("Added cost must be finite and non-negative: {0}")]
    NegativeCost(f64),

    #[error("Total cost must be finite and non-negative: {0}")]
    NegativeTotal(f64),

    #[error("Total cost is no longer finite: {0}")]
    TotalOverflow(f64),
}

/// Failures raised while saving or restoring a session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Corrupt session state: {0}")]
    Corrupt(String),
}

pub type TaskResult<T> = std::result::Result<T, TaskError>;
pub type SessionResult<T> = std::result::Result<T, SessionError>;
