// Remedi Core - Error types
//
// A single error enum shared across the workspace. Component-local failures
// are recovered at component boundaries; only the dispatcher converts what
// remains into user-facing replies.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the Remedi crates
pub type RemediResult<T> = Result<T, RemediError>;

/// Errors produced by the dispatch engine and its components
#[derive(Error, Debug)]
pub enum RemediError {
    /// Malformed intent or flow record (recovered by skipping the record)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The catalog contains no usable intents
    #[error("No intents loaded")]
    NoIntentsLoaded,

    /// Unknown or stale session id on continue
    #[error("Session expired: {0}")]
    ExpiredSession(String),

    /// Remediation script path does not exist (no process was spawned)
    #[error("Script not found at: {}", .0.display())]
    ScriptNotFound(PathBuf),

    /// Remediation script exceeded the wall-clock timeout and was killed
    #[error("Script timed out after {0}s")]
    ScriptTimeout(u64),

    /// Remediation script exited with a non-zero status
    #[error("Script failed (code {exit_code}): {stderr}")]
    ScriptFailure { exit_code: i32, stderr: String },

    /// Embedder collaborator failure
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// ResponseGenerator collaborator failure
    #[error("Generation error: {0}")]
    Generation(String),

    /// Catch-all at the dispatcher boundary
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemediError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn dispatch(msg: impl Into<String>) -> Self {
        Self::Dispatch(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
