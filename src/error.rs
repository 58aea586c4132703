//! Error types for the task tracker.
//!
//! Two taxonomies are kept apart: [`TaskError`] for in-memory rule violations
//! and [`JsonError`] for persistence faults. [`Error`] wraps both for the
//! command surface and maps them onto process exit codes.

use std::path::PathBuf;

use thiserror::Error;

use crate::task::{MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};

/// Exit codes for the `tt` binary.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Domain rule violations raised by the store and task setters.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskError {
    #[error("Invalid task ID")]
    InvalidId,
    #[error("Task not found")]
    TaskNotFound,
    #[error("Invalid task status")]
    InvalidStatus,
    #[error("Task title cannot be empty")]
    EmptyTitle,
    #[error("Task with this title already exists")]
    DuplicateTask,
    #[error("Priority must be between 0 and 10")]
    InvalidPriority,
    #[error("Task title is longer than {} characters", MAX_TITLE_LEN)]
    TitleTooLong,
    #[error("Task description is longer than {} characters", MAX_DESCRIPTION_LEN)]
    DescriptionTooLong,
    #[error("No task ids left to assign")]
    IdsExhausted,
}

/// Faults raised while reading or writing the JSON data file.
#[derive(Error, Debug)]
pub enum JsonError {
    #[error("JSON file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Invalid JSON format: {0}")]
    InvalidFormat(String),

    #[error("Failed to write JSON file {}: {source}", .path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    ParseError(String),
}

/// Top-level error for command execution.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Json(#[from] JsonError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON output error: {0}")]
    Report(#[from] serde_json::Error),
}

impl Error {
    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Task(_) | Error::InvalidArgument(_) => exit_codes::USER_ERROR,
            Error::Json(JsonError::FileNotFound { .. }) => exit_codes::USER_ERROR,
            Error::Json(_) | Error::Io(_) | Error::Report(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for command execution.
pub type Result<T> = std::result::Result<T, Error>;
