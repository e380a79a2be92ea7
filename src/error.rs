use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between the canvas and the remote workspace.
///
/// None of these are fatal: controllers log them and keep the UI running.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error("directory load failed: {0}")]
    LoadFailure(String),

    #[error("workspace id is not available")]
    MissingWorkspace,

    #[error("upload failed: {0}")]
    UploadFailure(String),

    #[error("HTTP client unavailable: {0}")]
    HttpClient(String),

    #[error("item {0} is already on the canvas")]
    DuplicateItem(String),

    #[error("item {0} is not on the canvas")]
    UnknownItem(String),

    #[error("persisted state at {path}: {reason}")]
    Store { path: PathBuf, reason: String },

    #[error("config at {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

pub type DeskResult<T> = Result<T, DeskError>;
