//! Storage error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Record file is empty or has no categories: {}", .0.display())]
    InvalidCollection(PathBuf),

    #[error("Record file not found: {}", .0.display())]
    NotFound(PathBuf),
}
