//! Error types for the progression engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LevelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document {path}: {reason}")]
    Document { path: String, reason: String },

    #[error("Vault source error: {0}")]
    Source(String),

    #[error("State store error: {0}")]
    Store(String),
}

impl LevelError {
    pub fn document(path: impl Into<String>, reason: impl ToString) -> Self {
        LevelError::Document {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LevelError>;
