use thiserror::Error;

/// Errors that are safe to expose to hosts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BirthdaySyncError {
    #[error("Snapshot storage failed: {message}")]
    Storage { message: String },

    #[error("Photo cache failed: {message}")]
    Cache { message: String },

    #[error("Sync cancelled before completion")]
    Cancelled,
}

impl BirthdaySyncError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::Cancelled
    }
}
