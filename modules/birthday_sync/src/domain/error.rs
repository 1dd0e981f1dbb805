use std::path::PathBuf;
use thiserror::Error;

/// Failures of the remote directory (pagination or credentials).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The grant expired or needs re-consent; only the user can fix this.
    #[error("authorization expired: {message}")]
    AuthExpired { message: String },

    /// Timeouts, resets, non-2xx responses.
    #[error("{message}")]
    TransientNetwork { message: String },

    #[error("{message}")]
    Unknown { message: String },
}

impl DirectoryError {
    pub fn auth_expired(message: impl Into<String>) -> Self {
        Self::AuthExpired {
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::TransientNetwork {
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }
}

/// Failures of the key-value substrate behind the snapshot store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("state storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Failures of photo cache maintenance (trim/clear).
#[derive(Error, Debug)]
pub enum PhotoCacheError {
    #[error("photo cache I/O failed at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PhotoCacheError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Everything that can abort a sync cycle.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of the sign-out reset (photo cache wipe plus snapshot reset).
#[derive(Error, Debug)]
pub enum ResetError {
    #[error(transparent)]
    Photos(#[from] PhotoCacheError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Retry policy buckets, decided once per failed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Needs interactive re-authorization; not retried.
    AuthExpired,
    /// Retried by the scheduler.
    TransientNetwork,
    /// Bug or bad data; not retried.
    PermanentFailure,
}

impl SyncError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SyncError::Directory(DirectoryError::AuthExpired { .. }) => FailureKind::AuthExpired,
            SyncError::Directory(DirectoryError::TransientNetwork { .. }) => {
                FailureKind::TransientNetwork
            }
            SyncError::Directory(DirectoryError::Unknown { .. }) | SyncError::Store(_) => {
                FailureKind::PermanentFailure
            }
        }
    }
}
