use std::{error::Error, path::PathBuf};
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by key-value backends regardless of where the values live.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// Reading or writing the backing file failed.
    #[error("storage i/o failed for `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A value could not be encoded before being written under `key`.
    #[error("failed to encode value for key `{key}`")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// A stored value could not be decoded into the expected shape.
    #[error("failed to decode value stored under `{key}`")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
