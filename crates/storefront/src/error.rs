//! Unified error type for cart operations.
//!
//! The controller itself never returns these: it logs and converts failures
//! at each operation boundary. `CartError` is what setup code and front ends
//! (the CLI) propagate with `?`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::remote::RemoteError;
use crate::storage::StorageError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Remote cart operation failed.
    #[error("Remote cart error: {0}")]
    Remote(#[from] RemoteError),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
