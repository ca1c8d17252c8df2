use thiserror::Error;

/// Failures of the storage layer that carry no domain meaning.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("storage call panicked: {0}")]
    Panicked(String),

    #[error("storage call aborted: {0}")]
    Aborted(String),

    #[error("storage state poisoned")]
    Poisoned,
}
