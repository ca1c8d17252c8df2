pub mod cart_repo;
pub mod memory;
pub mod models;
pub mod product_repo;

#[cfg(test)]
pub(crate) mod test_db;

use crate::domain::errors::DomainError;
use crate::storage::StorageError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Storage(StorageError::Query(e))
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Storage(StorageError::Pool(e))
    }
}
