use thiserror::Error;

use crate::storage::StorageError;

/// Coarse classification of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidState,
    InvalidInput,
    Storage,
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Product not found")]
    ProductNotFound,
    #[error("Cart not found")]
    CartNotFound,

    #[error("Product already exists")]
    ProductAlreadyExists,
    #[error("Customer already has an open cart")]
    CartAlreadyOpen,
    #[error("Cart was modified during checkout")]
    CartChanged,
    #[error("Product is referenced by a cart")]
    ProductInUse,
    #[error("Product stock is lower than requested")]
    LowStock,
    #[error("Product is out of stock")]
    EmptyStock,
    #[error("Product not in cart")]
    ProductNotInCart,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::ProductNotFound | DomainError::CartNotFound => ErrorKind::NotFound,
            DomainError::ProductAlreadyExists
            | DomainError::CartAlreadyOpen
            | DomainError::CartChanged
            | DomainError::ProductInUse
            | DomainError::LowStock
            | DomainError::EmptyStock
            | DomainError::ProductNotInCart => ErrorKind::Conflict,
            DomainError::EmptyCart => ErrorKind::InvalidState,
            DomainError::InvalidDate(_) | DomainError::InvalidInput(_) => ErrorKind::InvalidInput,
            DomainError::Storage(_) | DomainError::Internal(_) => ErrorKind::Storage,
        }
    }
}
