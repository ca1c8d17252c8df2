//! Async boundary over the blocking database driver.
//!
//! Diesel connections are synchronous. [`StorageGateway`] runs every store
//! call on tokio's blocking pool and folds both returned errors and panics
//! raised while issuing the call into a single `Result`.

mod errors;
mod gateway;

pub use errors::StorageError;
pub use gateway::StorageGateway;
