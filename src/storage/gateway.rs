use std::any::Any;
use std::sync::Arc;

use tokio::task;

use super::errors::StorageError;
use crate::domain::errors::DomainError;

/// Turns calls against a blocking store `S` into futures.
///
/// Calls submitted through one gateway are independent tasks; ordering
/// between them is only what the caller enforces by awaiting.
pub struct StorageGateway<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for StorageGateway<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> StorageGateway<S>
where
    S: ?Sized + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Run `op` against the store on the blocking pool.
    ///
    /// A panic inside `op` resolves to `DomainError::Storage` exactly like an
    /// error returned by the driver.
    pub async fn call<T, F>(&self, op: F) -> Result<T, DomainError>
    where
        F: FnOnce(&S) -> Result<T, DomainError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);

        match task::spawn_blocking(move || op(store.as_ref())).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => {
                let message = panic_message(e.into_panic());
                log::error!("storage call panicked: {}", message);
                Err(StorageError::Panicked(message).into())
            }
            Err(e) => Err(StorageError::Aborted(e.to_string()).into()),
        }
    }

    /// A mutation resolving to the number of affected rows.
    pub async fn execute<F>(&self, op: F) -> Result<usize, DomainError>
    where
        F: FnOnce(&S) -> Result<usize, DomainError> + Send + 'static,
    {
        self.call(op).await
    }

    /// A query resolving to a materialized row set.
    pub async fn query<T, F>(&self, op: F) -> Result<Vec<T>, DomainError>
    where
        F: FnOnce(&S) -> Result<Vec<T>, DomainError> + Send + 'static,
        T: Send + 'static,
    {
        self.call(op).await
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .unwrap_or_else(|| "unknown panic payload".to_string()),
    }
}
