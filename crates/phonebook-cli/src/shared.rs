use phonebook_store::error::{Result, StoreError};
use phonebook_store::Store;
use std::sync::{Arc, Mutex};

/// The single store connection, shared between request handlers and the
/// error sink.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<Store>>,
}

impl SharedStore {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn with<T>(&self, op: impl FnOnce(&Store) -> Result<T>) -> Result<T> {
        let store = self
            .inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        op(&store)
    }
}
