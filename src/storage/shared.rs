//! Process-wide store handle for async callers
//!
//! rusqlite calls block, so every call runs on the blocking pool while
//! holding the single connection's lock. SQLite's busy timeout covers
//! contention with other processes.

use std::sync::Arc;
use tokio::sync::Mutex;
use crate::{Error, Result};
use super::sqlite::TodoStore;

/// Cloneable handle to the one `TodoStore` shared by all requests.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<TodoStore>>,
}

impl SharedStore {
    pub fn new(store: TodoStore) -> Self {
        Self { inner: Arc::new(Mutex::new(store)) }
    }

    /// Run `f` against the store on the blocking pool
    pub async fn with_store<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&TodoStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = store.blocking_lock();
            f(&guard)
        })
        .await
        .map_err(|e| Error::Task(e.to_string()))?
    }

    /// Take the store back once no other handle remains, so it can be
    /// closed. Returns `None` while clones are still alive.
    pub fn into_inner(self) -> Option<TodoStore> {
        Arc::try_unwrap(self.inner).ok().map(Mutex::into_inner)
    }
}
