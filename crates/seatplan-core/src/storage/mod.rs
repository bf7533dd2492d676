//! Layout persistence.
//!
//! Backends store whole [`MarkerStore`] documents keyed by id. The designer
//! core never calls them itself; [`SaveTracker`] decides when the caller
//! should.

mod memory;
mod tracker;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;
pub use tracker::{DEFAULT_SAVE_INTERVAL, LAST_LAYOUT_KEY, SaveTracker};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::store::MarkerStore;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Layout not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for storage operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Layout storage backend.
pub trait LayoutStorage: Send + Sync {
    /// Save a layout.
    fn save(&self, id: &str, layout: &MarkerStore) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a layout.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<MarkerStore>>;

    /// Delete a layout. Deleting a missing layout is not an error.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all layout IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a layout exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Polls a future to completion on the current thread.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
