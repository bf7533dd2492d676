//! In-memory storage implementation.

use super::{BoxFuture, LayoutStorage, StorageError, StorageResult};
use crate::store::MarkerStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for tests and unsaved sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    layouts: RwLock<HashMap<String, MarkerStore>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {e}"))
}

impl LayoutStorage for MemoryStorage {
    fn save(&self, id: &str, layout: &MarkerStore) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let layout = layout.clone();
        Box::pin(async move {
            let mut layouts = self.layouts.write().map_err(lock_error)?;
            layouts.insert(id, layout);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<MarkerStore>> {
        let id = id.to_string();
        Box::pin(async move {
            let layouts = self.layouts.read().map_err(lock_error)?;
            layouts.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut layouts = self.layouts.write().map_err(lock_error)?;
            layouts.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let layouts = self.layouts.read().map_err(lock_error)?;
            let mut ids: Vec<String> = layouts.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let layouts = self.layouts.read().map_err(lock_error)?;
            Ok(layouts.contains_key(&id))
        })
    }
}
