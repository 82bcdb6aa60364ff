//! Preload cache with in-flight deduplication
//!
//! Concurrent fetches of the same sound share one load: the first caller
//! runs the store read on the blocking pool while later callers await
//! the same cell. Failed loads are not cached, so a retry always gets a
//! fresh attempt.

use crate::audio::{AssetStore, SoundBytes};
use crate::error::{Error, Result};
use cueplay_common::{Category, SoundDescriptor};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

type SoundSlot = (Category, String);

/// Shared byte cache keyed by (category, key)
pub struct PreloadCache {
    store: Arc<dyn AssetStore>,
    cells: Mutex<HashMap<SoundSlot, Arc<OnceCell<SoundBytes>>>>,
}

impl PreloadCache {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self {
            store,
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the bytes for a descriptor, loading at most once
    pub async fn fetch(&self, descriptor: &SoundDescriptor) -> Result<SoundBytes> {
        let cell = {
            let mut cells = self.cells.lock().await;
            cells
                .entry((descriptor.category, descriptor.key.clone()))
                .or_default()
                .clone()
        };

        let bytes = cell.get_or_try_init(|| self.load(descriptor)).await?;
        Ok(bytes.clone())
    }

    /// Whether the bytes for (category, key) are already resident
    pub async fn is_loaded(&self, category: Category, key: &str) -> bool {
        let cells = self.cells.lock().await;
        cells
            .get(&(category, key.to_string()))
            .is_some_and(|cell| cell.initialized())
    }

    async fn load(&self, descriptor: &SoundDescriptor) -> Result<SoundBytes> {
        let store = Arc::clone(&self.store);
        let path = descriptor.resource_path.clone();
        debug!(category = %descriptor.category, key = %descriptor.key, %path, "loading sound");

        let data = tokio::task::spawn_blocking(move || store.load(&path))
            .await
            .map_err(|e| Error::Internal(format!("load task: {e}")))?
            .map_err(|e| Error::ResourceLoad {
                path: descriptor.resource_path.clone(),
                message: e.to_string(),
            })?;

        Ok(SoundBytes::new(data))
    }
}
