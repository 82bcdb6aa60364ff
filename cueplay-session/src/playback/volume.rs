//! Session volume policy
//!
//! The gain applied to any voice is
//! clamp(master × category_override × descriptor_default, 0, 1),
//! forced to 0.0 while muted. Overrides live only for the session; the
//! caller persists preferences if it wants them back next run.

use cueplay_common::{Category, SoundDescriptor};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Master/category volume state with clamped setters
pub struct VolumeTable {
    inner: RwLock<VolumeState>,
}

#[derive(Debug, Clone)]
struct VolumeState {
    master: f32,
    muted: bool,
    categories: HashMap<Category, f32>,
}

impl VolumeTable {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(VolumeState {
                master: 1.0,
                muted: false,
                categories: HashMap::new(),
            }),
        }
    }

    /// Get master volume (0.0 - 1.0)
    pub async fn master(&self) -> f32 {
        self.inner.read().await.master
    }

    /// Set master volume (clamped to 0.0 - 1.0)
    pub async fn set_master(&self, level: f32) {
        self.inner.write().await.master = level.clamp(0.0, 1.0);
    }

    pub async fn muted(&self) -> bool {
        self.inner.read().await.muted
    }

    pub async fn set_muted(&self, muted: bool) {
        self.inner.write().await.muted = muted;
    }

    /// Category override; 1.0 when never set
    pub async fn category(&self, category: Category) -> f32 {
        self.inner
            .read()
            .await
            .categories
            .get(&category)
            .copied()
            .unwrap_or(1.0)
    }

    /// Set a category override (clamped to 0.0 - 1.0)
    pub async fn set_category(&self, category: Category, level: f32) {
        self.inner
            .write()
            .await
            .categories
            .insert(category, level.clamp(0.0, 1.0));
    }

    /// Effective gain for a descriptor under the current overrides
    pub async fn effective(&self, descriptor: &SoundDescriptor) -> f32 {
        let state = self.inner.read().await;
        if state.muted {
            return 0.0;
        }
        let category = state
            .categories
            .get(&descriptor.category)
            .copied()
            .unwrap_or(1.0);
        (state.master * category * descriptor.default_volume).clamp(0.0, 1.0)
    }
}

impl Default for VolumeTable {
    fn default() -> Self {
        Self::new()
    }
}
