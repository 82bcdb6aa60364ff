//! Sound registry: (category, key) to descriptor table
//!
//! Read-mostly after initialization: built once at startup (usually from
//! a manifest), then shared behind `Arc`. Owns no runtime state.

use crate::error::{Error, Result};
use crate::sound::{Category, SoundDescriptor};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Static mapping from logical sound identifiers to descriptors
#[derive(Debug, Default)]
pub struct SoundRegistry {
    table: HashMap<Category, HashMap<String, Arc<SoundDescriptor>>>,
}

impl SoundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor
    ///
    /// Fails with `DuplicateKey` if the (category, key) pair is already
    /// taken. Registration errors are fatal to startup.
    pub fn register(&mut self, descriptor: SoundDescriptor) -> Result<()> {
        let sounds = self.table.entry(descriptor.category).or_default();
        if sounds.contains_key(&descriptor.key) {
            return Err(Error::DuplicateKey {
                category: descriptor.category,
                key: descriptor.key,
            });
        }
        debug!(category = %descriptor.category, key = %descriptor.key, "registered sound");
        sounds.insert(descriptor.key.clone(), Arc::new(descriptor));
        Ok(())
    }

    /// Resolve a (category, key) pair to its descriptor
    ///
    /// Fails with `UnknownSound` if the pair was never registered; an
    /// unresolvable key is a caller programming error, surfaced
    /// immediately rather than degrading silently.
    pub fn resolve(&self, category: Category, key: &str) -> Result<Arc<SoundDescriptor>> {
        self.table
            .get(&category)
            .and_then(|sounds| sounds.get(key))
            .cloned()
            .ok_or_else(|| Error::UnknownSound {
                category,
                key: key.to_string(),
            })
    }

    /// Whether a (category, key) pair is registered
    pub fn contains(&self, category: Category, key: &str) -> bool {
        self.table
            .get(&category)
            .is_some_and(|sounds| sounds.contains_key(key))
    }

    /// Total number of registered sounds
    pub fn len(&self) -> usize {
        self.table.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate all registered descriptors
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<SoundDescriptor>> {
        self.table.values().flat_map(HashMap::values)
    }
}
