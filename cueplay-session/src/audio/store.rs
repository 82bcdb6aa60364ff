//! Asset store: resource path to sound bytes
//!
//! The collaborator that owns asset layout. Loads are blocking reads;
//! the session drives them through the tokio blocking pool.

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves resource paths to loadable sound bytes
pub trait AssetStore: Send + Sync + 'static {
    fn load(&self, resource_path: &str) -> io::Result<Vec<u8>>;
}

/// Filesystem asset store rooted at one directory
///
/// Resource paths from descriptors are joined onto the root, so a
/// manifest entry `pain/hit1.mp3` resolves to `<root>/pain/hit1.mp3`.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetStore for FsAssetStore {
    fn load(&self, resource_path: &str) -> io::Result<Vec<u8>> {
        let path = self.root.join(resource_path);
        debug!(path = %path.display(), "loading sound asset");
        std::fs::read(path)
    }
}
