//! Audio output abstraction
//!
//! The session drives audio through two seams: an [`AudioBackend`] that
//! owns the shared output device, and an [`AssetStore`] that resolves
//! resource paths to sound bytes. Production code wires up
//! [`RodioBackend`] and [`FsAssetStore`]; tests substitute mocks.

pub mod backend;
pub mod output;
pub mod store;

pub use backend::{AudioBackend, SoundBytes, Voice};
pub use output::RodioBackend;
pub use store::{AssetStore, FsAssetStore};
