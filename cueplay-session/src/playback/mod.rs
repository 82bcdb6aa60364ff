//! Playback session internals

pub mod engine;
pub mod fader;
pub mod preload;
pub mod types;
pub mod unlock;
pub mod volume;

pub use engine::PlaybackSession;
pub use types::{HandleInfo, HandleState, OverlapPolicy, PlayOptions};
pub use unlock::UnlockGate;
