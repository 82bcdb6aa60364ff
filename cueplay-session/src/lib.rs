//! # Cueplay Session Library (cueplay-session)
//!
//! Sound-effects playback session manager for narrative engines.
//!
//! **Purpose:** resolve logical sound keys through the shared registry,
//! enforce anti-overlap and volume policy, run timer-driven fades, and
//! gate all output behind the one-time audio unlock.
//!
//! **Architecture:** tokio-driven session over a pluggable audio backend
//! (rodio by default) and a pluggable asset store.

pub mod audio;
pub mod error;
pub mod playback;

pub use error::{Error, Result};
pub use playback::engine::PlaybackSession;
pub use playback::types::{HandleInfo, HandleState, OverlapPolicy, PlayOptions};
pub use playback::unlock::UnlockGate;
