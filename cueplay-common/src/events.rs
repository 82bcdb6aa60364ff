//! Event types for the cueplay event system
//!
//! Broadcast by the playback session so observers (UI, diagnostics) can
//! follow handle lifecycles without polling.

use crate::sound::Category;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Playback event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlaybackEvent {
    /// Audio output unlocked (first successful gesture-bound attempt)
    AudioUnlocked {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A play request was queued while the output was still locked
    SoundQueued {
        handle_id: Uuid,
        category: Category,
        key: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A handle entered Playing
    SoundStarted {
        handle_id: Uuid,
        category: Category,
        key: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    SoundPaused {
        handle_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    SoundResumed {
        handle_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A stop began ramping the handle down instead of cutting it
    FadeOutStarted {
        handle_id: Uuid,
        duration_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A handle reached its terminal state and left the active set.
    /// `completed` is true when the sound played to its natural end.
    SoundStopped {
        handle_id: Uuid,
        category: Category,
        key: String,
        completed: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A play request failed after its handle was created
    PlaybackFailed {
        handle_id: Uuid,
        category: Category,
        key: String,
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    PreloadCompleted {
        category: Category,
        key: String,
        bytes: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    PreloadFailed {
        category: Category,
        key: String,
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    MasterVolumeChanged {
        volume: f32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    CategoryVolumeChanged {
        category: Category,
        volume: f32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    MuteChanged {
        muted: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}
