//! Handle states and play options

use chrono::{DateTime, Utc};
use cueplay_common::Category;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Playback handle state machine
///
/// Loading → Playing → { Paused ⇄ Playing } → FadingOut → Stopped.
/// Stopped is terminal; stopped handles leave the active set and are
/// never resurrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleState {
    Loading,
    Playing,
    Paused,
    FadingOut,
    Stopped,
}

impl std::fmt::Display for HandleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleState::Loading => write!(f, "loading"),
            HandleState::Playing => write!(f, "playing"),
            HandleState::Paused => write!(f, "paused"),
            HandleState::FadingOut => write!(f, "fading_out"),
            HandleState::Stopped => write!(f, "stopped"),
        }
    }
}

/// What `play` does when the same (category, key) is already active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Cut the existing handle and start fresh
    #[default]
    Restart,
    /// Keep the existing handle and return its id
    Ignore,
}

/// Per-call playback options
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayOptions {
    /// Queue the request instead of failing with `AudioLocked` while the
    /// output is still locked. Queued sounds start when unlock succeeds.
    pub queue_if_locked: bool,

    /// Anti-overlap resolution for non-overlapping descriptors
    pub overlap: OverlapPolicy,
}

impl PlayOptions {
    pub fn queued() -> Self {
        Self {
            queue_if_locked: true,
            ..Self::default()
        }
    }

    pub fn keep_existing() -> Self {
        Self {
            overlap: OverlapPolicy::Ignore,
            ..Self::default()
        }
    }
}

/// Snapshot of one active handle
#[derive(Debug, Clone, Serialize)]
pub struct HandleInfo {
    pub handle_id: Uuid,
    pub category: Category,
    pub key: String,
    pub state: HandleState,
    /// When the handle entered Playing; None while still Loading
    pub started_at: Option<DateTime<Utc>>,
}
