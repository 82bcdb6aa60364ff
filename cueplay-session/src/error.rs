//! Error types for cueplay-session
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation. Playback errors are returned per-call and never poison
//! session state.

use cueplay_common::Category;
use thiserror::Error;

/// Main error type for the playback session
#[derive(Error, Debug)]
pub enum Error {
    /// Audio output has not been unlocked yet. Expected steady state
    /// before the first user gesture; treat as "deferred", not "failed".
    #[error("audio output is locked; unlock() must succeed first")]
    AudioLocked,

    /// Lookup of a (category, key) pair that was never registered
    #[error("unknown sound: {category}/{key}")]
    UnknownSound { category: Category, key: String },

    /// Resource fetch failure. Transient: the caller may retry.
    #[error("resource load failed for '{path}': {message}")]
    ResourceLoad { path: String, message: String },

    /// Audio backend / output device error
    #[error("audio backend error: {0}")]
    Backend(String),

    /// Operation invalid for the current state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Other errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<cueplay_common::Error> for Error {
    fn from(err: cueplay_common::Error) -> Self {
        match err {
            cueplay_common::Error::UnknownSound { category, key } => {
                Error::UnknownSound { category, key }
            }
            other => Error::Internal(other.to_string()),
        }
    }
}

/// Convenience Result type using the session Error
pub type Result<T> = std::result::Result<T, Error>;
