//! Backend traits for audio output
//!
//! [`AudioBackend`] owns the shared output device; one [`Voice`] exists
//! per live playback handle. Both are object-safe so tests can
//! substitute a mock device for the real rodio output.

use crate::error::Result;
use std::sync::Arc;

/// Immutable, cheaply-cloneable sound data
///
/// Holds the full encoded bytes of one resource. Wraps `Arc<[u8]>` so
/// every voice playing the same sound shares one buffer.
#[derive(Debug, Clone)]
pub struct SoundBytes(Arc<[u8]>);

impl SoundBytes {
    pub fn new(data: Vec<u8>) -> Self {
        Self(data.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for SoundBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Shared audio output device
pub trait AudioBackend: Send + Sync + 'static {
    /// Open the output device. Idempotent; driven by the session's
    /// unlock gate, which serializes attempts.
    fn unlock(&self) -> Result<()>;

    /// Start one voice at the given gain. The voice begins playing
    /// immediately.
    fn start(&self, bytes: SoundBytes, gain: f32, looped: bool) -> Result<Box<dyn Voice>>;
}

/// One live playback instance on the backend
pub trait Voice: Send + Sync {
    fn set_gain(&self, gain: f32);

    fn pause(&self);

    fn resume(&self);

    fn stop(&self);

    /// True once the voice has played to its natural end. Looping
    /// voices never finish.
    fn is_finished(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_bytes_shared() {
        let bytes = SoundBytes::new(vec![1, 2, 3]);
        let clone = bytes.clone();
        assert_eq!(bytes.as_ref(), clone.as_ref());
        assert_eq!(bytes.len(), 3);
        assert!(!bytes.is_empty());
    }
}
