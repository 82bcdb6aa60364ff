//! One-time audio unlock gate
//!
//! Browser-style autoplay policy: nothing may sound until an unlock
//! succeeds from a user gesture. The gate is session-scoped state handed
//! to the session at construction rather than an ambient global, so
//! independent sessions can be tested side by side. Once open it never
//! reverts to locked.

use crate::audio::AudioBackend;
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared unlock flag with serialized attempts
#[derive(Clone, Default)]
pub struct UnlockGate {
    inner: Arc<GateInner>,
}

#[derive(Default)]
struct GateInner {
    unlocked: AtomicBool,
    attempt: Mutex<()>,
}

impl UnlockGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the output is already unlocked
    pub fn is_unlocked(&self) -> bool {
        self.inner.unlocked.load(Ordering::Acquire)
    }

    /// Attempt the one-time unlock against the backend
    ///
    /// Returns Ok(true) on the call that unlocked and Ok(false) when the
    /// gate was already open. Backend failure leaves the gate locked so a
    /// later gesture may retry.
    pub async fn unlock(&self, backend: Arc<dyn AudioBackend>) -> Result<bool> {
        if self.is_unlocked() {
            return Ok(false);
        }

        let _serial = self.inner.attempt.lock().await;
        if self.is_unlocked() {
            // Lost the race to a concurrent attempt.
            return Ok(false);
        }

        tokio::task::spawn_blocking(move || backend.unlock())
            .await
            .map_err(|e| Error::Internal(format!("unlock task: {e}")))??;

        self.inner.unlocked.store(true, Ordering::Release);
        Ok(true)
    }
}
