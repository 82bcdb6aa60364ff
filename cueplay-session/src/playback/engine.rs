//! Playback session orchestration
//!
//! Coordinates registry resolution, the unlock gate, the preload cache,
//! fade scheduling, and the completion sweep behind the public control
//! surface used by the narrative engine.

use crate::audio::{AssetStore, AudioBackend, Voice};
use crate::error::{Error, Result};
use crate::playback::fader::{FadeDirection, FadeRamp, FADE_TICK};
use crate::playback::preload::PreloadCache;
use crate::playback::types::{HandleInfo, HandleState, OverlapPolicy, PlayOptions};
use crate::playback::unlock::UnlockGate;
use crate::playback::volume::VolumeTable;
use chrono::{DateTime, Utc};
use cueplay_common::events::PlaybackEvent;
use cueplay_common::{Category, SoundDescriptor, SoundRegistry};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Poll interval for reaping naturally-finished voices
const SWEEP_INTERVAL: Duration = Duration::from_millis(100);

/// One entry in the active handle set
struct HandleEntry {
    descriptor: Arc<SoundDescriptor>,
    state_tx: watch::Sender<HandleState>,
    /// Backend voice; None while Loading
    voice: Option<Arc<dyn Voice>>,
    started_at: Option<DateTime<Utc>>,
    /// A fade-in ramp currently owns this voice's gain
    fading_in: bool,
}

impl HandleEntry {
    fn state(&self) -> HandleState {
        *self.state_tx.borrow()
    }
}

/// A play request parked until the output unlocks
struct QueuedPlay {
    handle_id: Uuid,
    descriptor: Arc<SoundDescriptor>,
}

/// Sound-effects playback session
///
/// Public control surface for the narrative engine: play/stop/pause by
/// logical key, category volume policy, preloading, and the one-time
/// audio unlock. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct PlaybackSession {
    registry: Arc<SoundRegistry>,
    backend: Arc<dyn AudioBackend>,
    cache: Arc<PreloadCache>,
    gate: UnlockGate,
    volumes: Arc<VolumeTable>,
    handles: Arc<RwLock<HashMap<Uuid, HandleEntry>>>,
    pending: Arc<Mutex<Vec<QueuedPlay>>>,
    event_tx: broadcast::Sender<PlaybackEvent>,
    running: Arc<RwLock<bool>>,
}

impl PlaybackSession {
    /// Create a new session over a registry, asset store, backend, and
    /// unlock gate
    ///
    /// The gate is injected so callers control unlock scope; pass a
    /// fresh [`UnlockGate`] for an independent session.
    pub fn new(
        registry: Arc<SoundRegistry>,
        store: Arc<dyn AssetStore>,
        backend: Arc<dyn AudioBackend>,
        gate: UnlockGate,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(100); // Buffer up to 100 events
        Self {
            registry,
            backend,
            cache: Arc::new(PreloadCache::new(store)),
            gate,
            volumes: Arc::new(VolumeTable::new()),
            handles: Arc::new(RwLock::new(HashMap::new())),
            pending: Arc::new(Mutex::new(Vec::new())),
            event_tx,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Start background housekeeping (the completion sweep)
    pub async fn start(&self) {
        let mut running = self.running.write().await;
        if *running {
            return;
        }
        *running = true;
        drop(running);

        let session = self.clone();
        tokio::spawn(async move {
            session.completion_sweep_loop().await;
        });
        debug!("playback session started");
    }

    /// Stop housekeeping and cut every live handle
    pub async fn shutdown(&self) {
        *self.running.write().await = false;

        let ids: Vec<Uuid> = self.handles.read().await.keys().copied().collect();
        for id in ids {
            self.cut(id, false).await;
        }
        info!("playback session shut down");
    }

    // ========================================
    // Unlock
    // ========================================

    /// Attempt the one-time audio unlock
    ///
    /// Must be driven from a user-gesture context on platforms with
    /// autoplay restrictions. Returns Ok(true) on the call that
    /// unlocked, Ok(false) when already unlocked. On success, play
    /// requests queued while locked are started.
    pub async fn unlock(&self) -> Result<bool> {
        let first = self.gate.unlock(Arc::clone(&self.backend)).await?;
        if !first {
            return Ok(false);
        }

        info!("audio output unlocked");
        self.emit(PlaybackEvent::AudioUnlocked {
            timestamp: Utc::now(),
        });

        let queued: Vec<QueuedPlay> = self.pending.lock().await.drain(..).collect();
        for QueuedPlay { handle_id, descriptor } in queued {
            let session = self.clone();
            tokio::spawn(async move {
                if let Err(e) = session.load_and_start(handle_id, descriptor).await {
                    warn!(handle = %handle_id, error = %e, "queued playback failed");
                }
            });
        }
        Ok(true)
    }

    /// Whether the audio output is unlocked
    pub fn is_unlocked(&self) -> bool {
        self.gate.is_unlocked()
    }

    // ========================================
    // Playback control
    // ========================================

    /// Preload a sound without starting playback
    ///
    /// Suspends until the resource is ready. Safe to call repeatedly:
    /// concurrent calls await the same in-flight load, and a completed
    /// load returns immediately.
    pub async fn preload(&self, category: Category, key: &str) -> Result<()> {
        let descriptor = self.registry.resolve(category, key)?;
        match self.cache.fetch(&descriptor).await {
            Ok(bytes) => {
                debug!(%category, key, bytes = bytes.len(), "preload complete");
                self.emit(PlaybackEvent::PreloadCompleted {
                    category,
                    key: key.to_string(),
                    bytes: bytes.len() as u64,
                    timestamp: Utc::now(),
                });
                Ok(())
            }
            Err(e) => {
                warn!(%category, key, error = %e, "preload failed");
                self.emit(PlaybackEvent::PreloadFailed {
                    category,
                    key: key.to_string(),
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }

    /// Start playback of a registered sound
    ///
    /// While the output is locked this fails fast with `AudioLocked`
    /// unless `options.queue_if_locked` is set, in which case the
    /// request is parked and its handle id returned; unlock starts it.
    /// Anti-overlap applies before the new voice starts: an active
    /// handle for the same (category, key) is cut (`Restart`) or kept
    /// and returned (`Ignore`), unless the descriptor allows overlap.
    pub async fn play(&self, category: Category, key: &str, options: PlayOptions) -> Result<Uuid> {
        let descriptor = self.registry.resolve(category, key)?;

        // Fail fast while locked, before any state is touched.
        let locked = !self.gate.is_unlocked();
        if locked && !options.queue_if_locked {
            return Err(Error::AudioLocked);
        }

        if !descriptor.allow_overlap {
            if let Some(existing) = self.find_active(category, key).await {
                match options.overlap {
                    OverlapPolicy::Ignore => {
                        debug!(%category, key, handle = %existing, "already active, keeping existing");
                        return Ok(existing);
                    }
                    OverlapPolicy::Restart => {
                        debug!(%category, key, handle = %existing, "already active, restarting");
                        self.cut(existing, false).await;
                    }
                }
            }
        }

        let handle_id = Uuid::new_v4();
        self.insert_handle(handle_id, Arc::clone(&descriptor)).await;

        if locked {
            self.pending.lock().await.push(QueuedPlay {
                handle_id,
                descriptor: Arc::clone(&descriptor),
            });
            info!(%category, key, handle = %handle_id, "audio locked, queued playback");
            self.emit(PlaybackEvent::SoundQueued {
                handle_id,
                category,
                key: key.to_string(),
                timestamp: Utc::now(),
            });
            return Ok(handle_id);
        }

        self.load_and_start(handle_id, descriptor).await?;
        Ok(handle_id)
    }

    /// Stop a handle
    ///
    /// Applies the descriptor's fade-out when one is configured and the
    /// handle is Playing; Loading handles are cancelled outright, and
    /// paused voices are cut since a fade-out on a paused voice would
    /// never be heard. Stopping an unknown or already-stopping handle is
    /// a no-op.
    pub async fn stop(&self, handle_id: Uuid) {
        let fade_descriptor = {
            let mut handles = self.handles.write().await;
            let Some(entry) = handles.get_mut(&handle_id) else {
                return;
            };
            match entry.state() {
                HandleState::FadingOut | HandleState::Stopped => return,
                HandleState::Playing if entry.descriptor.fade_out_ms > 0 => {
                    entry.state_tx.send_replace(HandleState::FadingOut);
                    entry.fading_in = false;
                    Some(Arc::clone(&entry.descriptor))
                }
                _ => None,
            }
        };

        match fade_descriptor {
            Some(descriptor) => {
                debug!(handle = %handle_id, duration_ms = descriptor.fade_out_ms, "fading out");
                self.emit(PlaybackEvent::FadeOutStarted {
                    handle_id,
                    duration_ms: descriptor.fade_out_ms,
                    timestamp: Utc::now(),
                });
                self.spawn_fade_out(handle_id, descriptor);
            }
            None => self.cut(handle_id, false).await,
        }
    }

    /// Stop every handle, or every handle in one category
    pub async fn stop_all(&self, category: Option<Category>) {
        let ids: Vec<Uuid> = {
            let handles = self.handles.read().await;
            handles
                .iter()
                .filter(|(_, entry)| {
                    category.map_or(true, |c| entry.descriptor.category == c)
                })
                .map(|(id, _)| *id)
                .collect()
        };
        for id in ids {
            self.stop(id).await;
        }
    }

    /// Pause a playing handle; no-op in any other state
    pub async fn pause(&self, handle_id: Uuid) {
        {
            let mut handles = self.handles.write().await;
            let Some(entry) = handles.get_mut(&handle_id) else {
                return;
            };
            if entry.state() != HandleState::Playing {
                return;
            }
            let Some(voice) = entry.voice.clone() else {
                return;
            };
            voice.pause();
            entry.state_tx.send_replace(HandleState::Paused);
            entry.fading_in = false;
        }
        debug!(handle = %handle_id, "paused");
        self.emit(PlaybackEvent::SoundPaused {
            handle_id,
            timestamp: Utc::now(),
        });
    }

    /// Resume a paused handle; no-op in any other state
    ///
    /// Resuming restores the full effective gain, abandoning whatever
    /// remained of an interrupted fade-in.
    pub async fn resume(&self, handle_id: Uuid) {
        let resumed = {
            let mut handles = self.handles.write().await;
            let Some(entry) = handles.get_mut(&handle_id) else {
                return;
            };
            if entry.state() != HandleState::Paused {
                return;
            }
            let Some(voice) = entry.voice.clone() else {
                return;
            };
            voice.resume();
            entry.state_tx.send_replace(HandleState::Playing);
            (voice, Arc::clone(&entry.descriptor))
        };

        let (voice, descriptor) = resumed;
        voice.set_gain(self.volumes.effective(&descriptor).await);
        debug!(handle = %handle_id, "resumed");
        self.emit(PlaybackEvent::SoundResumed {
            handle_id,
            timestamp: Utc::now(),
        });
    }

    /// Await a handle's terminal state
    ///
    /// Returns immediately for unknown (already released) handles. This
    /// is the explicit "wait for sound end" contract; every other
    /// operation is fire-and-forget.
    pub async fn wait_stopped(&self, handle_id: Uuid) {
        let mut state_rx = {
            let handles = self.handles.read().await;
            match handles.get(&handle_id) {
                Some(entry) => entry.state_tx.subscribe(),
                None => return,
            }
        };

        loop {
            if *state_rx.borrow_and_update() == HandleState::Stopped {
                return;
            }
            if state_rx.changed().await.is_err() {
                // Sender dropped after releasing the handle.
                return;
            }
        }
    }

    // ========================================
    // Volume policy
    // ========================================

    /// Set the master volume (clamped to 0.0 - 1.0)
    ///
    /// Applies retroactively: live handles are re-gained immediately,
    /// and running fades pick up the new target on their next tick.
    pub async fn set_master_volume(&self, level: f32) {
        self.volumes.set_master(level).await;
        self.reapply_gains(None).await;
        self.emit(PlaybackEvent::MasterVolumeChanged {
            volume: self.volumes.master().await,
            timestamp: Utc::now(),
        });
    }

    /// Set a category volume override (clamped to 0.0 - 1.0)
    ///
    /// Retroactive, like [`set_master_volume`](Self::set_master_volume).
    pub async fn set_category_volume(&self, category: Category, level: f32) {
        self.volumes.set_category(category, level).await;
        self.reapply_gains(Some(category)).await;
        self.emit(PlaybackEvent::CategoryVolumeChanged {
            category,
            volume: self.volumes.category(category).await,
            timestamp: Utc::now(),
        });
    }

    /// Mute or unmute every handle in the session
    pub async fn set_muted(&self, muted: bool) {
        self.volumes.set_muted(muted).await;
        self.reapply_gains(None).await;
        self.emit(PlaybackEvent::MuteChanged {
            muted,
            timestamp: Utc::now(),
        });
    }

    pub async fn master_volume(&self) -> f32 {
        self.volumes.master().await
    }

    pub async fn category_volume(&self, category: Category) -> f32 {
        self.volumes.category(category).await
    }

    pub async fn muted(&self) -> bool {
        self.volumes.muted().await
    }

    // ========================================
    // Introspection
    // ========================================

    /// Current state of a handle; None once it has been released
    pub async fn handle_state(&self, handle_id: Uuid) -> Option<HandleState> {
        let handles = self.handles.read().await;
        handles.get(&handle_id).map(HandleEntry::state)
    }

    /// Snapshot of every active handle
    pub async fn active_handles(&self) -> Vec<HandleInfo> {
        let handles = self.handles.read().await;
        handles
            .iter()
            .map(|(id, entry)| HandleInfo {
                handle_id: *id,
                category: entry.descriptor.category,
                key: entry.descriptor.key.clone(),
                state: entry.state(),
                started_at: entry.started_at,
            })
            .collect()
    }

    /// Subscribe to the playback event stream
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.event_tx.subscribe()
    }

    // ========================================
    // Internals
    // ========================================

    fn emit(&self, event: PlaybackEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.event_tx.send(event);
    }

    async fn find_active(&self, category: Category, key: &str) -> Option<Uuid> {
        let handles = self.handles.read().await;
        handles.iter().find_map(|(id, entry)| {
            (entry.descriptor.category == category
                && entry.descriptor.key == key
                && entry.state() != HandleState::Stopped)
                .then_some(*id)
        })
    }

    async fn insert_handle(&self, handle_id: Uuid, descriptor: Arc<SoundDescriptor>) {
        let (state_tx, _) = watch::channel(HandleState::Loading);
        self.handles.write().await.insert(
            handle_id,
            HandleEntry {
                descriptor,
                state_tx,
                voice: None,
                started_at: None,
                fading_in: false,
            },
        );
    }

    /// Fetch the sound bytes and start the voice for a Loading handle
    ///
    /// The handle may be stopped while the load is in flight; the start
    /// path observes the missing entry once the load settles and never
    /// begins playback.
    async fn load_and_start(&self, handle_id: Uuid, descriptor: Arc<SoundDescriptor>) -> Result<()> {
        let bytes = match self.cache.fetch(&descriptor).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.handles.write().await.remove(&handle_id);
                warn!(handle = %handle_id, error = %e, "resource load failed");
                self.emit(PlaybackEvent::PlaybackFailed {
                    handle_id,
                    category: descriptor.category,
                    key: descriptor.key.clone(),
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                return Err(e);
            }
        };

        // Gain is computed before taking the handle lock; volume locks
        // are never held across handle-map acquisition.
        let full_gain = self.volumes.effective(&descriptor).await;
        let initial_gain = if descriptor.fade_in_ms > 0 { 0.0 } else { full_gain };

        let mut handles = self.handles.write().await;
        let Some(entry) = handles.get_mut(&handle_id) else {
            debug!(handle = %handle_id, "cancelled during load");
            return Ok(());
        };

        let voice: Arc<dyn Voice> = match self.backend.start(bytes, initial_gain, descriptor.looped)
        {
            Ok(voice) => Arc::from(voice),
            Err(e) => {
                entry.state_tx.send_replace(HandleState::Stopped);
                handles.remove(&handle_id);
                drop(handles);
                warn!(handle = %handle_id, error = %e, "backend start failed");
                self.emit(PlaybackEvent::PlaybackFailed {
                    handle_id,
                    category: descriptor.category,
                    key: descriptor.key.clone(),
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                return Err(e);
            }
        };

        entry.voice = Some(voice);
        entry.started_at = Some(Utc::now());
        entry.fading_in = descriptor.fade_in_ms > 0;
        entry.state_tx.send_replace(HandleState::Playing);
        drop(handles);

        info!(category = %descriptor.category, key = %descriptor.key, handle = %handle_id, "sound started");
        self.emit(PlaybackEvent::SoundStarted {
            handle_id,
            category: descriptor.category,
            key: descriptor.key.clone(),
            timestamp: Utc::now(),
        });

        if descriptor.fade_in_ms > 0 {
            self.spawn_fade_in(handle_id, descriptor);
        }
        Ok(())
    }

    /// Release a handle immediately, bypassing any configured fade-out
    async fn cut(&self, handle_id: Uuid, completed: bool) {
        let removed = self.handles.write().await.remove(&handle_id);
        let Some(entry) = removed else { return };

        entry.state_tx.send_replace(HandleState::Stopped);
        if let Some(voice) = &entry.voice {
            voice.stop();
        }
        self.pending
            .lock()
            .await
            .retain(|queued| queued.handle_id != handle_id);

        debug!(handle = %handle_id, completed, "handle released");
        self.emit(PlaybackEvent::SoundStopped {
            handle_id,
            category: entry.descriptor.category,
            key: entry.descriptor.key.clone(),
            completed,
            timestamp: Utc::now(),
        });
    }

    /// Apply current effective gains to live voices
    ///
    /// Fading handles are skipped; their ramps multiply by the live
    /// effective volume on every tick anyway.
    async fn reapply_gains(&self, category: Option<Category>) {
        let targets: Vec<(Arc<dyn Voice>, Arc<SoundDescriptor>)> = {
            let handles = self.handles.read().await;
            handles
                .values()
                .filter(|entry| category.map_or(true, |c| entry.descriptor.category == c))
                .filter(|entry| {
                    matches!(entry.state(), HandleState::Playing | HandleState::Paused)
                        && !entry.fading_in
                })
                .filter_map(|entry| {
                    entry
                        .voice
                        .clone()
                        .map(|voice| (voice, Arc::clone(&entry.descriptor)))
                })
                .collect()
        };

        for (voice, descriptor) in targets {
            voice.set_gain(self.volumes.effective(&descriptor).await);
        }
    }

    fn spawn_fade_in(&self, handle_id: Uuid, descriptor: Arc<SoundDescriptor>) {
        let session = self.clone();
        tokio::spawn(async move {
            let ramp = FadeRamp::new(
                descriptor.fade_in_curve,
                Duration::from_millis(descriptor.fade_in_ms),
                FadeDirection::In,
            );
            let began = Instant::now();
            let mut tick = interval(FADE_TICK);

            loop {
                tick.tick().await;
                let elapsed = began.elapsed();
                let target = session.volumes.effective(&descriptor).await;

                let voice = {
                    let handles = session.handles.read().await;
                    match handles.get(&handle_id) {
                        Some(entry) if entry.state() == HandleState::Playing && entry.fading_in => {
                            entry.voice.clone()
                        }
                        _ => None,
                    }
                };
                let Some(voice) = voice else { break };

                if ramp.is_complete(elapsed) {
                    voice.set_gain(target);
                    break;
                }
                voice.set_gain(ramp.gain_at(elapsed) * target);
            }

            // Ramp finished or was abandoned; hand gain control back.
            let mut handles = session.handles.write().await;
            if let Some(entry) = handles.get_mut(&handle_id) {
                entry.fading_in = false;
            }
        });
    }

    fn spawn_fade_out(&self, handle_id: Uuid, descriptor: Arc<SoundDescriptor>) {
        let session = self.clone();
        tokio::spawn(async move {
            let ramp = FadeRamp::new(
                descriptor.fade_out_curve,
                Duration::from_millis(descriptor.fade_out_ms),
                FadeDirection::Out,
            );
            let began = Instant::now();
            let mut tick = interval(FADE_TICK);

            loop {
                tick.tick().await;
                let elapsed = began.elapsed();
                let target = session.volumes.effective(&descriptor).await;

                let voice = {
                    let handles = session.handles.read().await;
                    match handles.get(&handle_id) {
                        Some(entry) if entry.state() == HandleState::FadingOut => {
                            entry.voice.clone()
                        }
                        _ => None,
                    }
                };
                // Cut concurrently; nothing left to ramp.
                let Some(voice) = voice else { return };

                if ramp.is_complete(elapsed) {
                    break;
                }
                voice.set_gain(ramp.gain_at(elapsed) * target);
            }

            session.cut(handle_id, false).await;
        });
    }

    /// Reap voices that played to their natural end
    async fn completion_sweep_loop(&self) {
        let mut tick = interval(SWEEP_INTERVAL);
        loop {
            tick.tick().await;

            if !*self.running.read().await {
                debug!("completion sweep stopping");
                break;
            }

            let finished: Vec<Uuid> = {
                let handles = self.handles.read().await;
                handles
                    .iter()
                    .filter(|(_, entry)| {
                        entry.state() == HandleState::Playing
                            && !entry.descriptor.looped
                            && entry
                                .voice
                                .as_ref()
                                .is_some_and(|voice| voice.is_finished())
                    })
                    .map(|(id, _)| *id)
                    .collect()
            };

            for id in finished {
                debug!(handle = %id, "sound finished");
                self.cut(id, true).await;
            }
        }
    }
}
