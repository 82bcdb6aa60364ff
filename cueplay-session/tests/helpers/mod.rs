//! Shared fixtures for session integration tests
//!
//! Provides a mock backend (scripted voices, controllable unlock
//! failures) and a mock asset store (per-path failures, configurable
//! load latency) so tests can observe exactly what the session did to
//! the output device.

#![allow(dead_code)]

use cueplay_common::{Category, SoundDescriptor, SoundRegistry};
use cueplay_session::audio::{AssetStore, AudioBackend, SoundBytes, Voice};
use cueplay_session::{Error, PlaybackSession, Result, UnlockGate};
use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Observable state of one mock voice
pub struct MockVoiceState {
    pub gain: Mutex<f32>,
    pub paused: AtomicBool,
    pub stopped: AtomicBool,
    pub finished: AtomicBool,
    pub looped: bool,
}

impl MockVoiceState {
    pub fn gain(&self) -> f32 {
        *self.gain.lock().unwrap()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Simulate the voice reaching its natural end
    pub fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}

struct MockVoice(Arc<MockVoiceState>);

impl Voice for MockVoice {
    fn set_gain(&self, gain: f32) {
        *self.0.gain.lock().unwrap() = gain;
    }

    fn pause(&self) {
        self.0.paused.store(true, Ordering::SeqCst);
    }

    fn resume(&self) {
        self.0.paused.store(false, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.0.stopped.store(true, Ordering::SeqCst);
    }

    fn is_finished(&self) -> bool {
        self.0.finished.load(Ordering::SeqCst)
    }
}

/// Mock output device recording every voice it starts
pub struct MockBackend {
    pub unlock_calls: AtomicUsize,
    pub fail_unlock: AtomicBool,
    voices: Mutex<Vec<Arc<MockVoiceState>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            unlock_calls: AtomicUsize::new(0),
            fail_unlock: AtomicBool::new(false),
            voices: Mutex::new(Vec::new()),
        }
    }

    pub fn voice_count(&self) -> usize {
        self.voices.lock().unwrap().len()
    }

    pub fn voice(&self, index: usize) -> Arc<MockVoiceState> {
        Arc::clone(&self.voices.lock().unwrap()[index])
    }

    pub fn last_voice(&self) -> Arc<MockVoiceState> {
        let voices = self.voices.lock().unwrap();
        Arc::clone(voices.last().expect("no voice started"))
    }
}

impl AudioBackend for MockBackend {
    fn unlock(&self) -> Result<()> {
        if self.fail_unlock.load(Ordering::SeqCst) {
            return Err(Error::Backend("no output device".into()));
        }
        self.unlock_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn start(&self, _bytes: SoundBytes, gain: f32, looped: bool) -> Result<Box<dyn Voice>> {
        let state = Arc::new(MockVoiceState {
            gain: Mutex::new(gain),
            paused: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            looped,
        });
        self.voices.lock().unwrap().push(Arc::clone(&state));
        Ok(Box::new(MockVoice(state)))
    }
}

/// Mock asset store with per-path failures and configurable latency
pub struct MockStore {
    pub loads: AtomicUsize,
    delay: Mutex<Duration>,
    failing: Mutex<HashSet<String>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            loads: AtomicUsize::new(0),
            delay: Mutex::new(Duration::ZERO),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn fail_path(&self, resource_path: &str) {
        self.failing.lock().unwrap().insert(resource_path.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }
}

impl AssetStore for MockStore {
    fn load(&self, resource_path: &str) -> io::Result<Vec<u8>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        if self.failing.lock().unwrap().contains(resource_path) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "asset missing"));
        }
        Ok(resource_path.as_bytes().to_vec())
    }
}

/// Registry with one sound of every shape the tests need
pub fn test_registry() -> SoundRegistry {
    let mut registry = SoundRegistry::new();

    registry
        .register(SoundDescriptor::new(Category::Pain, "hit1", "pain/hit1.mp3").with_volume(0.8))
        .unwrap();
    registry
        .register(
            SoundDescriptor::new(Category::Ambience, "wind", "ambience/wind.ogg")
                .with_volume(0.6)
                .with_looping(true)
                .with_fade_in_ms(100)
                .with_fade_out_ms(120),
        )
        .unwrap();
    registry
        .register(
            SoundDescriptor::new(Category::Ambience, "hum", "ambience/hum.ogg")
                .with_looping(true),
        )
        .unwrap();
    registry
        .register(
            SoundDescriptor::new(Category::Attacks, "slash", "attacks/slash.mp3")
                .with_overlap(true),
        )
        .unwrap();
    registry
        .register(SoundDescriptor::new(Category::Kernel, "divine", "kernel/divine.ogg"))
        .unwrap();
    registry
        .register(
            SoundDescriptor::new(Category::Freeze, "shatter", "freeze/shatter.mp3")
                .with_fade_out_ms(120),
        )
        .unwrap();
    registry
        .register(SoundDescriptor::new(Category::Lockdown, "slam", "lockdown/slam.mp3"))
        .unwrap();

    registry
}

/// Session over fresh mocks
pub struct TestSession {
    pub session: PlaybackSession,
    pub backend: Arc<MockBackend>,
    pub store: Arc<MockStore>,
}

pub fn test_session() -> TestSession {
    let backend = Arc::new(MockBackend::new());
    let store = Arc::new(MockStore::new());
    let session = PlaybackSession::new(
        Arc::new(test_registry()),
        Arc::clone(&store) as Arc<dyn AssetStore>,
        Arc::clone(&backend) as Arc<dyn AudioBackend>,
        UnlockGate::new(),
    );
    TestSession {
        session,
        backend,
        store,
    }
}

/// Session that is already unlocked
pub async fn unlocked_session() -> TestSession {
    let fixture = test_session();
    fixture.session.unlock().await.expect("unlock should succeed");
    fixture
}
