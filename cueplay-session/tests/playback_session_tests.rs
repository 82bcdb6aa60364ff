//! Core playback session behavior
//!
//! Covers the play/stop/pause lifecycle, the anti-overlap contract, and
//! the completion sweep against the mock backend.

mod helpers;

use cueplay_common::events::PlaybackEvent;
use cueplay_common::Category;
use cueplay_session::{Error, HandleState, PlayOptions};
use helpers::{test_session, unlocked_session};
use std::time::Duration;
use uuid::Uuid;

// ============================================================================
// Locking and basic lifecycle
// ============================================================================

/// Given a locked session, When play is called without queueing,
/// Then it fails fast with AudioLocked and touches no state.
#[tokio::test]
async fn test_play_while_locked_fails_fast() {
    let fixture = test_session();

    let result = fixture
        .session
        .play(Category::Pain, "hit1", PlayOptions::default())
        .await;

    assert!(matches!(result, Err(Error::AudioLocked)));
    assert!(fixture.session.active_handles().await.is_empty());
    assert_eq!(fixture.backend.voice_count(), 0);
}

/// Given an unlocked session, When a registered sound is played,
/// Then a Playing handle exists and a voice was started at the
/// descriptor's effective gain.
#[tokio::test]
async fn test_unlock_then_play_succeeds() {
    let fixture = unlocked_session().await;

    let handle = fixture
        .session
        .play(Category::Pain, "hit1", PlayOptions::default())
        .await
        .expect("play should succeed after unlock");

    assert_eq!(
        fixture.session.handle_state(handle).await,
        Some(HandleState::Playing)
    );
    assert_eq!(fixture.backend.voice_count(), 1);
    let gain = fixture.backend.voice(0).gain();
    assert!((gain - 0.8).abs() < 1e-6, "expected descriptor gain, got {gain}");
}

#[tokio::test]
async fn test_unknown_sound_is_immediate_error() {
    let fixture = unlocked_session().await;

    let result = fixture
        .session
        .play(Category::Pain, "nope", PlayOptions::default())
        .await;

    assert!(matches!(
        result,
        Err(Error::UnknownSound { category: Category::Pain, ref key }) if key == "nope"
    ));
}

// ============================================================================
// Anti-overlap
// ============================================================================

/// Given an active handle, When the same sound is played again with the
/// default Restart policy, Then exactly one handle remains and the old
/// voice was stopped.
#[tokio::test]
async fn test_anti_overlap_restart() {
    let fixture = unlocked_session().await;

    let first = fixture
        .session
        .play(Category::Pain, "hit1", PlayOptions::default())
        .await
        .unwrap();
    let second = fixture
        .session
        .play(Category::Pain, "hit1", PlayOptions::default())
        .await
        .unwrap();

    assert_ne!(first, second);
    assert!(fixture.session.handle_state(first).await.is_none());
    assert_eq!(
        fixture.session.handle_state(second).await,
        Some(HandleState::Playing)
    );
    assert_eq!(fixture.session.active_handles().await.len(), 1);
    assert!(fixture.backend.voice(0).is_stopped());
    assert!(!fixture.backend.voice(1).is_stopped());
}

/// Given an active handle, When the same sound is played with the Ignore
/// policy, Then the existing handle id is returned and no new voice
/// starts.
#[tokio::test]
async fn test_anti_overlap_ignore() {
    let fixture = unlocked_session().await;

    let first = fixture
        .session
        .play(Category::Pain, "hit1", PlayOptions::default())
        .await
        .unwrap();
    let second = fixture
        .session
        .play(Category::Pain, "hit1", PlayOptions::keep_existing())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(fixture.backend.voice_count(), 1);
    assert_eq!(fixture.session.active_handles().await.len(), 1);
}

/// Descriptors that allow overlap bypass the policy entirely.
#[tokio::test]
async fn test_overlap_allowed_by_descriptor() {
    let fixture = unlocked_session().await;

    let first = fixture
        .session
        .play(Category::Attacks, "slash", PlayOptions::default())
        .await
        .unwrap();
    let second = fixture
        .session
        .play(Category::Attacks, "slash", PlayOptions::default())
        .await
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(fixture.backend.voice_count(), 2);
    assert_eq!(fixture.session.active_handles().await.len(), 2);
}

// ============================================================================
// Stop semantics
// ============================================================================

/// stop is idempotent: a second call on a released handle is a silent
/// no-op, as is stopping a handle that never existed.
#[tokio::test]
async fn test_stop_idempotent() {
    let fixture = unlocked_session().await;

    let handle = fixture
        .session
        .play(Category::Lockdown, "slam", PlayOptions::default())
        .await
        .unwrap();

    fixture.session.stop(handle).await;
    assert!(fixture.session.handle_state(handle).await.is_none());
    assert!(fixture.backend.voice(0).is_stopped());

    // Second stop and stop of a random handle: no error, no panic.
    fixture.session.stop(handle).await;
    fixture.session.stop(Uuid::new_v4()).await;
}

/// A looping sound without a fade-out is released immediately on stop
/// and never re-enters Playing.
#[tokio::test]
async fn test_stop_releases_looping_sound() {
    let fixture = unlocked_session().await;

    let handle = fixture
        .session
        .play(Category::Ambience, "hum", PlayOptions::default())
        .await
        .unwrap();
    assert_eq!(
        fixture.session.handle_state(handle).await,
        Some(HandleState::Playing)
    );

    fixture.session.stop(handle).await;
    assert!(fixture.session.handle_state(handle).await.is_none());
    assert!(fixture.backend.voice(0).is_stopped());
}

#[tokio::test]
async fn test_stop_all_by_category() {
    let fixture = unlocked_session().await;

    let hum = fixture
        .session
        .play(Category::Ambience, "hum", PlayOptions::default())
        .await
        .unwrap();
    let slam = fixture
        .session
        .play(Category::Lockdown, "slam", PlayOptions::default())
        .await
        .unwrap();

    fixture.session.stop_all(Some(Category::Ambience)).await;
    assert!(fixture.session.handle_state(hum).await.is_none());
    assert_eq!(
        fixture.session.handle_state(slam).await,
        Some(HandleState::Playing)
    );

    fixture.session.stop_all(None).await;
    assert!(fixture.session.active_handles().await.is_empty());
}

// ============================================================================
// Pause / resume
// ============================================================================

#[tokio::test]
async fn test_pause_resume_cycle() {
    let fixture = unlocked_session().await;

    let handle = fixture
        .session
        .play(Category::Ambience, "hum", PlayOptions::default())
        .await
        .unwrap();
    let voice = fixture.backend.voice(0);

    fixture.session.pause(handle).await;
    assert_eq!(
        fixture.session.handle_state(handle).await,
        Some(HandleState::Paused)
    );
    assert!(voice.is_paused());

    // Pausing an already paused handle is a no-op.
    fixture.session.pause(handle).await;
    assert_eq!(
        fixture.session.handle_state(handle).await,
        Some(HandleState::Paused)
    );

    fixture.session.resume(handle).await;
    assert_eq!(
        fixture.session.handle_state(handle).await,
        Some(HandleState::Playing)
    );
    assert!(!voice.is_paused());

    // Resuming a playing handle is a no-op.
    fixture.session.resume(handle).await;
    assert_eq!(
        fixture.session.handle_state(handle).await,
        Some(HandleState::Playing)
    );
}

#[tokio::test]
async fn test_pause_unknown_handle_noop() {
    let fixture = unlocked_session().await;
    fixture.session.pause(Uuid::new_v4()).await;
    fixture.session.resume(Uuid::new_v4()).await;
}

// ============================================================================
// Completion sweep and wait_stopped
// ============================================================================

/// A non-looping voice that plays to its natural end is reaped by the
/// sweep and reported as completed.
#[tokio::test]
async fn test_completion_sweep_reaps_finished_voice() {
    let fixture = unlocked_session().await;
    fixture.session.start().await;
    let mut events = fixture.session.subscribe_events();

    let handle = fixture
        .session
        .play(Category::Lockdown, "slam", PlayOptions::default())
        .await
        .unwrap();

    fixture.backend.voice(0).finish();
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(fixture.session.handle_state(handle).await.is_none());

    let mut completed = false;
    while let Ok(event) = events.try_recv() {
        if let PlaybackEvent::SoundStopped {
            handle_id,
            completed: done,
            ..
        } = event
        {
            if handle_id == handle {
                completed = done;
            }
        }
    }
    assert!(completed, "sweep should report natural completion");

    fixture.session.shutdown().await;
}

#[tokio::test]
async fn test_wait_stopped_wakes_on_stop() {
    let fixture = unlocked_session().await;

    let handle = fixture
        .session
        .play(Category::Ambience, "hum", PlayOptions::default())
        .await
        .unwrap();

    let waiter = {
        let session = fixture.session.clone();
        tokio::spawn(async move { session.wait_stopped(handle).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished(), "waiter should still be parked");

    fixture.session.stop(handle).await;
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("wait_stopped should wake after stop")
        .unwrap();
}

#[tokio::test]
async fn test_wait_stopped_on_released_handle_returns() {
    let fixture = unlocked_session().await;
    // Never-issued handle: treated as already stopped.
    tokio::time::timeout(
        Duration::from_millis(100),
        fixture.session.wait_stopped(Uuid::new_v4()),
    )
    .await
    .expect("wait on unknown handle should return immediately");
}

/// Shutdown cuts every live handle.
#[tokio::test]
async fn test_shutdown_cuts_all_handles() {
    let fixture = unlocked_session().await;
    fixture.session.start().await;

    fixture
        .session
        .play(Category::Ambience, "hum", PlayOptions::default())
        .await
        .unwrap();
    fixture
        .session
        .play(Category::Pain, "hit1", PlayOptions::default())
        .await
        .unwrap();

    fixture.session.shutdown().await;
    assert!(fixture.session.active_handles().await.is_empty());
    assert!(fixture.backend.voice(0).is_stopped());
    assert!(fixture.backend.voice(1).is_stopped());
}
