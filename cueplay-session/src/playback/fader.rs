//! Timer-driven gain ramps
//!
//! Fades are scheduled volume updates, not sample processing: a task
//! ticks every [`FADE_TICK`] and sets the voice gain to the ramp
//! multiplier times the live effective volume, so volume changes land
//! mid-fade.

use cueplay_common::FadeCurve;
use std::time::Duration;

/// Gain update interval for fade tasks
pub const FADE_TICK: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    In,
    Out,
}

/// One fade ramp: curve, duration, direction
#[derive(Debug, Clone, Copy)]
pub struct FadeRamp {
    curve: FadeCurve,
    duration: Duration,
    direction: FadeDirection,
}

impl FadeRamp {
    pub fn new(curve: FadeCurve, duration: Duration, direction: FadeDirection) -> Self {
        Self {
            curve,
            duration,
            direction,
        }
    }

    /// Ramp multiplier for the elapsed time since the fade began
    ///
    /// A zero-duration ramp is already at its end state.
    pub fn gain_at(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return match self.direction {
                FadeDirection::In => 1.0,
                FadeDirection::Out => 0.0,
            };
        }
        let progress = (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0);
        match self.direction {
            FadeDirection::In => self.curve.fade_in_gain(progress),
            FadeDirection::Out => self.curve.fade_out_gain(progress),
        }
    }

    pub fn is_complete(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}
