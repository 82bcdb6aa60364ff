//! Fade curve definitions and calculations
//!
//! Provides the gain multiplier formulas for timer-driven fade-in and
//! fade-out ramps. Curves differ in perceptual quality:
//! - Linear: constant rate of change (precise, predictable)
//! - Exponential: slow start, fast finish (natural-sounding fade-in)
//! - Logarithmic: fast start, slow finish (natural-sounding fade-out)
//! - SCurve: smooth acceleration and deceleration (gentle)
//! - EqualPower: constant perceived loudness

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Fade curve types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeCurve {
    /// Linear: v(t) = t
    Linear,

    /// Exponential: v(t) = t²
    /// Slow start, fast finish
    Exponential,

    /// Logarithmic: v(t) = (1-t)² (for fade-out)
    /// Fast start, slow finish
    Logarithmic,

    /// S-Curve: v(t) = 0.5 × (1 - cos(π × t))
    /// Smooth acceleration and deceleration
    SCurve,

    /// Equal-Power: v(t) = sin(t × π/2)
    /// Constant perceived loudness
    EqualPower,
}

impl FadeCurve {
    /// Gain multiplier at the given position through a fade-in
    ///
    /// `position` is normalized fade progress, 0.0 (start) to 1.0 (end).
    /// Returns 0.0 (silence) rising to 1.0 (full gain).
    pub fn fade_in_gain(&self, position: f32) -> f32 {
        let t = position.clamp(0.0, 1.0);

        match self {
            FadeCurve::Linear => t,
            FadeCurve::Exponential => t * t,
            FadeCurve::Logarithmic => {
                // Logarithmic is a fade-out shape; inverted with sqrt
                // when requested for a fade-in.
                t.sqrt()
            }
            FadeCurve::SCurve => 0.5 * (1.0 - (std::f32::consts::PI * t).cos()),
            FadeCurve::EqualPower => (t * FRAC_PI_2).sin(),
        }
    }

    /// Gain multiplier at the given position through a fade-out
    ///
    /// `position` is normalized fade progress, 0.0 (start) to 1.0 (end).
    /// Returns 1.0 (full gain) falling to 0.0 (silence).
    pub fn fade_out_gain(&self, position: f32) -> f32 {
        let t = position.clamp(0.0, 1.0);

        match self {
            FadeCurve::Linear => 1.0 - t,
            FadeCurve::Exponential => {
                let inv = 1.0 - t;
                inv * inv
            }
            FadeCurve::Logarithmic => {
                let inv = 1.0 - t;
                inv * inv
            }
            FadeCurve::SCurve => 0.5 * (1.0 + (std::f32::consts::PI * t).cos()),
            FadeCurve::EqualPower => (t * FRAC_PI_2).cos(),
        }
    }

    /// Parse a curve from its manifest string
    ///
    /// Accepts 'linear', 'exponential', 'logarithmic', 'cosine' (alias
    /// for the S-curve), 's_curve'/'scurve'/'s-curve', and
    /// 'equal_power'/'equalpower'.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Some(FadeCurve::Linear),
            "exponential" => Some(FadeCurve::Exponential),
            "logarithmic" => Some(FadeCurve::Logarithmic),
            "cosine" | "scurve" | "s-curve" | "s_curve" => Some(FadeCurve::SCurve),
            "equal_power" | "equalpower" => Some(FadeCurve::EqualPower),
            _ => None,
        }
    }

    /// Canonical manifest string
    pub fn as_str(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "linear",
            FadeCurve::Exponential => "exponential",
            FadeCurve::Logarithmic => "logarithmic",
            FadeCurve::SCurve => "cosine",
            FadeCurve::EqualPower => "equal_power",
        }
    }

    /// All fade curve variants
    pub fn all_variants() -> &'static [FadeCurve] {
        &[
            FadeCurve::Linear,
            FadeCurve::Exponential,
            FadeCurve::Logarithmic,
            FadeCurve::SCurve,
            FadeCurve::EqualPower,
        ]
    }
}

impl Default for FadeCurve {
    /// Default is Exponential (natural-sounding fade-in)
    fn default() -> Self {
        FadeCurve::Exponential
    }
}

impl std::fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
