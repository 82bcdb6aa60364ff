//! Sound categories and descriptors

use crate::fade_curves::FadeCurve;
use serde::{Deserialize, Serialize};

/// Sound effect categories
///
/// Mirrors the layout of the asset collection: every category is one
/// folder of sound files, and keys are unique within their category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ambience,
    Attacks,
    Freeze,
    Kernel,
    Lockdown,
    Pain,
}

impl Category {
    /// Parse a category from its lowercase name
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ambience" => Some(Category::Ambience),
            "attacks" => Some(Category::Attacks),
            "freeze" => Some(Category::Freeze),
            "kernel" => Some(Category::Kernel),
            "lockdown" => Some(Category::Lockdown),
            "pain" => Some(Category::Pain),
            _ => None,
        }
    }

    /// Canonical lowercase name (also the asset folder name)
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ambience => "ambience",
            Category::Attacks => "attacks",
            Category::Freeze => "freeze",
            Category::Kernel => "kernel",
            Category::Lockdown => "lockdown",
            Category::Pain => "pain",
        }
    }

    /// All category variants
    pub fn all_variants() -> &'static [Category] {
        &[
            Category::Ambience,
            Category::Attacks,
            Category::Freeze,
            Category::Kernel,
            Category::Lockdown,
            Category::Pain,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Category::from_str(s)
            .ok_or_else(|| crate::error::Error::Config(format!("unknown category '{s}'")))
    }
}

/// Immutable description of one registered sound
///
/// Resolved from the registry by (category, key). `resource_path` is
/// relative to the asset collection root and owned by the asset store;
/// everything else is default playback policy for the sound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundDescriptor {
    pub category: Category,

    /// Identifier unique within the category
    pub key: String,

    /// Resource locator understood by the asset store
    pub resource_path: String,

    /// Default playback volume (0.0 - 1.0)
    pub default_volume: f32,

    /// Loop until explicitly stopped
    pub looped: bool,

    /// Allow several live instances of this sound at once, bypassing the
    /// anti-overlap policy
    pub allow_overlap: bool,

    /// Fade-in duration at playback start; 0 starts at full gain
    pub fade_in_ms: u64,

    /// Fade-out duration applied by stop; 0 cuts immediately
    pub fade_out_ms: u64,

    pub fade_in_curve: FadeCurve,
    pub fade_out_curve: FadeCurve,
}

impl SoundDescriptor {
    /// Descriptor with neutral defaults: full volume, one-shot, no
    /// overlap, no fades.
    pub fn new(
        category: Category,
        key: impl Into<String>,
        resource_path: impl Into<String>,
    ) -> Self {
        Self {
            category,
            key: key.into(),
            resource_path: resource_path.into(),
            default_volume: 1.0,
            looped: false,
            allow_overlap: false,
            fade_in_ms: 0,
            fade_out_ms: 0,
            fade_in_curve: FadeCurve::Exponential,
            fade_out_curve: FadeCurve::Logarithmic,
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.default_volume = volume;
        self
    }

    pub fn with_looping(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn with_overlap(mut self, allow_overlap: bool) -> Self {
        self.allow_overlap = allow_overlap;
        self
    }

    pub fn with_fade_in_ms(mut self, fade_in_ms: u64) -> Self {
        self.fade_in_ms = fade_in_ms;
        self
    }

    pub fn with_fade_out_ms(mut self, fade_out_ms: u64) -> Self {
        self.fade_out_ms = fade_out_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for category in Category::all_variants() {
            let parsed = Category::from_str(category.as_str()).unwrap();
            assert_eq!(*category, parsed, "Round-trip failed for {:?}", category);
        }
    }

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!(Category::from_str("PAIN"), Some(Category::Pain));
        assert_eq!(Category::from_str("Ambience"), Some(Category::Ambience));
        assert_eq!(Category::from_str("reverb"), None);
        assert_eq!(Category::from_str(""), None);
    }

    #[test]
    fn test_category_serde_lowercase() {
        let json = serde_json::to_string(&Category::Lockdown).unwrap();
        assert_eq!(json, "\"lockdown\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::Lockdown);
    }

    #[test]
    fn test_descriptor_defaults() {
        let descriptor = SoundDescriptor::new(Category::Pain, "hit1", "pain/hit1.mp3");
        assert_eq!(descriptor.default_volume, 1.0);
        assert!(!descriptor.looped);
        assert!(!descriptor.allow_overlap);
        assert_eq!(descriptor.fade_in_ms, 0);
        assert_eq!(descriptor.fade_out_ms, 0);
    }

    #[test]
    fn test_descriptor_builders() {
        let descriptor = SoundDescriptor::new(Category::Ambience, "wind", "ambience/wind.ogg")
            .with_volume(0.6)
            .with_looping(true)
            .with_fade_in_ms(1200)
            .with_fade_out_ms(800);
        assert_eq!(descriptor.default_volume, 0.6);
        assert!(descriptor.looped);
        assert_eq!(descriptor.fade_in_ms, 1200);
        assert_eq!(descriptor.fade_out_ms, 800);
    }
}
