//! Sound manifest loading
//!
//! Cueplay is configured with a single TOML manifest describing every
//! registered sound. The manifest is bootstrap configuration: loaded
//! once at startup, fatal on error, never reloaded at runtime.
//!
//! ```toml
//! asset_root = "assets/sfx"
//!
//! [[sounds]]
//! category = "ambience"
//! key = "wind"
//! path = "ambience/wind.ogg"
//! volume = 0.6
//! loop = true
//! fade_in_ms = 1200
//! fade_out_ms = 800
//! fade_out_curve = "logarithmic"
//! ```

use crate::error::{Error, Result};
use crate::fade_curves::FadeCurve;
use crate::registry::SoundRegistry;
use crate::sound::{Category, SoundDescriptor};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Top-level manifest file contents
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryManifest {
    /// Root of the sound asset collection; `path` entries are resolved
    /// against it by the asset store.
    #[serde(default)]
    pub asset_root: Option<PathBuf>,

    /// Registered sounds
    #[serde(default)]
    pub sounds: Vec<SoundEntry>,
}

/// One `[[sounds]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct SoundEntry {
    pub category: Category,
    pub key: String,
    pub path: String,

    /// Default playback volume (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,

    #[serde(default, rename = "loop")]
    pub looped: bool,

    #[serde(default, rename = "overlap")]
    pub allow_overlap: bool,

    #[serde(default)]
    pub fade_in_ms: u64,

    #[serde(default)]
    pub fade_out_ms: u64,

    /// Curve name; defaults to exponential when absent
    #[serde(default)]
    pub fade_in_curve: Option<String>,

    /// Curve name; defaults to logarithmic when absent
    #[serde(default)]
    pub fade_out_curve: Option<String>,
}

fn default_volume() -> f32 {
    1.0
}

impl RegistryManifest {
    /// Load and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Build a registry from the manifest entries
    ///
    /// Validation failures and duplicate keys abort: a bad manifest is
    /// fatal to startup.
    pub fn build_registry(&self) -> Result<SoundRegistry> {
        let mut registry = SoundRegistry::new();
        for entry in &self.sounds {
            registry.register(entry.to_descriptor()?)?;
        }
        info!(sounds = registry.len(), "sound registry built from manifest");
        Ok(registry)
    }
}

impl SoundEntry {
    fn to_descriptor(&self) -> Result<SoundDescriptor> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(Error::Config(format!(
                "volume {} out of range for {}/{}",
                self.volume, self.category, self.key
            )));
        }

        Ok(SoundDescriptor {
            category: self.category,
            key: self.key.clone(),
            resource_path: self.path.clone(),
            default_volume: self.volume,
            looped: self.looped,
            allow_overlap: self.allow_overlap,
            fade_in_ms: self.fade_in_ms,
            fade_out_ms: self.fade_out_ms,
            fade_in_curve: parse_curve(
                self.fade_in_curve.as_deref(),
                FadeCurve::Exponential,
                self.category,
                &self.key,
            )?,
            fade_out_curve: parse_curve(
                self.fade_out_curve.as_deref(),
                FadeCurve::Logarithmic,
                self.category,
                &self.key,
            )?,
        })
    }
}

fn parse_curve(
    raw: Option<&str>,
    default: FadeCurve,
    category: Category,
    key: &str,
) -> Result<FadeCurve> {
    match raw {
        None => Ok(default),
        Some(name) => FadeCurve::from_str(name).ok_or_else(|| {
            Error::Config(format!("unknown fade curve '{name}' for {category}/{key}"))
        }),
    }
}
