use crate::avatar::colors::AvatarColors;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use directories::ProjectDirs;
use serde::{Serialize, Deserialize};

const SETTINGS_FILE: &str = "composer.toml";

// =============================================================================
// Composer Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceProfile {
    Low,      // Resource-constrained targets, loads one asset at a time
    Balanced, // Default for desktop browsers and mid-range systems
    High,     // Many parallel fetches, full-size textures
    Custom,   // User-defined granular controls
}

impl Default for PerformanceProfile {
    fn default() -> Self {
        Self::Balanced
    }
}

/// Texture import options handed to the model importer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureSettings {
    pub mipmaps: bool,
    pub max_size: u32,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            mipmaps: true,
            max_size: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerSettings {
    pub profile: PerformanceProfile,
    /// Base URL of the content server (entities + content files)
    pub content_server: String,
    pub request_timeout_ms: u64,
    /// Load assets strictly one after the other instead of concurrently
    pub sequential_loading: bool,
    pub max_concurrent_loads: usize,
    /// Yield once to the runtime after each commit so a crossfade can start
    pub yield_after_commit: bool,
    pub texture: TextureSettings,
    pub default_colors: AvatarColors,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            profile: PerformanceProfile::default(),
            content_server: "https://peer.decentraland.org".to_string(),
            request_timeout_ms: 30_000,
            sequential_loading: false,
            max_concurrent_loads: 8,
            texture: TextureSettings::default(),
            yield_after_commit: false,
            default_colors: AvatarColors::default(),
        }
    }
}

impl ComposerSettings {
    pub fn for_profile(profile: PerformanceProfile) -> Self {
        let base = Self::default();
        let (sequential_loading, max_concurrent_loads, texture) = match profile {
            PerformanceProfile::Low => (
                true,
                1,
                TextureSettings { mipmaps: false, max_size: 512 },
            ),
            PerformanceProfile::Balanced => (
                false,
                8,
                TextureSettings { mipmaps: true, max_size: 1024 },
            ),
            PerformanceProfile::High => (
                false,
                16,
                TextureSettings { mipmaps: true, max_size: 2048 },
            ),
            PerformanceProfile::Custom => {
                // For custom, return defaults that user can modify
                (base.sequential_loading, base.max_concurrent_loads, base.texture)
            }
        };

        Self {
            profile,
            sequential_loading,
            max_concurrent_loads,
            texture,
            yield_after_commit: profile != PerformanceProfile::Low,
            ..base
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "avatar-composer", "avatar-composer")
        .map(|proj| proj.config_dir().join(SETTINGS_FILE))
}

pub fn save_settings(settings: &ComposerSettings) -> std::io::Result<()> {
    if let Some(path) = settings_path() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(settings)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, toml)?;
    }
    Ok(())
}

pub fn load_settings() -> Option<ComposerSettings> {
    let path = settings_path()?;
    let data = fs::read_to_string(path).ok()?;
    parse_settings(&data)
}

/// Parse settings from TOML text, missing keys fall back to defaults
pub fn parse_settings(data: &str) -> Option<ComposerSettings> {
    match toml::from_str::<ComposerSettings>(data) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!("⚠️ Ignoring malformed settings file: {}", e);
            None
        }
    }
}
