pub mod settings;

// Re-export commonly used types
pub use settings::{
    ComposerSettings, PerformanceProfile, TextureSettings,
    save_settings, load_settings, parse_settings,
};
