use avatar_composer::avatar::Color;
use avatar_composer::config::{parse_settings, ComposerSettings, PerformanceProfile, TextureSettings};
use std::time::Duration;

#[tokio::test]
async fn test_performance_profiles() {
    for profile in [PerformanceProfile::Low, PerformanceProfile::Balanced, PerformanceProfile::High] {
        let settings = ComposerSettings::for_profile(profile);

        assert_eq!(settings.profile, profile);
        assert!(settings.max_concurrent_loads > 0);
        assert!(settings.texture.max_size > 0);

        match profile {
            PerformanceProfile::Low => {
                assert!(settings.sequential_loading);
                assert_eq!(settings.texture, TextureSettings { mipmaps: false, max_size: 512 });
            }
            PerformanceProfile::Balanced => {
                assert!(!settings.sequential_loading);
                assert_eq!(settings.max_concurrent_loads, 8);
                assert!(settings.yield_after_commit);
            }
            PerformanceProfile::High => {
                assert_eq!(settings.max_concurrent_loads, 16);
                assert_eq!(settings.texture.max_size, 2048);
            }
            _ => {}
        }
    }
}

#[tokio::test]
async fn test_custom_profile_keeps_defaults() {
    let custom = ComposerSettings::for_profile(PerformanceProfile::Custom);
    let defaults = ComposerSettings::default();

    assert_eq!(custom.sequential_loading, defaults.sequential_loading);
    assert_eq!(custom.max_concurrent_loads, defaults.max_concurrent_loads);
    assert_eq!(custom.texture, defaults.texture);
    assert_eq!(custom.content_server, defaults.content_server);
}

#[tokio::test]
async fn test_settings_serialization() {
    let mut settings = ComposerSettings::for_profile(PerformanceProfile::High);
    settings.content_server = "https://content.example.org".to_string();
    settings.default_colors.hair = "#112233".parse::<Color>().unwrap();

    let toml_str = toml::to_string_pretty(&settings).expect("Failed to serialize settings");
    assert!(toml_str.contains("hair = \"#112233\""));

    let parsed = parse_settings(&toml_str).expect("Failed to parse settings");
    assert_eq!(parsed.profile, PerformanceProfile::High);
    assert_eq!(parsed.content_server, settings.content_server);
    assert_eq!(parsed.max_concurrent_loads, settings.max_concurrent_loads);
    assert_eq!(parsed.texture, settings.texture);
    assert_eq!(parsed.default_colors.hair.to_string(), "#112233");
}

#[tokio::test]
async fn test_request_timeout() {
    let settings = parse_settings("request_timeout_ms = 1500").unwrap();
    assert_eq!(settings.request_timeout(), Duration::from_millis(1500));
    assert_eq!(settings.profile, PerformanceProfile::Balanced);
}
