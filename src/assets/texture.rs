use super::import::ImportError;
use crate::config::TextureSettings;
use crate::scene::Texture;
use bytes::Bytes;
use image::imageops::FilterType;
use tracing::debug;

/// Decode a PNG/JPEG texture to RGBA8, downscaled to the configured max size
pub fn decode_texture(name: &str, data: &[u8], settings: &TextureSettings) -> Result<Texture, ImportError> {
    let mut img = image::load_from_memory(data).map_err(|e| ImportError::Decode {
        file: name.to_string(),
        reason: e.to_string(),
    })?;

    if img.width().max(img.height()) > settings.max_size {
        debug!(
            "🖼️ Downscaling {} from {}x{} to fit {}",
            name,
            img.width(),
            img.height(),
            settings.max_size
        );
        img = img.resize(settings.max_size, settings.max_size, FilterType::Triangle);
    }

    let rgba = img.to_rgba8();
    Ok(Texture {
        name: name.to_string(),
        width: rgba.width(),
        height: rgba.height(),
        mipmaps: settings.mipmaps,
        data: Bytes::from(rgba.into_raw()),
    })
}

/// `decode_texture` on the blocking pool
pub async fn decode_texture_async(name: &str, data: Bytes, settings: TextureSettings) -> Result<Texture, ImportError> {
    let name = name.to_string();
    tokio::task::spawn_blocking(move || decode_texture(&name, &data, &settings))
        .await
        .map_err(|e| ImportError::Task(e.to_string()))?
}
