//! Content-server backed asset loader

use super::emote::disambiguate;
use super::import::{AnimationMode, ImportRequest, ModelImporter};
use super::sanitize::sanitize;
use super::texture::decode_texture_async;
use super::{
    AssetHandle, AssetLoader, EmoteAsset, FacialFeatureAsset, ModelAsset, ResourceTracker,
};
use crate::avatar::{AvatarError, AvatarResult};
use crate::catalog::{BodyShape, EntityDefinition, Representation};
use crate::config::TextureSettings;
use crate::content::ContentService;
use crate::scene::{AudioClip, SceneNode};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

const MASK_SUFFIX: &str = "_mask.png";
const AUDIO_EXTENSIONS: [&str; 3] = [".mp3", ".ogg", ".wav"];

pub struct ContentAssetLoader {
    content: Arc<dyn ContentService>,
    importer: Arc<dyn ModelImporter>,
    texture: TextureSettings,
    tracker: ResourceTracker,
}

impl std::fmt::Debug for ContentAssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentAssetLoader")
            .field("texture", &self.texture)
            .field("live_handles", &self.tracker.live())
            .finish()
    }
}

impl ContentAssetLoader {
    pub fn new(
        content: Arc<dyn ContentService>,
        importer: Arc<dyn ModelImporter>,
        texture: TextureSettings,
    ) -> Self {
        Self {
            content,
            importer,
            texture,
            tracker: ResourceTracker::new(),
        }
    }

    /// Tracker counting every handle this loader has handed out
    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    fn representation<'a>(
        entity: &'a EntityDefinition,
        shape: BodyShape,
    ) -> AvatarResult<&'a Representation> {
        entity
            .representation(shape)
            .ok_or_else(|| AvatarError::RepresentationMissing {
                urn: entity.urn.clone(),
                shape,
            })
    }

    async fn fetch(&self, entity: &EntityDefinition, file: &str, locator: &str) -> AvatarResult<Bytes> {
        debug!("📥 Fetching {} for {}", file, entity.urn);
        self.content
            .fetch_content(locator)
            .await
            .map_err(|e| AvatarError::load_failure(&entity.urn, format!("{}: {}", file, e)))
    }

    /// Fetch, import and sanitize the representation's main file
    async fn import_main(
        &self,
        entity: &EntityDefinition,
        representation: &Representation,
    ) -> AvatarResult<(SceneNode, Vec<crate::scene::AnimationClip>)> {
        let locator = representation.main_locator().ok_or_else(|| {
            AvatarError::load_failure(
                &entity.urn,
                format!("main file {} is not in the entity's content", representation.main_file),
            )
        })?;

        let data = self.fetch(entity, &representation.main_file, locator).await?;
        let companions = representation.companions();
        let imported = self
            .importer
            .import(ImportRequest {
                main_file: &representation.main_file,
                data,
                companions: &companions,
                animation_mode: AnimationMode::Legacy,
                texture: self.texture,
            })
            .await
            .map_err(|e| AvatarError::load_failure(&entity.urn, e))?;

        Ok((sanitize(imported.root), imported.clips))
    }
}

#[async_trait]
impl AssetLoader for ContentAssetLoader {
    async fn load_model(&self, shape: BodyShape, entity: &EntityDefinition) -> AvatarResult<ModelAsset> {
        let representation = Self::representation(entity, shape)?;
        let (mut node, _clips) = self.import_main(entity, representation).await?;
        node.name = entity.urn.clone();

        info!("👕 Loaded model {} ({} nodes)", entity.urn, node.node_count());

        Ok(ModelAsset {
            node,
            handle: AssetHandle::new(format!("model {}", entity.urn), &self.tracker),
        })
    }

    async fn load_facial_feature(
        &self,
        shape: BodyShape,
        entity: &EntityDefinition,
    ) -> AvatarResult<FacialFeatureAsset> {
        let representation = Self::representation(entity, shape)?;
        let main_locator = representation.main_locator().ok_or_else(|| {
            AvatarError::load_failure(&entity.urn, "main texture is not in the entity's content")
        })?;

        let data = self.fetch(entity, &representation.main_file, main_locator).await?;
        let main_texture = decode_texture_async(&representation.main_file, data, self.texture)
            .await
            .map_err(|e| AvatarError::load_failure(&entity.urn, e))?;

        let mask_texture = match representation.file_ending_with(MASK_SUFFIX) {
            Some((file, locator)) if file != representation.main_file => {
                let data = self.fetch(entity, file, locator).await?;
                let mask = decode_texture_async(file, data, self.texture)
                    .await
                    .map_err(|e| AvatarError::load_failure(&entity.urn, e))?;
                Some(Arc::new(mask))
            }
            _ => None,
        };

        info!("👁️ Loaded facial feature {}", entity.urn);

        Ok(FacialFeatureAsset {
            main_texture: Arc::new(main_texture),
            mask_texture,
            handle: AssetHandle::new(format!("facial feature {}", entity.urn), &self.tracker),
        })
    }

    async fn load_emote(&self, shape: BodyShape, entity: &EntityDefinition) -> AvatarResult<EmoteAsset> {
        let representation = Self::representation(entity, shape)?;
        let (node, clips) = self.import_main(entity, representation).await?;
        let clips = disambiguate(&entity.urn, &clips)?;

        let prop = clips.prop.as_ref().map(|_| {
            let mut prop = node;
            prop.name = format!("{}:prop", entity.urn);
            prop
        });

        let audio_file = representation.files.iter().find(|(name, _)| {
            let lower = name.to_ascii_lowercase();
            AUDIO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
        });
        let audio = match audio_file {
            Some((file, locator)) => Some(AudioClip {
                file: file.clone(),
                data: self.fetch(entity, file, locator).await?,
            }),
            None => None,
        };

        info!(
            "🎭 Loaded emote {} (clip {}, prop: {}, audio: {})",
            entity.urn,
            clips.avatar.name,
            prop.is_some(),
            audio.is_some()
        );

        Ok(EmoteAsset {
            avatar_clip: clips.avatar,
            prop_clip: clips.prop,
            audio,
            prop,
            looping: entity.looping,
            handle: AssetHandle::new(format!("emote {}", entity.urn), &self.tracker),
        })
    }
}
