#![allow(dead_code)]

use async_trait::async_trait;
use avatar_composer::assets::{
    AssetHandle, AssetLoader, EmoteAsset, FacialFeatureAsset, ImportError, ImportRequest,
    ImportedModel, ModelAsset, ModelImporter, ResourceTracker,
};
use avatar_composer::avatar::{AvatarError, AvatarOrchestrator, AvatarResult};
use avatar_composer::catalog::{urn, BodyShape, EntityCatalog, EntityDefinition, EntityType};
use avatar_composer::config::ComposerSettings;
use avatar_composer::content::{
    ContentError, ContentFile, ContentResult, ContentService, EmoteData, EntityMetadata,
    ItemMetadata, RepresentationMetadata, WearableData,
};
use avatar_composer::scene::{AnimationClip, HeadlessScene, Material, SceneNode, Texture};
use avatar_composer::utils::logging::init_test_logging;
use bytes::Bytes;
use glam::Vec3;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const HAT: &str = "urn:decentraland:off-chain:base-avatars:cool_hat";
pub const HAIR: &str = "urn:decentraland:off-chain:base-avatars:short_hair";
pub const JACKET: &str = "urn:decentraland:off-chain:base-avatars:jacket";
pub const PANTS: &str = "urn:decentraland:off-chain:base-avatars:pants";
pub const SHOES: &str = "urn:decentraland:off-chain:base-avatars:sneakers";
pub const EYES: &str = "urn:decentraland:off-chain:base-avatars:green_eyes";
pub const DRESS: &str = "urn:decentraland:off-chain:base-avatars:dress";
pub const WAVE: &str = "urn:decentraland:off-chain:base-avatars:wave";
pub const DANCE: &str = "urn:decentraland:off-chain:base-avatars:dance";

fn both_shapes() -> Vec<String> {
    vec![BodyShape::MALE_URN.to_string(), BodyShape::FEMALE_URN.to_string()]
}

fn locator_for(urn: &str) -> String {
    format!("Qm{}", urn.rsplit(':').next().unwrap_or(urn))
}

fn deployment(urn: &str, main_file: &str, extra_files: &[&str], metadata: ItemMetadata) -> EntityMetadata {
    let locator = locator_for(urn);
    let mut content = vec![ContentFile { file: main_file.to_string(), hash: locator.clone() }];
    content.extend(extra_files.iter().map(|file| ContentFile {
        file: file.to_string(),
        hash: format!("{}-{}", locator, file),
    }));

    EntityMetadata {
        id: format!("bafy-{}", locator),
        entity_type: "wearable".to_string(),
        pointers: vec![urn.to_string()],
        content,
        metadata: Some(metadata),
    }
}

fn representation(main_file: &str, shapes: Vec<String>) -> RepresentationMetadata {
    RepresentationMetadata {
        body_shapes: shapes,
        main_file: main_file.to_string(),
        ..RepresentationMetadata::default()
    }
}

/// Wearable deployment usable by both body shapes
pub fn wearable(urn: &str, category: &str, hides: &[&str]) -> EntityMetadata {
    wearable_for(urn, category, hides, both_shapes())
}

pub fn wearable_for(urn: &str, category: &str, hides: &[&str], shapes: Vec<String>) -> EntityMetadata {
    deployment(
        urn,
        "model.glb",
        &[],
        ItemMetadata {
            id: urn.to_string(),
            name: category.to_string(),
            thumbnail: None,
            data: Some(WearableData {
                category: category.to_string(),
                hides: hides.iter().map(|h| h.to_string()).collect(),
                representations: vec![representation("model.glb", shapes)],
                ..WearableData::default()
            }),
            emote_data: None,
        },
    )
}

pub fn body(shape: BodyShape) -> EntityMetadata {
    deployment(
        shape.urn(),
        "body.glb",
        &[],
        ItemMetadata {
            id: shape.urn().to_string(),
            name: format!("{} body", shape),
            thumbnail: None,
            data: Some(WearableData {
                category: "body_shape".to_string(),
                representations: vec![representation("body.glb", vec![shape.urn().to_string()])],
                ..WearableData::default()
            }),
            emote_data: None,
        },
    )
}

pub fn facial_feature(urn: &str, category: &str) -> EntityMetadata {
    deployment(
        urn,
        "feature.png",
        &["feature_mask.png"],
        ItemMetadata {
            id: urn.to_string(),
            name: category.to_string(),
            thumbnail: None,
            data: Some(WearableData {
                category: category.to_string(),
                representations: vec![representation("feature.png", both_shapes())],
                ..WearableData::default()
            }),
            emote_data: None,
        },
    )
}

pub fn emote(urn: &str, looping: bool, extra_files: &[&str]) -> EntityMetadata {
    let mut entity = deployment(
        urn,
        "emote.glb",
        extra_files,
        ItemMetadata {
            id: urn.to_string(),
            name: "emote".to_string(),
            thumbnail: None,
            data: None,
            emote_data: Some(EmoteData {
                category: "greetings".to_string(),
                looping,
                representations: vec![representation("emote.glb", both_shapes())],
                ..EmoteData::default()
            }),
        },
    );
    entity.entity_type = "emote".to_string();
    entity
}

/// Content server held in memory, with call counting and failure injection
#[derive(Default)]
pub struct MemoryContentService {
    entities: Mutex<Vec<EntityMetadata>>,
    files: Mutex<HashMap<String, Bytes>>,
    failing_locators: Mutex<HashSet<String>>,
    fail_resolve: AtomicBool,
    resolve_delay: Mutex<Option<Duration>>,
    pub resolve_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    requested: Mutex<Vec<Vec<String>>>,
}

impl MemoryContentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service that knows both base bodies and a typical wardrobe
    pub fn with_wardrobe() -> Self {
        let service = Self::new();
        service.add_entity(body(BodyShape::Male));
        service.add_entity(body(BodyShape::Female));
        service.add_entity(wearable(HAT, "hat", &["top_head"]));
        service.add_entity(wearable(HAIR, "hair", &[]));
        service.add_entity(wearable(JACKET, "upper_body", &[]));
        service.add_entity(wearable(PANTS, "lower_body", &[]));
        service.add_entity(wearable(SHOES, "feet", &[]));
        service.add_entity(facial_feature(EYES, "eyes"));
        service.add_entity(wearable_for(DRESS, "upper_body", &["lower_body"], vec![BodyShape::FEMALE_URN.to_string()]));
        service.add_entity(emote(WAVE, false, &[]));
        service.add_entity(emote(DANCE, true, &[]));
        service
    }

    pub fn add_entity(&self, entity: EntityMetadata) {
        self.entities.lock().unwrap().push(entity);
    }

    pub fn add_file(&self, locator: &str, data: impl Into<Bytes>) {
        self.files.lock().unwrap().insert(locator.to_string(), data.into());
    }

    pub fn fail_locator(&self, locator: &str) {
        self.failing_locators.lock().unwrap().insert(locator.to_string());
    }

    pub fn fail_resolution(&self, fail: bool) {
        self.fail_resolve.store(fail, Ordering::SeqCst);
    }

    pub fn set_resolve_delay(&self, delay: Duration) {
        *self.resolve_delay.lock().unwrap() = Some(delay);
    }

    /// URN batches the service was asked to resolve
    pub fn requested_batches(&self) -> Vec<Vec<String>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentService for MemoryContentService {
    async fn resolve_active_entities(&self, urns: &[String]) -> ContentResult<Vec<EntityMetadata>> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(urns.to_vec());

        let delay = *self.resolve_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_resolve.load(Ordering::SeqCst) {
            return Err(ContentError::Status { url: "memory".to_string(), status: 503 });
        }

        let wanted: HashSet<String> = urns.iter().map(|u| urn::normalize(u)).collect();
        let entities = self.entities.lock().unwrap();
        Ok(entities
            .iter()
            .filter(|e| e.pointers.iter().any(|p| wanted.contains(&urn::normalize(p))))
            .cloned()
            .collect())
    }

    async fn fetch_content(&self, locator: &str) -> ContentResult<Bytes> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_locators.lock().unwrap().contains(locator) {
            return Err(ContentError::Status { url: locator.to_string(), status: 500 });
        }
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(locator)
            .cloned()
            .unwrap_or_else(|| Bytes::from(locator.to_string())))
    }
}

/// Importer that fabricates a tree instead of decoding glTF
#[derive(Default)]
pub struct FakeImporter {
    pub clips: Mutex<Vec<AnimationClip>>,
}

impl FakeImporter {
    pub fn with_clips(clips: Vec<AnimationClip>) -> Self {
        Self { clips: Mutex::new(clips) }
    }
}

#[async_trait]
impl ModelImporter for FakeImporter {
    async fn import(&self, request: ImportRequest<'_>) -> Result<ImportedModel, ImportError> {
        if request.data.is_empty() {
            return Err(ImportError::Decode {
                file: request.main_file.to_string(),
                reason: "empty".to_string(),
            });
        }
        // Wrapper group around a scaled mesh with an oddly named skeleton
        let root = SceneNode::new("Scene").with_child(
            SceneNode::new(request.main_file)
                .with_scale(Vec3::splat(0.01))
                .with_child(SceneNode::new("Avatar_Root").with_child(SceneNode::new("Avatar_Hips")))
                .with_child(SceneNode::new("mesh").with_material(Material::new("Skin_MAT"))),
        );
        Ok(ImportedModel { root, clips: self.clips.lock().unwrap().clone() })
    }
}

pub fn png(width: u32, height: u32) -> Bytes {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]));
    let mut buffer = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    Bytes::from(buffer.into_inner())
}

fn texture(name: &str) -> Arc<Texture> {
    Arc::new(Texture {
        name: name.to_string(),
        width: 1,
        height: 1,
        mipmaps: false,
        data: Bytes::from_static(&[0, 0, 0, 255]),
    })
}

/// Base body tree with the head materials facial features paint onto
pub fn body_tree(urn: &str) -> SceneNode {
    SceneNode::new(urn)
        .with_child(SceneNode::new("Armature"))
        .with_child(
            SceneNode::new("M_Head_BaseMesh")
                .with_material(Material::new("AvatarSkin_MAT"))
                .with_material(
                    Material::new("AvatarEyes_MAT").with_textures(Some(texture("default_eyes")), None),
                )
                .with_material(Material::new("AvatarEyebrows_MAT"))
                .with_material(Material::new("AvatarMouth_MAT")),
        )
        .with_child(SceneNode::new("M_uBody_BaseMesh").with_material(Material::new("AvatarSkin_MAT")))
        .with_child(SceneNode::new("M_lBody_BaseMesh").with_material(Material::new("AvatarSkin_MAT")))
        .with_child(SceneNode::new("M_Feet_BaseMesh").with_material(Material::new("AvatarSkin_MAT")))
        .with_child(SceneNode::new("M_Hands_BaseMesh").with_material(Material::new("AvatarSkin_MAT")))
}

/// Loader that builds payloads in memory, records calls and fails on demand
#[derive(Default)]
pub struct ScriptedLoader {
    pub tracker: ResourceTracker,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, urn: &str) {
        self.failing.lock().unwrap().insert(urn::normalize(urn));
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn begin(&self, shape: BodyShape, entity: &EntityDefinition) -> AvatarResult<()> {
        self.calls.lock().unwrap().push(entity.urn.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if !entity.supports(shape) {
            return Err(AvatarError::RepresentationMissing { urn: entity.urn.clone(), shape });
        }
        if self.failing.lock().unwrap().contains(&entity.urn) {
            return Err(AvatarError::load_failure(&entity.urn, "scripted failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl AssetLoader for ScriptedLoader {
    async fn load_model(&self, shape: BodyShape, entity: &EntityDefinition) -> AvatarResult<ModelAsset> {
        self.begin(shape, entity).await?;
        let node = match entity.entity_type {
            EntityType::Body => body_tree(&entity.urn),
            _ => SceneNode::new(entity.urn.clone())
                .with_material(Material::new(format!("{}_MAT", entity.category))),
        };
        Ok(ModelAsset { node, handle: AssetHandle::new(entity.urn.clone(), &self.tracker) })
    }

    async fn load_facial_feature(
        &self,
        shape: BodyShape,
        entity: &EntityDefinition,
    ) -> AvatarResult<FacialFeatureAsset> {
        self.begin(shape, entity).await?;
        Ok(FacialFeatureAsset {
            main_texture: texture(&entity.urn),
            mask_texture: Some(texture(&format!("{}_mask", entity.urn))),
            handle: AssetHandle::new(entity.urn.clone(), &self.tracker),
        })
    }

    async fn load_emote(&self, shape: BodyShape, entity: &EntityDefinition) -> AvatarResult<EmoteAsset> {
        self.begin(shape, entity).await?;
        let name = entity.urn.rsplit(':').next().unwrap_or("emote");
        Ok(EmoteAsset {
            avatar_clip: AnimationClip::new(format!("{}_Avatar", name), 2.0),
            prop_clip: Some(AnimationClip::new(format!("{}_Prop", name), 2.0)),
            audio: None,
            prop: Some(SceneNode::new(format!("{}:prop", entity.urn))),
            looping: entity.looping,
            handle: AssetHandle::new(entity.urn.clone(), &self.tracker),
        })
    }
}

pub type TestOrchestrator = AvatarOrchestrator<HeadlessScene, ScriptedLoader>;

/// Warmed-up catalog, scripted loader and a fresh headless orchestrator
pub async fn setup(settings: ComposerSettings) -> (Arc<MemoryContentService>, Arc<ScriptedLoader>, TestOrchestrator) {
    init_test_logging();
    let service = Arc::new(MemoryContentService::with_wardrobe());
    let catalog = Arc::new(EntityCatalog::new(service.clone()));
    catalog.warm_up().await.unwrap();

    let loader = Arc::new(ScriptedLoader::new());
    let orchestrator = AvatarOrchestrator::new(catalog, loader.clone(), HeadlessScene::new(), &settings);
    (service, loader, orchestrator)
}

pub fn key(urn: &str) -> String {
    urn::normalize(urn)
}
