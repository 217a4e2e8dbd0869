//! Asset loading for avatar entities
//!
//! Loaders turn one entity plus one body-shape representation into finished,
//! off-scene payloads. Every payload owns an [`AssetHandle`] that must be
//! released exactly once when the orchestrator evicts it.

use crate::avatar::AvatarResult;
use crate::catalog::{BodyShape, EntityDefinition, EntityType};
use crate::scene::{AnimationClip, AudioClip, SceneNode, TextureRef};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

pub mod emote;
pub mod import;
pub mod loader;
pub mod sanitize;
pub mod texture;

pub use import::{AnimationMode, GltfImporter, ImportError, ImportRequest, ImportedModel, ModelImporter};
pub use loader::ContentAssetLoader;

#[derive(Debug, Default)]
struct TrackerCounters {
    live: AtomicUsize,
    acquired: AtomicU64,
    released: AtomicU64,
}

/// Counts live asset handles, shared by a loader and everything it hands out
#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    counters: Arc<TrackerCounters>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles acquired and not yet released
    pub fn live(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    pub fn acquired(&self) -> u64 {
        self.counters.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> u64 {
        self.counters.released.load(Ordering::SeqCst)
    }

    fn acquire(&self) {
        self.counters.live.fetch_add(1, Ordering::SeqCst);
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.counters.live.fetch_sub(1, Ordering::SeqCst);
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

type ReleaseHook = Box<dyn FnOnce() + Send + Sync>;

/// Disposable handle for the resources behind one loaded payload.
///
/// Released either explicitly through [`AssetHandle::release`] or, for
/// payloads abandoned by an aborted load cycle, when dropped. Either way the
/// release runs once.
pub struct AssetHandle {
    label: String,
    tracker: Option<ResourceTracker>,
    hooks: Vec<ReleaseHook>,
}

impl std::fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetHandle")
            .field("label", &self.label)
            .field("tracked", &self.tracker.is_some())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl AssetHandle {
    pub fn new(label: impl Into<String>, tracker: &ResourceTracker) -> Self {
        tracker.acquire();
        Self {
            label: label.into(),
            tracker: Some(tracker.clone()),
            hooks: Vec::new(),
        }
    }

    /// Run `hook` when the handle is released (GPU buffers, audio sources…)
    pub fn on_release(mut self, hook: impl FnOnce() + Send + Sync + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn release(mut self) {
        self.release_resources();
    }

    fn release_resources(&mut self) {
        let Some(tracker) = self.tracker.take() else {
            return;
        };
        for hook in self.hooks.drain(..) {
            hook();
        }
        tracker.release();
        debug!("♻️ Released {}", self.label);
    }
}

impl Drop for AssetHandle {
    fn drop(&mut self) {
        if self.tracker.is_some() {
            warn!("♻️ {} dropped without explicit release", self.label);
            self.release_resources();
        }
    }
}

/// Instantiated wearable or body model
#[derive(Debug)]
pub struct ModelAsset {
    pub node: SceneNode,
    pub handle: AssetHandle,
}

/// Textures painted onto the body's head mesh
#[derive(Debug)]
pub struct FacialFeatureAsset {
    pub main_texture: TextureRef,
    pub mask_texture: Option<TextureRef>,
    pub handle: AssetHandle,
}

#[derive(Debug)]
pub struct EmoteAsset {
    /// Clip that animates the avatar
    pub avatar_clip: AnimationClip,
    /// Clip that animates the prop, if the emote has one
    pub prop_clip: Option<AnimationClip>,
    pub audio: Option<AudioClip>,
    pub prop: Option<SceneNode>,
    pub looping: bool,
    pub handle: AssetHandle,
}

/// Result of loading any entity
#[derive(Debug)]
pub enum LoadedAsset {
    Model(ModelAsset),
    FacialFeature(FacialFeatureAsset),
    Emote(EmoteAsset),
}

#[async_trait]
pub trait AssetLoader: Send + Sync + 'static {
    async fn load_model(&self, shape: BodyShape, entity: &EntityDefinition) -> AvatarResult<ModelAsset>;

    async fn load_facial_feature(
        &self,
        shape: BodyShape,
        entity: &EntityDefinition,
    ) -> AvatarResult<FacialFeatureAsset>;

    async fn load_emote(&self, shape: BodyShape, entity: &EntityDefinition) -> AvatarResult<EmoteAsset>;

    /// Dispatch on the entity's kind
    async fn load_entity(&self, shape: BodyShape, entity: &EntityDefinition) -> AvatarResult<LoadedAsset> {
        match entity.entity_type {
            EntityType::Body | EntityType::Wearable => {
                self.load_model(shape, entity).await.map(LoadedAsset::Model)
            }
            EntityType::FacialFeature => {
                self.load_facial_feature(shape, entity).await.map(LoadedAsset::FacialFeature)
            }
            EntityType::Emote => self.load_emote(shape, entity).await.map(LoadedAsset::Emote),
        }
    }
}
