//! What an orchestrator currently has on screen

use crate::assets::AssetHandle;
use crate::catalog::{BodyShape, EntityDefinition, EntityType};
use crate::scene::{AnimationClip, AnimationPlayback, AudioClip, NodeId, TextureRef};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Where a load cycle currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Resolving,
    Loading,
    Committing,
}

/// A model attached to the scene
#[derive(Debug)]
pub struct LoadedModel {
    pub entity: Arc<EntityDefinition>,
    pub node: NodeId,
    pub handle: AssetHandle,
}

#[derive(Debug)]
pub struct LoadedFacialFeature {
    pub entity: Arc<EntityDefinition>,
    pub main_texture: TextureRef,
    pub mask_texture: Option<TextureRef>,
    pub handle: AssetHandle,
}

#[derive(Debug)]
pub struct LoadedEmote {
    pub entity: Arc<EntityDefinition>,
    pub avatar_clip: AnimationClip,
    pub prop_clip: Option<AnimationClip>,
    pub audio: Option<AudioClip>,
    pub prop_node: Option<NodeId>,
    pub looping: bool,
    pub handle: AssetHandle,
}

/// Textures the base body's head mesh shipped with for one facial category
#[derive(Debug, Clone, Default)]
pub struct FacialTextures {
    pub main: Option<TextureRef>,
    pub mask: Option<TextureRef>,
}

#[derive(Debug, Default)]
pub struct OrchestratorState {
    pub current_body_shape: Option<BodyShape>,
    pub loaded_models: BTreeMap<String, LoadedModel>,
    pub loaded_facial_features: BTreeMap<String, LoadedFacialFeature>,
    pub loaded_emote: Option<LoadedEmote>,
    /// Categories hidden on top of the resolver's output
    pub hidden_categories: BTreeSet<String>,
    /// Resolver output of the last commit
    pub resolved_hidden: BTreeSet<String>,
    /// Snapshot taken when the body model was attached
    pub default_facial_feature_textures: BTreeMap<String, FacialTextures>,
    pub animation: AnimationPlayback,
}

impl OrchestratorState {
    /// Identifiers of every loaded model and facial feature
    pub fn loaded_keys(&self) -> BTreeSet<String> {
        self.loaded_models
            .keys()
            .chain(self.loaded_facial_features.keys())
            .cloned()
            .collect()
    }

    pub fn body_model(&self) -> Option<&LoadedModel> {
        self.loaded_models
            .values()
            .find(|model| model.entity.entity_type == EntityType::Body)
    }

    pub fn loaded_emote_urn(&self) -> Option<&str> {
        self.loaded_emote.as_ref().map(|emote| emote.entity.urn.as_str())
    }

    /// Resolver output plus explicitly hidden categories
    pub fn effective_hidden(&self) -> BTreeSet<String> {
        self.resolved_hidden.union(&self.hidden_categories).cloned().collect()
    }

    /// Categories occupied by an equipped wearable
    pub fn occupied_categories(&self) -> BTreeSet<String> {
        self.loaded_models
            .values()
            .filter(|model| model.entity.entity_type == EntityType::Wearable)
            .map(|model| model.entity.category.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded_models.is_empty()
            && self.loaded_facial_features.is_empty()
            && self.loaded_emote.is_none()
    }
}
