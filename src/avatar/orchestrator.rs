//! Avatar load orchestration
//!
//! One [`AvatarOrchestrator`] owns one avatar in one scene. A load cycle
//! resolves the requested identifiers, computes hidden categories, diffs the
//! target against what is loaded, loads the missing pieces and then commits
//! everything in a single synchronous step. Nothing in the scene changes
//! until every load of the cycle succeeded.

use super::colors::AvatarColors;
use super::diff::{diff_composition, CompositionPlan, EmoteChange};
use super::state::{
    FacialTextures, LoadPhase, LoadedEmote, LoadedFacialFeature, LoadedModel, OrchestratorState,
};
use super::visibility::resolve_hidden;
use super::{AvatarError, AvatarResult};
use crate::assets::{AssetLoader, EmoteAsset, LoadedAsset};
use crate::catalog::{category, urn, BodyShape, EntityCatalog, EntityDefinition, EntityType};
use crate::config::ComposerSettings;
use crate::scene::{AnimationPlayback, AvatarScene, NodeId, SceneNode};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Everything needed to compose one avatar
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarRequest {
    pub body_shape: BodyShape,
    pub wearables: Vec<String>,
    pub emote: Option<String>,
    /// Categories shown no matter what the equipped items hide
    pub force_visible: BTreeSet<String>,
    pub colors: AvatarColors,
}

impl AvatarRequest {
    pub fn new(body_shape: BodyShape) -> Self {
        Self {
            body_shape,
            wearables: Vec::new(),
            emote: None,
            force_visible: BTreeSet::new(),
            colors: AvatarColors::default(),
        }
    }

    pub fn with_wearables<I, S>(mut self, wearables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wearables = wearables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_emote(mut self, emote: impl Into<String>) -> Self {
        self.emote = Some(emote.into());
        self
    }

    pub fn with_force_visible<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.force_visible = categories.into_iter().map(|c| c.into().to_lowercase()).collect();
        self
    }

    pub fn with_colors(mut self, colors: AvatarColors) -> Self {
        self.colors = colors;
        self
    }
}

/// Summary of one committed load cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub request_id: Uuid,
    pub loaded: Vec<String>,
    pub kept: Vec<String>,
    pub released: Vec<String>,
    /// Requested identifiers that were unknown or unsupported by the body shape
    pub skipped: Vec<String>,
    pub hidden_categories: BTreeSet<String>,
    pub emote_changed: bool,
}

/// Target of one cycle after resolution
struct Composition {
    entities: Vec<Arc<EntityDefinition>>,
    emote: Option<Arc<EntityDefinition>>,
    skipped: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct LoadLimits {
    sequential: bool,
    max_concurrent: usize,
}

pub struct AvatarOrchestrator<S: AvatarScene, L: AssetLoader> {
    catalog: Arc<EntityCatalog>,
    loader: Arc<L>,
    scene: S,
    limits: LoadLimits,
    yield_after_commit: bool,
    state: OrchestratorState,
    phase: LoadPhase,
}

impl<S: AvatarScene, L: AssetLoader> std::fmt::Debug for AvatarOrchestrator<S, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarOrchestrator")
            .field("phase", &self.phase)
            .field("body_shape", &self.state.current_body_shape)
            .field("models", &self.state.loaded_models.len())
            .field("facial_features", &self.state.loaded_facial_features.len())
            .field("emote", &self.state.loaded_emote_urn())
            .finish()
    }
}

impl<S: AvatarScene, L: AssetLoader> AvatarOrchestrator<S, L> {
    pub fn new(catalog: Arc<EntityCatalog>, loader: Arc<L>, scene: S, settings: &ComposerSettings) -> Self {
        Self {
            catalog,
            loader,
            scene,
            limits: LoadLimits {
                sequential: settings.sequential_loading,
                max_concurrent: settings.max_concurrent_loads.max(1),
            },
            yield_after_commit: settings.yield_after_commit,
            state: OrchestratorState::default(),
            phase: LoadPhase::Idle,
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn state(&self) -> &OrchestratorState {
        &self.state
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn catalog(&self) -> &Arc<EntityCatalog> {
        &self.catalog
    }

    /// Bring the avatar to the requested composition.
    ///
    /// On error the scene and the loaded state are exactly as before the
    /// call; payloads loaded during the failed cycle are released.
    pub async fn load_avatar(&mut self, request: AvatarRequest) -> AvatarResult<LoadReport> {
        let request_id = Uuid::new_v4();
        let span = info_span!("load_avatar", %request_id, body = %request.body_shape);

        let result = self.run_cycle(request, request_id).instrument(span).await;
        self.set_phase(LoadPhase::Idle);

        if let Err(e) = &result {
            error!("❌ Avatar load {} failed: {}", request_id, e);
        }
        result
    }

    async fn run_cycle(&mut self, request: AvatarRequest, request_id: Uuid) -> AvatarResult<LoadReport> {
        let shape = request.body_shape;

        self.set_phase(LoadPhase::Resolving);
        let composition = resolve_composition(&self.catalog, &request).await?;
        check_unique_categories(&composition.entities)?;

        let hidden = resolve_hidden(shape, &composition.entities, &request.force_visible);
        let body_shape_changed = self.state.current_body_shape != Some(shape);
        let plan = diff_composition(
            &self.state.loaded_keys(),
            &composition.entities,
            body_shape_changed,
            self.state.loaded_emote_urn(),
            composition.emote.as_ref(),
        );
        debug!(
            "📋 Plan: {} to load, {} kept, {} to release, emote {:?}",
            plan.to_load.len(),
            plan.to_keep.len(),
            plan.to_release.len(),
            plan.emote
        );

        self.set_phase(LoadPhase::Loading);
        let mut jobs = plan.to_load.clone();
        if let EmoteChange::Load(emote) = &plan.emote {
            jobs.push(emote.clone());
        }
        let loaded = load_all(Arc::clone(&self.loader), self.limits, shape, jobs).await?;

        self.set_phase(LoadPhase::Committing);
        let mut report = self.commit(shape, plan, loaded, hidden, &request.colors);
        report.request_id = request_id;
        report.skipped = composition.skipped;

        info!(
            "✅ Avatar composed: {} loaded, {} kept, {} released, {} hidden categories",
            report.loaded.len(),
            report.kept.len(),
            report.released.len(),
            report.hidden_categories.len()
        );

        if self.yield_after_commit {
            tokio::task::yield_now().await;
        }
        Ok(report)
    }

    fn set_phase(&mut self, phase: LoadPhase) {
        if self.phase != phase {
            debug!("🔄 {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Apply a finished cycle to the scene. Synchronous so nothing can
    /// observe a half-applied composition.
    fn commit(
        &mut self,
        shape: BodyShape,
        plan: CompositionPlan,
        loaded: Vec<(Arc<EntityDefinition>, LoadedAsset)>,
        hidden: BTreeSet<String>,
        colors: &AvatarColors,
    ) -> LoadReport {
        let root = self.scene.root();
        let body_shape_changed = self.state.current_body_shape != Some(shape);

        for key in &plan.to_release {
            if let Some(model) = self.state.loaded_models.remove(key) {
                self.scene.destroy(model.node);
                model.handle.release();
            } else if let Some(feature) = self.state.loaded_facial_features.remove(key) {
                feature.handle.release();
            }
        }
        if body_shape_changed {
            self.state.default_facial_feature_textures.clear();
        }

        let mut loaded_keys = Vec::with_capacity(loaded.len());
        let mut new_emote = None;
        for (entity, asset) in loaded {
            loaded_keys.push(entity.urn.clone());
            match asset {
                LoadedAsset::Model(model) => {
                    let node = self.scene.attach(root, model.node);
                    if entity.entity_type == EntityType::Body {
                        self.snapshot_facial_textures(node);
                    }
                    self.state.loaded_models.insert(
                        entity.urn.clone(),
                        LoadedModel { entity, node, handle: model.handle },
                    );
                }
                LoadedAsset::FacialFeature(feature) => {
                    self.state.loaded_facial_features.insert(
                        entity.urn.clone(),
                        LoadedFacialFeature {
                            entity,
                            main_texture: feature.main_texture,
                            mask_texture: feature.mask_texture,
                            handle: feature.handle,
                        },
                    );
                }
                LoadedAsset::Emote(emote) => new_emote = Some((entity, emote)),
            }
        }

        let emote_changed = plan.emote != EmoteChange::Keep;
        if emote_changed {
            self.dispose_emote();
            if let Some((entity, asset)) = new_emote {
                self.adopt_emote(root, entity, asset);
            }
        }
        self.update_animation(emote_changed);

        self.state.resolved_hidden = hidden;
        self.apply_visibility();

        for model in self.state.loaded_models.values() {
            if let Some(node) = self.scene.node_mut(model.node) {
                colors.apply(node);
            }
        }
        self.apply_facial_features();

        self.state.current_body_shape = Some(shape);
        debug_assert!(distinct_categories(&self.state));

        LoadReport {
            loaded: loaded_keys,
            kept: plan.to_keep,
            released: plan.to_release,
            hidden_categories: self.state.effective_hidden(),
            emote_changed,
            ..LoadReport::default()
        }
    }

    fn snapshot_facial_textures(&mut self, body: NodeId) {
        let Some(node) = self.scene.node(body) else {
            return;
        };

        let mut snapshot = BTreeMap::new();
        node.visit(&mut |n| {
            for material in &n.materials {
                for category in category::FACIAL_FEATURES {
                    if facial_material(&material.name, category) && !snapshot.contains_key(category) {
                        snapshot.insert(
                            category.to_string(),
                            FacialTextures {
                                main: material.main_texture.clone(),
                                mask: material.mask_texture.clone(),
                            },
                        );
                    }
                }
            }
        });
        self.state.default_facial_feature_textures = snapshot;
    }

    fn adopt_emote(&mut self, root: NodeId, entity: Arc<EntityDefinition>, asset: EmoteAsset) {
        let prop_node = asset.prop.map(|prop| self.scene.attach(root, prop));
        if let Some(audio) = &asset.audio {
            debug!("🔊 Emote {} carries audio {}", entity.urn, audio.file);
        }
        self.state.loaded_emote = Some(LoadedEmote {
            entity,
            avatar_clip: asset.avatar_clip,
            prop_clip: asset.prop_clip,
            audio: asset.audio,
            prop_node,
            looping: asset.looping,
            handle: asset.handle,
        });
    }

    fn dispose_emote(&mut self) {
        if let Some(emote) = self.state.loaded_emote.take() {
            if let Some(prop) = emote.prop_node {
                self.scene.destroy(prop);
            }
            emote.handle.release();
        }
    }

    /// Continue the running clip when it is still wanted, otherwise start
    /// the new one and crossfade out of the old.
    fn update_animation(&mut self, emote_changed: bool) {
        let (clip, looping) = match &self.state.loaded_emote {
            Some(emote) => (emote.avatar_clip.name.clone(), emote.looping),
            None => (AnimationPlayback::IDLE.to_string(), true),
        };

        // A kept emote keeps whatever is playing, even if it already went back to idle
        let previous = &self.state.animation;
        let continues = !emote_changed || (previous.clip == clip && clip == AnimationPlayback::IDLE);
        let playback = if continues {
            AnimationPlayback {
                crossfade_from: None,
                ..previous.clone()
            }
        } else {
            AnimationPlayback {
                clip,
                time: 0.0,
                looping,
                crossfade_from: Some(previous.clip.clone()),
            }
        };

        self.state.animation = playback;
        self.play_current();
    }

    fn play_current(&mut self) {
        if let Some(body) = self.state.body_model().map(|model| model.node) {
            self.scene.play_animation(body, &self.state.animation);
        }

        if let Some(emote) = &self.state.loaded_emote {
            if let (Some(prop), Some(clip)) = (emote.prop_node, &emote.prop_clip) {
                let playback = AnimationPlayback {
                    clip: clip.name.clone(),
                    time: self.state.animation.time,
                    looping: emote.looping,
                    crossfade_from: None,
                };
                self.scene.play_animation(prop, &playback);
            }
        }
    }

    fn apply_visibility(&mut self) {
        let hidden = self.state.effective_hidden();
        let occupied = self.state.occupied_categories();

        for model in self.state.loaded_models.values() {
            match model.entity.entity_type {
                EntityType::Body => {
                    if let Some(node) = self.scene.node_mut(model.node) {
                        node.active = true;
                        apply_body_part_visibility(node, &hidden, &occupied);
                    }
                }
                _ => self
                    .scene
                    .set_active(model.node, !hidden.contains(&model.entity.category)),
            }
        }
    }

    /// Paint facial feature textures onto the body's head materials.
    ///
    /// A hidden category disables its material. Otherwise the equipped
    /// feature's textures apply, falling back to the body's own.
    fn apply_facial_features(&mut self) {
        let Some(body) = self.state.body_model().map(|model| model.node) else {
            return;
        };
        let hidden = self.state.effective_hidden();

        for category in category::FACIAL_FEATURES {
            let textures = match self
                .state
                .loaded_facial_features
                .values()
                .find(|feature| feature.entity.category == category)
            {
                Some(feature) => FacialTextures {
                    main: Some(feature.main_texture.clone()),
                    mask: feature.mask_texture.clone(),
                },
                None => self
                    .state
                    .default_facial_feature_textures
                    .get(category)
                    .cloned()
                    .unwrap_or_default(),
            };
            let enabled = !hidden.contains(category);

            if let Some(node) = self.scene.node_mut(body) {
                node.for_each_material_mut(&mut |material| {
                    if facial_material(&material.name, category) {
                        material.enabled = enabled;
                        material.main_texture = textures.main.clone();
                        material.mask_texture = textures.mask.clone();
                    }
                });
            }
        }
    }

    /// Hide or show a category right away, without a load cycle
    pub fn try_hide_category(&mut self, category: &str, hidden: bool) {
        let category = category.to_lowercase();
        let changed = if hidden {
            self.state.hidden_categories.insert(category.clone())
        } else {
            self.state.hidden_categories.remove(&category)
        };

        if changed {
            debug!("👁️ Category {} {}", category, if hidden { "hidden" } else { "shown" });
            self.apply_visibility();
            self.apply_facial_features();
        }
    }

    /// Advance the animator by `delta` seconds.
    ///
    /// A one-shot emote that ran past its end falls back to idle.
    pub fn tick(&mut self, delta: f32) {
        let animation = &mut self.state.animation;
        animation.time += delta;
        animation.crossfade_from = None;

        if let Some(emote) = &self.state.loaded_emote {
            let duration = emote.avatar_clip.duration;
            if animation.clip == emote.avatar_clip.name && duration > 0.0 && animation.time >= duration {
                if emote.looping {
                    animation.time %= duration;
                } else {
                    debug!("🎭 Emote {} finished, back to idle", emote.entity.urn);
                    *animation = AnimationPlayback {
                        crossfade_from: Some(animation.clip.clone()),
                        ..AnimationPlayback::idle()
                    };
                }
            }
        }

        self.play_current();
    }

    /// Destroy every renderable and release every handle
    pub fn cleanup(&mut self) {
        let models = std::mem::take(&mut self.state.loaded_models);
        let features = std::mem::take(&mut self.state.loaded_facial_features);
        info!("🧹 Cleaning up avatar ({} models, {} facial features)", models.len(), features.len());

        for model in models.into_values() {
            self.scene.destroy(model.node);
            model.handle.release();
        }
        for feature in features.into_values() {
            feature.handle.release();
        }
        self.dispose_emote();

        self.state = OrchestratorState::default();
        self.phase = LoadPhase::Idle;
    }
}

impl<S: AvatarScene, L: AssetLoader> Drop for AvatarOrchestrator<S, L> {
    fn drop(&mut self) {
        if !self.state.is_empty() {
            self.cleanup();
        }
    }
}

/// Body entity first, then every usable requested wearable
async fn resolve_composition(catalog: &EntityCatalog, request: &AvatarRequest) -> AvatarResult<Composition> {
    let shape = request.body_shape;
    let body = catalog.get_body_entity(shape).await?;

    let mut urns = request.wearables.clone();
    urns.extend(request.emote.iter().cloned());
    let resolved = catalog.resolve(&urns).await;

    let found: HashSet<&str> = resolved.iter().map(|e| e.urn.as_str()).collect();
    let mut skipped: Vec<String> = Vec::new();
    for key in urns.iter().map(|u| urn::normalize(u)) {
        if !found.contains(key.as_str()) && !skipped.contains(&key) {
            warn!("⚠️ {} could not be resolved, skipping", key);
            skipped.push(key);
        }
    }

    let emote_key = request.emote.as_deref().map(urn::normalize);
    let mut entities = vec![body];
    let mut emote = None;

    let wearable_keys: HashSet<String> = request.wearables.iter().map(|u| urn::normalize(u)).collect();

    for entity in resolved {
        if emote_key.as_deref() == Some(entity.urn.as_str()) {
            if entity.entity_type == EntityType::Emote {
                if entity.supports(shape) {
                    emote = Some(entity);
                } else {
                    warn!("⚠️ Emote {} has no {} representation, skipping", entity.urn, shape);
                    skipped.push(entity.urn.clone());
                }
                continue;
            }
            if !wearable_keys.contains(&entity.urn) {
                warn!("⚠️ {} requested as the emote is a {:?}, skipping", entity.urn, entity.entity_type);
                skipped.push(entity.urn.clone());
                continue;
            }
        }

        match entity.entity_type {
            EntityType::Body => {
                debug!("Body shape {} listed as a wearable, ignoring", entity.urn);
                continue;
            }
            EntityType::Emote => {
                warn!("⚠️ Emote {} listed as a wearable, ignoring", entity.urn);
                skipped.push(entity.urn.clone());
                continue;
            }
            EntityType::Wearable | EntityType::FacialFeature => {}
        }

        if !entity.supports(shape) {
            warn!("⚠️ {} has no {} representation, skipping", entity.urn, shape);
            skipped.push(entity.urn.clone());
            continue;
        }
        entities.push(entity);
    }

    Ok(Composition { entities, emote, skipped })
}

/// Load every job, all or nothing
async fn load_all<L: AssetLoader>(
    loader: Arc<L>,
    limits: LoadLimits,
    shape: BodyShape,
    jobs: Vec<Arc<EntityDefinition>>,
) -> AvatarResult<Vec<(Arc<EntityDefinition>, LoadedAsset)>> {
    if jobs.is_empty() {
        return Ok(Vec::new());
    }
    info!(
        "⏳ Loading {} assets ({})",
        jobs.len(),
        if limits.sequential { "sequential" } else { "concurrent" }
    );

    if limits.sequential {
        let mut results = Vec::with_capacity(jobs.len());
        for entity in jobs {
            let asset = loader.load_entity(shape, &entity).await?;
            results.push((entity, asset));
        }
        return Ok(results);
    }

    let semaphore = Arc::new(Semaphore::new(limits.max_concurrent));
    let mut tasks = JoinSet::new();
    for (index, entity) in jobs.into_iter().enumerate() {
        let loader = Arc::clone(&loader);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => loader.load_entity(shape, &entity).await,
                Err(e) => Err(AvatarError::Task(e.to_string())),
            };
            (index, entity, result)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, entity, result) = joined.map_err(|e| AvatarError::Task(e.to_string()))?;
        match result {
            Ok(asset) => results.push((index, entity, asset)),
            Err(e) => {
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    results.sort_by_key(|(index, _, _)| *index);
    Ok(results.into_iter().map(|(_, entity, asset)| (entity, asset)).collect())
}

fn check_unique_categories(entities: &[Arc<EntityDefinition>]) -> AvatarResult<()> {
    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
    for entity in entities {
        if let Some(first) = seen.insert(&entity.category, &entity.urn) {
            return Err(AvatarError::CompositionConflict {
                category: entity.category.clone(),
                first: first.to_string(),
                second: entity.urn.clone(),
            });
        }
    }
    Ok(())
}

fn distinct_categories(state: &OrchestratorState) -> bool {
    let mut seen = HashSet::new();
    state
        .loaded_models
        .values()
        .map(|model| &model.entity.category)
        .chain(state.loaded_facial_features.values().map(|f| &f.entity.category))
        .all(|category| seen.insert(category))
}

fn facial_material(material_name: &str, category: &str) -> bool {
    material_name.to_ascii_lowercase().contains(category)
}

/// Body part category of a base body mesh, judged by its node name
fn body_part_of(node_name: &str) -> Option<&'static str> {
    const PARTS: [(&str, &str); 5] = [
        ("ubody", category::UPPER_BODY),
        ("lbody", category::LOWER_BODY),
        ("feet", category::FEET),
        ("hands", category::HANDS),
        ("head", category::HEAD),
    ];
    let name = node_name.to_ascii_lowercase();
    PARTS
        .iter()
        .find(|(token, _)| name.contains(token))
        .map(|(_, part)| *part)
}

/// Hide base body meshes whose category is hidden or worn over
fn apply_body_part_visibility(
    body: &mut SceneNode,
    hidden: &BTreeSet<String>,
    occupied: &BTreeSet<String>,
) {
    body.visit_mut(&mut |node| {
        if let Some(part) = body_part_of(&node.name) {
            node.active = !(hidden.contains(part) || occupied.contains(part));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Representation;

    fn entity(urn: &str, category: &str) -> Arc<EntityDefinition> {
        Arc::new(
            EntityDefinition::new(urn, category, EntityType::Wearable)
                .with_shared_representation(Representation::new("model.glb", "Qm")),
        )
    }

    #[test]
    fn duplicate_categories_conflict() {
        let err = check_unique_categories(&[entity("urn:a", "hat"), entity("urn:b", "hat")]).unwrap_err();
        match err {
            AvatarError::CompositionConflict { category, first, second } => {
                assert_eq!(category, "hat");
                assert_eq!(first, "urn:a");
                assert_eq!(second, "urn:b");
            }
            other => panic!("unexpected error {other:?}"),
        }

        assert!(check_unique_categories(&[entity("urn:a", "hat"), entity("urn:b", "hair")]).is_ok());
    }

    #[test]
    fn body_parts_are_recognized_by_name() {
        assert_eq!(body_part_of("M_uBody_BaseMesh"), Some("upper_body"));
        assert_eq!(body_part_of("F_lBody_BaseMesh"), Some("lower_body"));
        assert_eq!(body_part_of("M_Feet_BaseMesh"), Some("feet"));
        assert_eq!(body_part_of("M_Hands_BaseMesh"), Some("hands"));
        assert_eq!(body_part_of("M_Head_BaseMesh"), Some("head"));
        assert_eq!(body_part_of("Armature"), None);
    }

    #[test]
    fn body_parts_follow_hidden_and_occupied() {
        let mut body = SceneNode::new("body")
            .with_child(SceneNode::new("M_uBody_BaseMesh"))
            .with_child(SceneNode::new("M_Feet_BaseMesh"))
            .with_child(SceneNode::new("M_Head_BaseMesh"));

        let hidden: BTreeSet<String> = ["head".to_string()].into();
        let occupied: BTreeSet<String> = ["feet".to_string()].into();
        apply_body_part_visibility(&mut body, &hidden, &occupied);

        assert!(body.find("M_uBody_BaseMesh").unwrap().active);
        assert!(!body.find("M_Feet_BaseMesh").unwrap().active);
        assert!(!body.find("M_Head_BaseMesh").unwrap().active);
    }

    #[test]
    fn request_builder_lowercases_forced_categories() {
        let request = AvatarRequest::new(BodyShape::Female)
            .with_wearables(["urn:hat"])
            .with_emote("urn:wave")
            .with_force_visible(["Hair"]);

        assert_eq!(request.wearables, vec!["urn:hat".to_string()]);
        assert_eq!(request.emote.as_deref(), Some("urn:wave"));
        assert!(request.force_visible.contains("hair"));
    }
}
