//! Model import capability
//!
//! Decoding the binary asset format is delegated to a [`ModelImporter`].
//! [`GltfImporter`] reads GLB/GLTF documents with the `gltf` crate and keeps
//! only what composition needs: the node tree, mesh material names and the
//! named animation clips.

use crate::config::TextureSettings;
use crate::scene::{AnimationClip, Material, SceneNode};
use async_trait::async_trait;
use bytes::Bytes;
use glam::{Vec3, Vec4};
use std::collections::BTreeMap;
use tracing::debug;

/// Animation playback system the imported clips target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationMode {
    /// Clips address bones by name under a conventional skeleton root
    Legacy,
    Humanoid,
}

#[derive(Debug, Clone)]
pub struct ImportRequest<'a> {
    pub main_file: &'a str,
    pub data: Bytes,
    /// Companion file name -> content locator
    pub companions: &'a BTreeMap<String, String>,
    pub animation_mode: AnimationMode,
    pub texture: TextureSettings,
}

#[derive(Debug, Clone)]
pub struct ImportedModel {
    pub root: SceneNode,
    pub clips: Vec<AnimationClip>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to decode {file}: {reason}")]
    Decode { file: String, reason: String },

    #[error("{file} references {uri}, which is not part of the entity's content")]
    MissingCompanion { file: String, uri: String },

    #[error("Import task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait ModelImporter: Send + Sync {
    async fn import(&self, request: ImportRequest<'_>) -> Result<ImportedModel, ImportError>;
}

/// Structural GLB/GLTF importer
#[derive(Debug, Clone, Default)]
pub struct GltfImporter;

impl GltfImporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModelImporter for GltfImporter {
    async fn import(&self, request: ImportRequest<'_>) -> Result<ImportedModel, ImportError> {
        let main_file = request.main_file.to_string();
        let companions: Vec<String> = request.companions.keys().cloned().collect();
        let data = request.data;

        // Parsing is CPU-bound, keep it off the I/O workers
        tokio::task::spawn_blocking(move || decode_document(&main_file, &data, &companions))
            .await
            .map_err(|e| ImportError::Task(e.to_string()))?
    }
}

fn decode_document(main_file: &str, data: &[u8], companions: &[String]) -> Result<ImportedModel, ImportError> {
    let gltf = gltf::Gltf::from_slice(data).map_err(|e| ImportError::Decode {
        file: main_file.to_string(),
        reason: e.to_string(),
    })?;
    let document = &gltf.document;

    for buffer in document.buffers() {
        if let gltf::buffer::Source::Uri(uri) = buffer.source() {
            check_companion(main_file, uri, companions)?;
        }
    }
    for image in document.images() {
        if let gltf::image::Source::Uri { uri, .. } = image.source() {
            check_companion(main_file, uri, companions)?;
        }
    }

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| ImportError::Decode {
            file: main_file.to_string(),
            reason: "document has no scene".to_string(),
        })?;

    let mut root = SceneNode::new(scene.name().unwrap_or("Scene"));
    root.children = scene.nodes().map(|node| convert_node(&node)).collect();

    let clips: Vec<AnimationClip> = document
        .animations()
        .map(|animation| {
            let name = animation
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Animation{}", animation.index()));
            AnimationClip::new(name, clip_duration(&animation))
        })
        .collect();

    debug!(
        "📦 Imported {}: {} nodes, {} clips",
        main_file,
        root.node_count(),
        clips.len()
    );

    Ok(ImportedModel { root, clips })
}

fn check_companion(main_file: &str, uri: &str, companions: &[String]) -> Result<(), ImportError> {
    if uri.starts_with("data:") {
        return Ok(());
    }
    let wanted = uri.rsplit('/').next().unwrap_or(uri).to_ascii_lowercase();
    let present = companions.iter().any(|name| {
        let file = name.rsplit('/').next().unwrap_or(name);
        file.eq_ignore_ascii_case(&wanted)
    });
    if present {
        Ok(())
    } else {
        Err(ImportError::MissingCompanion {
            file: main_file.to_string(),
            uri: uri.to_string(),
        })
    }
}

fn convert_node(node: &gltf::Node) -> SceneNode {
    let (_, _, scale) = node.transform().decomposed();
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Node{}", node.index()));
    let mut out = SceneNode::new(name).with_scale(Vec3::from(scale));

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            let material = primitive.material();
            let material_name = material.name().unwrap_or("Material");
            if out.materials.iter().any(|m| m.name == material_name) {
                continue;
            }
            let mut slot = Material::new(material_name);
            slot.color = Vec4::from(material.pbr_metallic_roughness().base_color_factor());
            out.materials.push(slot);
        }
    }

    out.children = node.children().map(|child| convert_node(&child)).collect();
    out
}

/// Clip length from the largest sampler input bound
fn clip_duration(animation: &gltf::Animation) -> f32 {
    animation
        .samplers()
        .filter_map(|sampler| sampler.input().max())
        .filter_map(|max| max.as_array().and_then(|values| values.first()).and_then(|v| v.as_f64()))
        .fold(0.0_f64, f64::max) as f32
}
