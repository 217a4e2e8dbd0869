//! Renderable value types produced by model import
//!
//! A [`SceneNode`] tree is plain data until it is attached to an
//! [`AvatarScene`](super::AvatarScene); loaders build and sanitize trees
//! off-scene so a commit only has to move finished trees into place.

use bytes::Bytes;
use glam::{Vec3, Vec4};
use std::sync::Arc;

/// Decoded texture, shared between materials
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub mipmaps: bool,
    pub data: Bytes,
}

pub type TextureRef = Arc<Texture>;

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: Vec4,
    pub main_texture: Option<TextureRef>,
    pub mask_texture: Option<TextureRef>,
    pub enabled: bool,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Vec4::ONE,
            main_texture: None,
            mask_texture: None,
            enabled: true,
        }
    }

    pub fn with_textures(mut self, main: Option<TextureRef>, mask: Option<TextureRef>) -> Self {
        self.main_texture = main;
        self.mask_texture = mask;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub scale: Vec3,
    pub active: bool,
    /// Materials of the mesh on this node, empty for pure transform nodes
    pub materials: Vec<Material>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scale: Vec3::ONE,
            active: true,
            materials: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.materials.push(material);
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// A node carrying nothing but children
    pub fn is_group(&self) -> bool {
        self.materials.is_empty()
    }

    /// Depth-first search by exact name
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(name))
    }

    /// Visit this node and every descendant, depth-first
    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut SceneNode)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    pub fn visit(&self, f: &mut dyn FnMut(&SceneNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    /// Visit every material in the tree
    pub fn for_each_material_mut(&mut self, f: &mut dyn FnMut(&mut Material)) {
        self.visit_mut(&mut |node| {
            for material in &mut node.materials {
                f(material);
            }
        });
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Seconds
    pub duration: f32,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self { name: name.into(), duration }
    }
}

/// Raw audio payload of an emote; playback is the host's business
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub file: String,
    pub data: Bytes,
}

/// What the avatar's animator is playing
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPlayback {
    pub clip: String,
    /// Seconds into the clip
    pub time: f32,
    pub looping: bool,
    /// Previous clip to blend out of, if the clip just changed
    pub crossfade_from: Option<String>,
}

impl AnimationPlayback {
    pub const IDLE: &'static str = "Idle";

    pub fn idle() -> Self {
        Self {
            clip: Self::IDLE.to_string(),
            time: 0.0,
            looping: true,
            crossfade_from: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.clip == Self::IDLE
    }
}

impl Default for AnimationPlayback {
    fn default() -> Self {
        Self::idle()
    }
}
