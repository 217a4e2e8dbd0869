//! Structural normalization of imported models
//!
//! Authored assets do not reliably follow their own conventions. After
//! sanitizing, every model has a unit root scale, no redundant wrapper group,
//! and its skeleton root is named [`SKELETON_ROOT`] so legacy clips can bind.

use crate::scene::SceneNode;
use glam::Vec3;
use tracing::debug;

pub const ROOT_SCALE: f32 = 1.0;
pub const SKELETON_ROOT: &str = "Armature";
const HIPS_BONE: &str = "Avatar_Hips";

pub fn sanitize(root: SceneNode) -> SceneNode {
    let mut root = collapse_wrapper(root);
    root.scale = Vec3::splat(ROOT_SCALE);
    rename_skeleton_root(&mut root);
    root
}

fn is_skeleton_root(node: &SceneNode) -> bool {
    node.name.to_ascii_lowercase().starts_with("armature")
        || node.children.iter().any(|child| child.name == HIPS_BONE)
}

/// `Root { Group { a, b } }` becomes `Root { a, b }`
fn collapse_wrapper(mut root: SceneNode) -> SceneNode {
    let redundant = root.is_group()
        && root.children.len() == 1
        && root.children[0].is_group()
        && !root.children[0].children.is_empty()
        && !is_skeleton_root(&root.children[0]);

    if redundant {
        let wrapper = root.children.remove(0);
        debug!("🧹 Collapsing wrapper node {}", wrapper.name);
        root.children = wrapper.children;
    }
    root
}

fn rename_skeleton_root(root: &mut SceneNode) {
    if root.children.iter().any(|child| child.name == SKELETON_ROOT) {
        return;
    }

    if let Some(child) = root.children.iter_mut().find(|child| is_skeleton_root(child)) {
        debug!("🧹 Renaming skeleton root {} to {}", child.name, SKELETON_ROOT);
        child.name = SKELETON_ROOT.to_string();
        return;
    }

    // Deeper hierarchies: the hips bone's parent is the skeleton root
    let mut renamed = false;
    root.visit_mut(&mut |node| {
        if !renamed && node.children.iter().any(|child| child.name == HIPS_BONE) {
            node.name = SKELETON_ROOT.to_string();
            renamed = true;
        }
    });
}
