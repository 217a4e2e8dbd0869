//! Scene attach/detach capability
//!
//! The composer never renders anything itself. Whatever engine hosts the
//! avatar implements [`AvatarScene`]; [`HeadlessScene`] is an in-memory
//! implementation used by the CLI and tests.

pub mod headless;
pub mod node;

pub use headless::HeadlessScene;
pub use node::{AnimationClip, AnimationPlayback, AudioClip, Material, SceneNode, Texture, TextureRef};

/// Handle to a node attached to a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

pub trait AvatarScene: Send {
    /// Transform the avatar is built under
    fn root(&self) -> NodeId;

    /// Parent a renderable under `parent`
    fn attach(&mut self, parent: NodeId, node: SceneNode) -> NodeId;

    /// Detach and destroy a renderable together with everything attached
    /// under it. Returns the destroyed tree.
    fn destroy(&mut self, node: NodeId) -> Option<SceneNode>;

    fn node(&self, id: NodeId) -> Option<&SceneNode>;

    fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode>;

    fn set_active(&mut self, id: NodeId, active: bool) {
        if let Some(node) = self.node_mut(id) {
            node.active = active;
        }
    }

    /// Drive the animator of the renderable at `target`
    fn play_animation(&mut self, target: NodeId, playback: &AnimationPlayback);
}
