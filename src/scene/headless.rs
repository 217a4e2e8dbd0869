use super::{AnimationPlayback, AvatarScene, NodeId, SceneNode};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::debug;

struct Entry {
    parent: Option<NodeId>,
    node: SceneNode,
}

/// In-memory scene with no renderer behind it
pub struct HeadlessScene {
    entries: BTreeMap<NodeId, Entry>,
    playback: BTreeMap<NodeId, AnimationPlayback>,
    root: NodeId,
    next_id: u64,
    destroyed: usize,
}

impl HeadlessScene {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut entries = BTreeMap::new();
        entries.insert(root, Entry { parent: None, node: SceneNode::new("AvatarRoot") });

        Self {
            entries,
            playback: BTreeMap::new(),
            root,
            next_id: 1,
            destroyed: 0,
        }
    }

    /// Attached nodes, root excluded
    pub fn attached_count(&self) -> usize {
        self.entries.len() - 1
    }

    /// Number of renderables destroyed over the scene's lifetime
    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }

    pub fn children_of(&self, parent: NodeId) -> Vec<NodeId> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.parent == Some(parent))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn playback(&self, target: NodeId) -> Option<&AnimationPlayback> {
        self.playback.get(&target)
    }

    /// Names of the attached renderables directly under the root
    pub fn attached_names(&self) -> Vec<String> {
        self.children_of(self.root)
            .into_iter()
            .filter_map(|id| self.node(id).map(|n| n.name.clone()))
            .collect()
    }

    /// Human-readable dump of the scene
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        self.render_attached(self.root, 0, &mut out);
        out
    }

    fn render_attached(&self, id: NodeId, depth: usize, out: &mut String) {
        if let Some(entry) = self.entries.get(&id) {
            render_node(&entry.node, depth, out);
        }
        for child in self.children_of(id) {
            self.render_attached(child, depth + 1, out);
        }
    }
}

fn render_node(node: &SceneNode, depth: usize, out: &mut String) {
    let marker = if node.active { "" } else { " (hidden)" };
    let _ = writeln!(out, "{}{}{}", "  ".repeat(depth), node.name, marker);
    for material in &node.materials {
        let state = if material.enabled { "" } else { " (disabled)" };
        let _ = writeln!(out, "{}  · {}{}", "  ".repeat(depth), material.name, state);
    }
    for child in &node.children {
        render_node(child, depth + 1, out);
    }
}

impl Default for HeadlessScene {
    fn default() -> Self {
        Self::new()
    }
}

impl AvatarScene for HeadlessScene {
    fn root(&self) -> NodeId {
        self.root
    }

    fn attach(&mut self, parent: NodeId, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        debug!("🧩 Attaching {} as {:?} under {:?}", node.name, id, parent);
        self.entries.insert(id, Entry { parent: Some(parent), node });
        id
    }

    fn destroy(&mut self, node: NodeId) -> Option<SceneNode> {
        if node == self.root {
            return None;
        }
        for child in self.children_of(node) {
            self.destroy(child);
        }
        self.playback.remove(&node);
        let entry = self.entries.remove(&node)?;
        self.destroyed += 1;
        debug!("🗑️ Destroyed {} ({:?})", entry.node.name, node);
        Some(entry.node)
    }

    fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.entries.get(&id).map(|entry| &entry.node)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.entries.get_mut(&id).map(|entry| &mut entry.node)
    }

    fn play_animation(&mut self, target: NodeId, playback: &AnimationPlayback) {
        self.playback.insert(target, playback.clone());
    }
}
