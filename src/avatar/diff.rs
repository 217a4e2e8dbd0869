//! Composition diffing: what to load, keep and release

use crate::catalog::EntityDefinition;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum EmoteChange {
    /// Loaded emote (or its absence) stays as is
    Keep,
    Load(Arc<EntityDefinition>),
    /// Drop the loaded emote and go back to idle
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositionPlan {
    pub to_load: Vec<Arc<EntityDefinition>>,
    pub to_keep: Vec<String>,
    pub to_release: Vec<String>,
    pub emote: EmoteChange,
}

impl CompositionPlan {
    /// Nothing to fetch and nothing to release
    pub fn is_noop(&self) -> bool {
        self.to_load.is_empty() && self.to_release.is_empty() && self.emote == EmoteChange::Keep
    }
}

/// Partition `target` against the currently loaded identifiers.
///
/// A body shape change invalidates everything: nothing is kept, every loaded
/// identifier is released and the emote reloads.
pub fn diff_composition(
    loaded: &BTreeSet<String>,
    target: &[Arc<EntityDefinition>],
    body_shape_changed: bool,
    loaded_emote: Option<&str>,
    target_emote: Option<&Arc<EntityDefinition>>,
) -> CompositionPlan {
    let wanted: BTreeSet<&str> = target.iter().map(|e| e.urn.as_str()).collect();

    let (to_load, to_keep) = if body_shape_changed {
        (target.to_vec(), Vec::new())
    } else {
        let (keep, load): (Vec<_>, Vec<_>) = target
            .iter()
            .cloned()
            .partition(|e| loaded.contains(&e.urn));
        (load, keep.into_iter().map(|e| e.urn.clone()).collect())
    };

    let to_release = loaded
        .iter()
        .filter(|urn| body_shape_changed || !wanted.contains(urn.as_str()))
        .cloned()
        .collect();

    let emote = match (loaded_emote, target_emote) {
        (_, Some(next)) if body_shape_changed => EmoteChange::Load(next.clone()),
        (Some(current), Some(next)) if current == next.urn => EmoteChange::Keep,
        (_, Some(next)) => EmoteChange::Load(next.clone()),
        (Some(_), None) => EmoteChange::Clear,
        (None, None) => EmoteChange::Keep,
    };

    CompositionPlan { to_load, to_keep, to_release, emote }
}
