//! Visibility resolution
//!
//! Decides which categories of the avatar are hidden for a set of equipped
//! entities. Pure: the resolver copies every hide list it reads and performs
//! no I/O, so equal inputs always give equal outputs.

use crate::catalog::category;
use crate::catalog::{BodyShape, EntityDefinition};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{trace, warn};

/// Hide requests of one equipped entity
#[derive(Debug, Clone)]
struct HideRequest {
    urn: String,
    category: String,
    hides: BTreeSet<String>,
}

fn hide_request(shape: BodyShape, entity: &EntityDefinition) -> HideRequest {
    let mut hides = entity.hides(shape);
    if hides.remove(&entity.category) {
        warn!("⚠️ {} asks to hide its own category {}, ignoring", entity.urn, entity.category);
    }
    HideRequest {
        urn: entity.urn.clone(),
        category: entity.category.clone(),
        hides,
    }
}

/// Visit order: priority list first, then unknown categories in input order
fn ordered(requests: Vec<HideRequest>) -> Vec<HideRequest> {
    let (mut known, unknown): (Vec<_>, Vec<_>) = requests
        .into_iter()
        .partition(|r| category::priority_of(&r.category).is_some());
    known.sort_by_key(|r| category::priority_of(&r.category));
    known.extend(unknown);
    known
}

fn hides_hands(shape: BodyShape, entity: &EntityDefinition) -> bool {
    let covers_upper_body = entity.category == category::UPPER_BODY
        || entity.hides(shape).contains(category::UPPER_BODY);
    covers_upper_body && !entity.removes_default_hiding(shape, category::HANDS)
}

/// Hidden categories for a composition.
///
/// Higher-priority items win conflicts: an item whose own category is already
/// hidden by a higher-priority item loses its vote, including the implicit
/// hands and skin rules. `force_visible` always has the last word.
pub fn resolve_hidden(
    shape: BodyShape,
    equipped: &[Arc<EntityDefinition>],
    force_visible: &BTreeSet<String>,
) -> BTreeSet<String> {
    let requests = equipped.iter().map(|entity| hide_request(shape, entity)).collect();

    let mut hidden = BTreeSet::new();
    let mut voided = BTreeSet::new();
    for request in ordered(requests) {
        if hidden.contains(&request.category) {
            trace!("{} is hidden by a higher priority item, its hides are void", request.category);
            voided.insert(request.urn);
            continue;
        }
        hidden.extend(request.hides);
    }

    for entity in equipped.iter().filter(|e| !voided.contains(&e.urn)) {
        if hides_hands(shape, entity) {
            hidden.insert(category::HANDS.to_string());
        }
        if entity.category == category::SKIN {
            hidden.extend(category::SKIN_IMPLICIT_HIDES.iter().map(|c| c.to_string()));
        }
    }

    for category in force_visible {
        hidden.remove(category);
    }

    hidden
}
