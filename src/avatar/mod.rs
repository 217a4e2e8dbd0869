//! Avatar composition
//!
//! Turns a requested outfit into a fully composed avatar: visibility
//! resolution, diffing against what is already loaded, concurrent loading
//! and a single synchronous commit into the scene.

use crate::catalog::{BodyShape, EntityDefinition};
use std::fmt::Display;
use thiserror::Error;

pub mod colors;
pub mod diff;
pub mod orchestrator;
pub mod slot;
pub mod state;
pub mod visibility;

pub use colors::{AvatarColors, Color};
pub use diff::{diff_composition, CompositionPlan, EmoteChange};
pub use orchestrator::{AvatarOrchestrator, AvatarRequest, LoadReport};
pub use slot::AvatarSlot;
pub use state::{LoadPhase, OrchestratorState};
pub use visibility::resolve_hidden;

/// Avatar composition errors
#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("Could not resolve entities: {}", missing.join(", "))]
    ResolutionFailure { missing: Vec<String> },

    #[error("Failed to load {urn}: {reason}")]
    LoadFailure { urn: String, reason: String },

    #[error("{urn} has no representation for the {shape} body shape")]
    RepresentationMissing { urn: String, shape: BodyShape },

    #[error("Malformed asset {urn}: {reason}")]
    StructuralAnomaly { urn: String, reason: String },

    #[error("Category {category} requested twice ({first} and {second})")]
    CompositionConflict {
        category: String,
        first: String,
        second: String,
    },

    #[error("Load task failed: {0}")]
    Task(String),
}

impl AvatarError {
    pub fn load_failure(urn: &str, reason: impl Display) -> Self {
        Self::LoadFailure {
            urn: urn.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Identifier of the entity the error is about, if any
    pub fn urn(&self) -> Option<&str> {
        match self {
            Self::LoadFailure { urn, .. }
            | Self::RepresentationMissing { urn, .. }
            | Self::StructuralAnomaly { urn, .. } => Some(urn),
            _ => None,
        }
    }
}

pub type AvatarResult<T> = Result<T, AvatarError>;

/// Body shape to preview a single entity on.
///
/// Keeps `preferred` when the entity supports it, otherwise falls back to the
/// other shape.
pub fn preview_body_shape(entity: &EntityDefinition, preferred: BodyShape) -> AvatarResult<BodyShape> {
    [preferred, preferred.other()]
        .into_iter()
        .find(|shape| entity.supports(*shape))
        .ok_or_else(|| AvatarError::RepresentationMissing {
            urn: entity.urn.clone(),
            shape: preferred,
        })
}
