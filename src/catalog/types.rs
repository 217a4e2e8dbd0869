//! Entity definitions as the composer sees them
//!
//! Built once from the content server's metadata and shared as
//! `Arc<EntityDefinition>` for the rest of the session.

use super::category;
use super::urn;
use crate::content::{EntityMetadata, RepresentationMetadata};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Base body variant an avatar is built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BodyShape {
    Male,
    Female,
}

impl BodyShape {
    pub const MALE_URN: &'static str = "urn:decentraland:off-chain:base-avatars:BaseMale";
    pub const FEMALE_URN: &'static str = "urn:decentraland:off-chain:base-avatars:BaseFemale";

    pub fn urn(self) -> &'static str {
        match self {
            BodyShape::Male => Self::MALE_URN,
            BodyShape::Female => Self::FEMALE_URN,
        }
    }

    pub fn from_urn(value: &str) -> Option<Self> {
        let key = urn::normalize(value);
        if key == urn::normalize(Self::MALE_URN) {
            Some(BodyShape::Male)
        } else if key == urn::normalize(Self::FEMALE_URN) {
            Some(BodyShape::Female)
        } else {
            None
        }
    }

    pub fn other(self) -> Self {
        match self {
            BodyShape::Male => BodyShape::Female,
            BodyShape::Female => BodyShape::Male,
        }
    }
}

impl fmt::Display for BodyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyShape::Male => write!(f, "male"),
            BodyShape::Female => write!(f, "female"),
        }
    }
}

impl FromStr for BodyShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(BodyShape::Male),
            "female" | "f" => Ok(BodyShape::Female),
            other => BodyShape::from_urn(other).ok_or_else(|| format!("unknown body shape: {}", s)),
        }
    }
}

/// Kind of entity, each with its own loading path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Body,
    Wearable,
    FacialFeature,
    Emote,
}

impl EntityType {
    fn for_category(category: &str, is_emote: bool) -> Self {
        if is_emote {
            EntityType::Emote
        } else if category == category::BODY_SHAPE {
            EntityType::Body
        } else if category::is_facial_feature(category) {
            EntityType::FacialFeature
        } else {
            EntityType::Wearable
        }
    }
}

/// Payload descriptor for one body shape
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Representation {
    /// Logical file name -> content locator
    pub files: BTreeMap<String, String>,
    pub main_file: String,
    pub hides: BTreeSet<String>,
    pub removes_default_hiding: BTreeSet<String>,
}

impl Representation {
    pub fn new(main_file: impl Into<String>, main_locator: impl Into<String>) -> Self {
        let main_file = main_file.into();
        let mut files = BTreeMap::new();
        files.insert(main_file.clone(), main_locator.into());
        Self {
            files,
            main_file,
            ..Default::default()
        }
    }

    pub fn with_file(mut self, name: impl Into<String>, locator: impl Into<String>) -> Self {
        self.files.insert(name.into(), locator.into());
        self
    }

    pub fn with_hides<I, S>(mut self, hides: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hides.extend(hides.into_iter().map(Into::into));
        self
    }

    pub fn with_removes_default_hiding<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.removes_default_hiding.extend(categories.into_iter().map(Into::into));
        self
    }

    /// Locator of the entry point file
    pub fn main_locator(&self) -> Option<&str> {
        self.files.get(&self.main_file).map(String::as_str)
    }

    /// First file whose name ends with `suffix` (case-insensitive)
    pub fn file_ending_with(&self, suffix: &str) -> Option<(&str, &str)> {
        let suffix = suffix.to_ascii_lowercase();
        self.files
            .iter()
            .find(|(name, _)| name.to_ascii_lowercase().ends_with(&suffix))
            .map(|(name, locator)| (name.as_str(), locator.as_str()))
    }

    /// Companion files, i.e. everything except the main file
    pub fn companions(&self) -> BTreeMap<String, String> {
        self.files
            .iter()
            .filter(|(name, _)| **name != self.main_file)
            .map(|(name, locator)| (name.clone(), locator.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDefinition {
    /// Canonical (normalized) URN
    pub urn: String,
    pub name: String,
    pub category: String,
    pub entity_type: EntityType,
    pub thumbnail: Option<String>,
    /// Emotes only
    pub looping: bool,
    pub male: Option<Representation>,
    pub female: Option<Representation>,
}

impl EntityDefinition {
    pub fn new(urn: &str, category: &str, entity_type: EntityType) -> Self {
        Self {
            urn: urn::normalize(urn),
            name: String::new(),
            category: category.to_ascii_lowercase(),
            entity_type,
            thumbnail: None,
            looping: false,
            male: None,
            female: None,
        }
    }

    pub fn with_representation(mut self, shape: BodyShape, representation: Representation) -> Self {
        match shape {
            BodyShape::Male => self.male = Some(representation),
            BodyShape::Female => self.female = Some(representation),
        }
        self
    }

    /// Same representation for both body shapes
    pub fn with_shared_representation(self, representation: Representation) -> Self {
        self.with_representation(BodyShape::Male, representation.clone())
            .with_representation(BodyShape::Female, representation)
    }

    pub fn representation(&self, shape: BodyShape) -> Option<&Representation> {
        match shape {
            BodyShape::Male => self.male.as_ref(),
            BodyShape::Female => self.female.as_ref(),
        }
    }

    pub fn supports(&self, shape: BodyShape) -> bool {
        self.representation(shape).is_some()
    }

    /// Copy of the hide list for a body shape
    pub fn hides(&self, shape: BodyShape) -> BTreeSet<String> {
        self.representation(shape)
            .map(|r| r.hides.clone())
            .unwrap_or_default()
    }

    pub fn removes_default_hiding(&self, shape: BodyShape, category: &str) -> bool {
        self.representation(shape)
            .map(|r| r.removes_default_hiding.contains(category))
            .unwrap_or(false)
    }

    /// Build a definition from an active deployment. Returns `None` when the
    /// deployment carries neither wearable nor emote metadata.
    pub fn from_metadata(requested_urn: &str, entity: &EntityMetadata) -> Option<Self> {
        let metadata = entity.metadata.as_ref()?;

        let (category, representations, looping, base_hides, base_removes) =
            if let Some(emote) = &metadata.emote_data {
                (emote.category.clone(), &emote.representations, emote.looping, BTreeSet::new(), BTreeSet::new())
            } else if let Some(data) = &metadata.data {
                let base_hides = lowercase_set(data.hides.iter().chain(data.replaces.iter()));
                let base_removes = lowercase_set(data.removes_default_hiding.iter());
                (data.category.clone(), &data.representations, false, base_hides, base_removes)
            } else {
                return None;
            };

        let category = category.to_ascii_lowercase();
        let entity_type = EntityType::for_category(&category, metadata.emote_data.is_some());

        let mut definition = EntityDefinition::new(requested_urn, &category, entity_type);
        definition.name = metadata.name.clone();
        definition.looping = looping;
        definition.thumbnail = metadata.thumbnail.as_ref().map(|file| {
            entity.hash_of(file).map(str::to_string).unwrap_or_else(|| file.clone())
        });

        for rep in representations {
            let representation = build_representation(entity, rep, &base_hides, &base_removes);
            for shape in rep.body_shapes.iter().filter_map(|urn| BodyShape::from_urn(urn)) {
                definition = definition.with_representation(shape, representation.clone());
            }
        }

        Some(definition)
    }
}

fn lowercase_set<'a>(values: impl Iterator<Item = &'a String>) -> BTreeSet<String> {
    values.map(|v| v.to_ascii_lowercase()).collect()
}

fn build_representation(
    entity: &EntityMetadata,
    rep: &RepresentationMetadata,
    base_hides: &BTreeSet<String>,
    base_removes: &BTreeSet<String>,
) -> Representation {
    let files: BTreeMap<String, String> = if rep.contents.is_empty() {
        entity.content.iter().map(|c| (c.file.clone(), c.hash.clone())).collect()
    } else {
        rep.contents
            .iter()
            .filter_map(|file| entity.hash_of(file).map(|hash| (file.clone(), hash.to_string())))
            .collect()
    };

    // Override lists win over the item-level lists when present
    let overrides = lowercase_set(
        rep.override_hides.iter().flatten().chain(rep.override_replaces.iter().flatten()),
    );
    let hides = if overrides.is_empty() { base_hides.clone() } else { overrides };

    let removes_default_hiding = match &rep.removes_default_hiding {
        Some(list) => lowercase_set(list.iter()),
        None => base_removes.clone(),
    };

    Representation {
        files,
        main_file: rep.main_file.clone(),
        hides,
        removes_default_hiding,
    }
}
