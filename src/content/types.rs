//! Wire types returned by the content server's active-entities endpoint
//!
//! Only the fields the catalog consumes are modelled; everything else the
//! server sends is ignored by serde.

use serde::{Deserialize, Serialize};

/// One active entity as returned by `POST /content/entities/active`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    /// Content-addressed id of the deployment
    pub id: String,
    #[serde(rename = "type", default)]
    pub entity_type: String,
    /// URNs this deployment is active for
    #[serde(default)]
    pub pointers: Vec<String>,
    #[serde(default)]
    pub content: Vec<ContentFile>,
    pub metadata: Option<ItemMetadata>,
}

impl EntityMetadata {
    /// Look up the content hash for a logical file name
    pub fn hash_of(&self, file: &str) -> Option<&str> {
        self.content
            .iter()
            .find(|entry| entry.file.eq_ignore_ascii_case(file))
            .map(|entry| entry.hash.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFile {
    pub file: String,
    pub hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub thumbnail: Option<String>,
    /// Present on wearables
    pub data: Option<WearableData>,
    /// Present on emotes
    #[serde(rename = "emoteDataADR74")]
    pub emote_data: Option<EmoteData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WearableData {
    pub category: String,
    #[serde(default)]
    pub hides: Vec<String>,
    #[serde(default)]
    pub replaces: Vec<String>,
    #[serde(default)]
    pub removes_default_hiding: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub representations: Vec<RepresentationMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmoteData {
    pub category: String,
    #[serde(rename = "loop", default)]
    pub looping: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub representations: Vec<RepresentationMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepresentationMetadata {
    #[serde(default)]
    pub body_shapes: Vec<String>,
    pub main_file: String,
    #[serde(default)]
    pub contents: Vec<String>,
    pub override_hides: Option<Vec<String>>,
    pub override_replaces: Option<Vec<String>>,
    /// Some deployments carry this per representation instead of on `data`
    pub removes_default_hiding: Option<Vec<String>>,
}
