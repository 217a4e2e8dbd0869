//! Entity catalog
//!
//! Process-wide, append-only cache from canonical URN to resolved
//! [`EntityDefinition`]. Construct one at startup, share it as an `Arc`
//! and inject it into every orchestrator that needs it.

use crate::avatar::{AvatarError, AvatarResult};
use crate::content::ContentService;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

pub mod category;
pub mod types;
pub mod urn;

pub use types::{BodyShape, EntityDefinition, EntityType, Representation};

/// Catalog usage statistics
#[derive(Debug, Default, Clone)]
pub struct CatalogStats {
    pub requests: u64,
    pub hits: u64,
    pub fetched: u64,
    pub dropped: u64,
    pub batches: u64,
}

impl CatalogStats {
    /// Calculate hit ratio as percentage
    pub fn hit_ratio(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            (self.hits as f64 / self.requests as f64) * 100.0
        }
    }
}

pub struct EntityCatalog {
    service: Arc<dyn ContentService>,
    entries: RwLock<HashMap<String, Arc<EntityDefinition>>>,
    /// Serializes batch fetches so concurrent misses share one request
    fetch_lock: Mutex<()>,
    stats: RwLock<CatalogStats>,
}

impl std::fmt::Debug for EntityCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCatalog")
            .field("service", &"dyn ContentService")
            .finish()
    }
}

impl EntityCatalog {
    pub fn new(service: Arc<dyn ContentService>) -> Self {
        info!("🗄️ Initializing entity catalog");

        Self {
            service,
            entries: RwLock::new(HashMap::new()),
            fetch_lock: Mutex::new(()),
            stats: RwLock::new(CatalogStats::default()),
        }
    }

    /// Resolve URNs to definitions, in input order and without duplicates.
    ///
    /// URNs the content server does not know are logged and left out, so the
    /// result may be shorter than the input.
    pub async fn resolve(&self, urns: &[String]) -> Vec<Arc<EntityDefinition>> {
        let mut seen = HashSet::new();
        let keys: Vec<String> = urns
            .iter()
            .map(|u| urn::normalize(u))
            .filter(|k| seen.insert(k.clone()))
            .collect();

        let missing = self.missing(&keys).await;
        {
            let mut stats = self.stats.write().await;
            stats.requests += keys.len() as u64;
            stats.hits += (keys.len() - missing.len()) as u64;
        }

        if !missing.is_empty() {
            let _guard = self.fetch_lock.lock().await;
            // Another resolve may have fetched these while we waited
            let missing = self.missing(&missing).await;
            if !missing.is_empty() {
                self.fetch(&missing).await;
            }
        }

        let entries = self.entries.read().await;
        keys.iter().filter_map(|key| entries.get(key).cloned()).collect()
    }

    /// Resolve a single URN
    pub async fn resolve_one(&self, urn: &str) -> Option<Arc<EntityDefinition>> {
        self.resolve(&[urn.to_string()]).await.into_iter().next()
    }

    /// Pre-resolve both base body shapes. Must succeed before any avatar load.
    pub async fn warm_up(&self) -> AvatarResult<()> {
        let urns = [BodyShape::MALE_URN.to_string(), BodyShape::FEMALE_URN.to_string()];
        let resolved = self.resolve(&urns).await;
        if resolved.len() != urns.len() {
            let found: HashSet<&str> = resolved.iter().map(|d| d.urn.as_str()).collect();
            let missing = urns
                .iter()
                .map(|u| urn::normalize(u))
                .filter(|k| !found.contains(k.as_str()))
                .collect();
            return Err(AvatarError::ResolutionFailure { missing });
        }

        info!("✅ Catalog warmed up with base body shapes");
        Ok(())
    }

    /// Body entity for a shape; requires [`EntityCatalog::warm_up`]
    pub async fn get_body_entity(&self, shape: BodyShape) -> AvatarResult<Arc<EntityDefinition>> {
        let key = urn::normalize(shape.urn());
        let entries = self.entries.read().await;
        entries
            .get(&key)
            .cloned()
            .ok_or(AvatarError::ResolutionFailure { missing: vec![key] })
    }

    pub async fn contains(&self, urn: &str) -> bool {
        self.entries.read().await.contains_key(&urn::normalize(urn))
    }

    pub async fn cached_count(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn stats(&self) -> CatalogStats {
        self.stats.read().await.clone()
    }

    async fn missing(&self, keys: &[String]) -> Vec<String> {
        let entries = self.entries.read().await;
        keys.iter().filter(|k| !entries.contains_key(*k)).cloned().collect()
    }

    async fn fetch(&self, keys: &[String]) {
        debug!("📋 Fetching {} uncached entities", keys.len());

        let entities = match self.service.resolve_active_entities(keys).await {
            Ok(entities) => entities,
            Err(e) => {
                error!("❌ Entity resolution batch failed: {}", e);
                let mut stats = self.stats.write().await;
                stats.batches += 1;
                stats.dropped += keys.len() as u64;
                return;
            }
        };

        let wanted: HashSet<&str> = keys.iter().map(String::as_str).collect();
        let mut resolved: HashMap<String, Arc<EntityDefinition>> = HashMap::new();

        for entity in &entities {
            let candidates = entity
                .pointers
                .iter()
                .map(String::as_str)
                .chain(entity.metadata.as_ref().map(|m| m.id.as_str()));

            for pointer in candidates {
                let key = urn::normalize(pointer);
                if !wanted.contains(key.as_str()) || resolved.contains_key(&key) {
                    continue;
                }
                match EntityDefinition::from_metadata(&key, entity) {
                    Some(definition) => {
                        resolved.insert(key, Arc::new(definition));
                    }
                    None => warn!("⚠️ Entity {} has no wearable or emote metadata", key),
                }
            }
        }

        let dropped: Vec<&String> = keys.iter().filter(|k| !resolved.contains_key(*k)).collect();
        for key in &dropped {
            warn!("⚠️ Could not resolve entity {}", key);
        }

        {
            let mut stats = self.stats.write().await;
            stats.batches += 1;
            stats.fetched += resolved.len() as u64;
            stats.dropped += dropped.len() as u64;
        }

        let count = resolved.len();
        self.entries.write().await.extend(resolved);
        info!("📦 Cached {} entities ({} dropped)", count, dropped.len());
    }
}
