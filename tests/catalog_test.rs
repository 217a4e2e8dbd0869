mod common;

use avatar_composer::avatar::AvatarError;
use avatar_composer::catalog::{BodyShape, EntityCatalog, EntityType};
use common::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn urns(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_resolve_preserves_order_and_dedupes() {
    let service = Arc::new(MemoryContentService::with_wardrobe());
    let catalog = EntityCatalog::new(service.clone());

    let shouted = HAIR.to_uppercase();
    let resolved = catalog
        .resolve(&urns(&[HAIR, HAT, shouted.as_str(), HAIR]))
        .await;
    let keys: Vec<&str> = resolved.iter().map(|d| d.urn.as_str()).collect();
    assert_eq!(keys, vec![key(HAIR).as_str(), key(HAT).as_str()]);
    assert_eq!(service.resolve_calls.load(Ordering::SeqCst), 1);
    assert_eq!(service.requested_batches()[0].len(), 2);
}

#[tokio::test]
async fn test_cached_entities_are_never_refetched() {
    let service = Arc::new(MemoryContentService::with_wardrobe());
    let catalog = EntityCatalog::new(service.clone());

    catalog.resolve(&urns(&[HAT, HAIR])).await;
    catalog.resolve(&urns(&[HAT, HAIR])).await;
    catalog.resolve(&urns(&[HAT, JACKET])).await;

    let batches = service.requested_batches();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[1], vec![key(JACKET)]);

    let stats = catalog.stats().await;
    assert_eq!(stats.requests, 6);
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.fetched, 3);
    assert_eq!(catalog.cached_count().await, 3);
}

#[tokio::test]
async fn test_token_ids_are_stripped() {
    let service = Arc::new(MemoryContentService::with_wardrobe());
    let catalog = EntityCatalog::new(service.clone());

    let with_token = "urn:decentraland:matic:collections-v2:0xabc:7:105312291668557186697918027683670432318895095400549111254310977543";
    service.add_entity(wearable("urn:decentraland:matic:collections-v2:0xabc:7", "earring", &[]));

    let resolved = catalog.resolve_one(with_token).await.unwrap();
    assert_eq!(resolved.urn, "urn:decentraland:matic:collections-v2:0xabc:7");
    assert_eq!(resolved.category, "earring");
    assert!(catalog.contains(with_token).await);
}

#[tokio::test]
async fn test_concurrent_misses_share_one_fetch() {
    let service = Arc::new(MemoryContentService::with_wardrobe());
    service.set_resolve_delay(Duration::from_millis(20));
    let catalog = Arc::new(EntityCatalog::new(service.clone()));

    let a = tokio::spawn({
        let catalog = catalog.clone();
        async move { catalog.resolve(&urns(&[HAT, HAIR])).await.len() }
    });
    let b = tokio::spawn({
        let catalog = catalog.clone();
        async move { catalog.resolve(&urns(&[HAIR, HAT])).await.len() }
    });

    assert_eq!(a.await.unwrap(), 2);
    assert_eq!(b.await.unwrap(), 2);
    assert_eq!(service.resolve_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unknown_entities_are_dropped() {
    let service = Arc::new(MemoryContentService::with_wardrobe());
    let catalog = EntityCatalog::new(service.clone());

    let resolved = catalog
        .resolve(&urns(&[HAT, "urn:decentraland:off-chain:base-avatars:nope"]))
        .await;
    assert_eq!(resolved.len(), 1);
    assert_eq!(catalog.stats().await.dropped, 1);
}

#[tokio::test]
async fn test_failed_batch_yields_cached_results_only() {
    let service = Arc::new(MemoryContentService::with_wardrobe());
    let catalog = EntityCatalog::new(service.clone());
    catalog.resolve(&urns(&[HAT])).await;

    service.fail_resolution(true);
    let resolved = catalog.resolve(&urns(&[HAT, HAIR])).await;
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].urn, key(HAT));

    // Nothing was cached for the failed batch, so a later resolve retries
    service.fail_resolution(false);
    assert_eq!(catalog.resolve(&urns(&[HAIR])).await.len(), 1);
}

#[tokio::test]
async fn test_warm_up_requires_both_bodies() {
    let service = Arc::new(MemoryContentService::new());
    service.add_entity(body(BodyShape::Male));
    let catalog = EntityCatalog::new(service.clone());

    match catalog.warm_up().await {
        Err(AvatarError::ResolutionFailure { missing }) => {
            assert_eq!(missing, vec![key(BodyShape::FEMALE_URN)]);
        }
        other => panic!("expected resolution failure, got {other:?}"),
    }

    service.add_entity(body(BodyShape::Female));
    catalog.warm_up().await.unwrap();
    let body = catalog.get_body_entity(BodyShape::Female).await.unwrap();
    assert_eq!(body.entity_type, EntityType::Body);
    assert!(body.supports(BodyShape::Female));
    assert!(!body.supports(BodyShape::Male));
}

#[tokio::test]
async fn test_entity_kinds_follow_metadata() {
    let service = Arc::new(MemoryContentService::with_wardrobe());
    let catalog = EntityCatalog::new(service.clone());

    let resolved = catalog.resolve(&urns(&[HAT, EYES, DANCE])).await;
    let kinds: Vec<EntityType> = resolved.iter().map(|d| d.entity_type).collect();
    assert_eq!(kinds, vec![EntityType::Wearable, EntityType::FacialFeature, EntityType::Emote]);
    assert!(resolved[2].looping);
    assert_eq!(resolved[0].hides(BodyShape::Male).into_iter().collect::<Vec<_>>(), vec!["top_head"]);
}
