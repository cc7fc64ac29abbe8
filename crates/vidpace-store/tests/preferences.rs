//! `SpeedPreferences` over the SQLite store.

use std::sync::Arc;

use serde_json::json;
use vidpace_core::{
    ContextId, DOMAIN_SPEEDS_KEY, DomainKey, KeyValueStore, SpeedPreferences, SpeedValue,
};
use vidpace_store::open_test_store;

fn domain(host: &str) -> DomainKey {
    DomainKey::from_host(host).unwrap()
}

#[tokio::test]
async fn test_save_merges_into_shared_map() {
    let store = Arc::new(open_test_store().await.unwrap());
    let prefs = SpeedPreferences::new(store.clone());
    let origin = ContextId::next();

    prefs
        .save_speed(&domain("a.example"), SpeedValue::from_request(1.5).unwrap(), origin)
        .await
        .unwrap();
    prefs
        .save_speed(&domain("b.example"), SpeedValue::from_request(2.0).unwrap(), origin)
        .await
        .unwrap();

    let raw = store.get(DOMAIN_SPEEDS_KEY).await.unwrap();
    assert_eq!(raw, Some(json!({ "a.example": 1.5, "b.example": 2.0 })));
    assert_eq!(
        prefs.speed_for(&domain("b.example")).await.unwrap(),
        SpeedValue::from_request(2.0)
    );
    assert_eq!(prefs.speed_for(&domain("c.example")).await.unwrap(), None);
}

#[tokio::test]
async fn test_forget_removes_only_that_domain() {
    let store = Arc::new(open_test_store().await.unwrap());
    let prefs = SpeedPreferences::new(store);
    let origin = ContextId::next();

    for host in ["a.example", "b.example"] {
        prefs
            .save_speed(&domain(host), SpeedValue::from_request(3.0).unwrap(), origin)
            .await
            .unwrap();
    }

    assert!(prefs.forget(&domain("a.example"), origin).await.unwrap());
    assert!(!prefs.forget(&domain("a.example"), origin).await.unwrap());

    let map = prefs.load_map().await.unwrap();
    assert_eq!(map.len(), 1);
    assert!(map.get(&domain("b.example")).is_some());
}

#[tokio::test]
async fn test_change_feed_decodes_for_domain() {
    let store = Arc::new(open_test_store().await.unwrap());
    let prefs = SpeedPreferences::new(store);
    let mut changes = prefs.subscribe();
    let origin = ContextId::next();

    prefs
        .save_speed(&domain("video.example"), SpeedValue::from_request(1.25).unwrap(), origin)
        .await
        .unwrap();

    let change = changes.recv().await.unwrap();
    assert_eq!(change.origin, Some(origin));
    assert_eq!(
        SpeedPreferences::decode_change(&change, &domain("video.example")),
        Some(Some(1.25))
    );
    assert_eq!(
        SpeedPreferences::decode_change(&change, &domain("other.example")),
        None
    );
}
