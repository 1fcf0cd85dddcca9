use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use rubriq::cache::{fingerprint, ResultCache};

#[tokio::test]
async fn hit_requires_presence() {
    let cache = ResultCache::default();
    let digest = fingerprint(["input"]);

    assert!(cache.get("lint", &digest).is_none());
    cache.put("lint", &digest, json!({"warnings": 2}));
    assert_eq!(cache.get("lint", &digest), Some(json!({"warnings": 2})));

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate() - 0.5).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn entries_expire_after_the_ttl() {
    let cache = ResultCache::new(Duration::from_secs(60));
    let digest = fingerprint(["input"]);
    cache.put("lint", &digest, json!(1));

    tokio::time::advance(Duration::from_secs(59)).await;
    assert!(cache.get("lint", &digest).is_some());

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(cache.get("lint", &digest).is_none());
    // The expired entry was removed by the read that found it.
    assert_eq!(cache.stats().entries, 0);
}

#[tokio::test]
async fn invalidation_is_scoped_to_one_task() {
    let cache = ResultCache::default();
    let digest = fingerprint(["input"]);
    cache.put("lint", &digest, json!(1));
    cache.put("security", &digest, json!(2));

    cache.invalidate_task("lint");

    assert!(cache.get("lint", &digest).is_none());
    assert!(cache.get("security", &digest).is_some());
}

#[tokio::test]
async fn undecodable_payload_degrades_to_a_miss() {
    #[derive(Deserialize)]
    struct LintSummary {
        #[allow(dead_code)]
        warnings: u32,
    }

    let cache = ResultCache::default();
    let digest = fingerprint(["input"]);
    cache.put("lint", &digest, json!("not an object"));

    assert!(cache.get_as::<LintSummary>("lint", &digest).is_none());
    let stats = cache.stats();
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 1);
    // The poisoned entry is gone; a retry can repopulate it.
    assert_eq!(stats.entries, 0);

    cache.put("lint", &digest, json!({"warnings": 4}));
    let decoded = cache.get_as::<LintSummary>("lint", &digest).unwrap();
    assert_eq!(decoded.warnings, 4);
}
