use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serial_test::serial;
use folio::cache::{CacheKey, ManualClock, TtlCache};
use folio::infra::telemetry;

#[tokio::test]
#[serial]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");
    telemetry::describe_metrics();

    let clock = Arc::new(ManualClock::default());
    let cache = TtlCache::with_clock(clock.clone());
    let key = CacheKey::list("blog");
    let ttl = Duration::from_secs(300);

    // miss, then hit
    assert_eq!(cache.get::<Vec<String>>(&key), None);
    cache.set(key.clone(), vec!["post".to_string()], ttl);
    assert!(cache.get::<Vec<String>>(&key).is_some());

    // expiry
    clock.advance(Duration::from_secs(301));
    assert_eq!(cache.get::<Vec<String>>(&key), None);

    // failed fill
    let detail = CacheKey::single("projects", "p1");
    let fallback = cache
        .get_cached_data_or(
            &detail,
            ttl,
            || async { Err::<String, _>("upstream down") },
            "fallback".to_string(),
        )
        .await;
    assert_eq!(fallback, "fallback");

    let snapshot = snapshotter.snapshot().into_vec();
    let names: HashSet<String> = snapshot
        .iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for expected in [
        "folio_cache_hit_total",
        "folio_cache_miss_total",
        "folio_cache_expired_total",
        "folio_cache_fetch_error_total",
    ] {
        assert!(names.contains(expected), "missing metric {expected}");
    }

    let blog_hits = snapshot.iter().find_map(|(composite_key, _, _, value)| {
        let key = composite_key.key();
        let is_blog = key
            .labels()
            .any(|label| label.key() == "namespace" && label.value() == "blog");
        (key.name() == "folio_cache_hit_total" && is_blog).then_some(value)
    });
    assert!(matches!(blog_hits, Some(DebugValue::Counter(1))));
}
