use chrono::{Duration as ChronoDuration, Utc};
use orcache::{
    ApiCache, CachedResponse, InMemoryApiCache, SqliteApiCache, TwoTierApiCache,
    DEFAULT_API_CACHE_TTL,
};

fn create_cache() -> TwoTierApiCache<InMemoryApiCache, SqliteApiCache> {
    TwoTierApiCache::new(
        InMemoryApiCache::new(),
        SqliteApiCache::open_in_memory().unwrap(),
    )
}

#[test]
fn test_put_writes_both_tiers() {
    let cache = create_cache();
    cache.put("url", "body").unwrap();

    assert_eq!(cache.front().get_stale("url").unwrap().as_deref(), Some("body"));
    assert_eq!(cache.back().get_stale("url").unwrap().as_deref(), Some("body"));
}

#[test]
fn test_persistent_hit_is_promoted_with_original_timestamp() {
    let cache = create_cache();
    let stored_at = Utc::now() - ChronoDuration::hours(2);
    cache
        .back()
        .put_entry(CachedResponse::with_timestamp("url", "body", stored_at))
        .unwrap();
    assert!(cache.front().is_empty().unwrap());

    let data = cache.get("url", DEFAULT_API_CACHE_TTL).unwrap();
    assert_eq!(data.as_deref(), Some("body"));

    let promoted = cache.front().get_entry("url").unwrap().unwrap();
    assert_eq!(
        promoted.stored_at.timestamp_millis(),
        stored_at.timestamp_millis()
    );
}

#[test]
fn test_expired_persistent_entry_is_a_miss() {
    let cache = create_cache();
    cache
        .back()
        .put_entry(CachedResponse::with_timestamp(
            "url",
            "body",
            Utc::now() - ChronoDuration::hours(48),
        ))
        .unwrap();

    assert!(cache.get("url", DEFAULT_API_CACHE_TTL).unwrap().is_none());
    assert_eq!(cache.get_stale("url").unwrap().as_deref(), Some("body"));
}

#[test]
fn test_memory_tier_answers_first() {
    let cache = create_cache();
    cache.front().put("url", "from-memory").unwrap();
    cache.back().put("url", "from-disk").unwrap();

    assert_eq!(
        cache.get("url", DEFAULT_API_CACHE_TTL).unwrap().as_deref(),
        Some("from-memory")
    );
}

#[test]
fn test_remove_and_clear_both_tiers() {
    let cache = create_cache();
    cache.put("a", "1").unwrap();
    cache.put("b", "2").unwrap();

    cache.remove("a").unwrap();
    assert!(cache.front().get_entry("a").unwrap().is_none());
    assert!(cache.back().get_entry("a").unwrap().is_none());

    cache.clear().unwrap();
    assert!(cache.front().is_empty().unwrap());
    assert!(cache.back().is_empty().unwrap());
}
