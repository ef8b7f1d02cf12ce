use chrono::{Duration as ChronoDuration, Utc};
use orcache::{ApiCache, CachedResponse, SqliteApiCache, DEFAULT_API_CACHE_TTL};
use std::time::Duration;
use tempfile::TempDir;

/// Crée une DB temporaire pour les tests
fn create_test_db() -> (TempDir, SqliteApiCache) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("api_cache.db");
    let db = SqliteApiCache::open(&db_path).unwrap();
    (temp_dir, db)
}

#[test]
fn test_db_open_creates_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("nested").join("api_cache.db");
    let db = SqliteApiCache::open(&db_path);
    assert!(db.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_put_and_get() {
    let (_temp_dir, db) = create_test_db();

    let url = "https://de1.api.radio-browser.info/json/tags";
    db.put(url, r#"[{"name":"jazz","stationcount":12}]"#).unwrap();

    let data = db.get(url, DEFAULT_API_CACHE_TTL).unwrap();
    assert_eq!(data.as_deref(), Some(r#"[{"name":"jazz","stationcount":12}]"#));
}

#[test]
fn test_expired_entry_is_not_returned() {
    let (_temp_dir, db) = create_test_db();

    let stored_at = Utc::now() - ChronoDuration::hours(25);
    db.put_entry(CachedResponse::with_timestamp("old", "[]", stored_at))
        .unwrap();

    assert!(db.get("old", DEFAULT_API_CACHE_TTL).unwrap().is_none());
    // Toujours disponible en mode dégradé
    assert_eq!(db.get_stale("old").unwrap().as_deref(), Some("[]"));
}

#[test]
fn test_timestamp_survives_roundtrip() {
    let (_temp_dir, db) = create_test_db();

    let stored_at = Utc::now() - ChronoDuration::minutes(90);
    db.put_entry(CachedResponse::with_timestamp("k", "v", stored_at))
        .unwrap();

    let entry = db.get_entry("k").unwrap().unwrap();
    assert_eq!(
        entry.stored_at.timestamp_millis(),
        stored_at.timestamp_millis()
    );
}

#[test]
fn test_upsert_replaces_data_and_timestamp() {
    let (_temp_dir, db) = create_test_db();

    let old = Utc::now() - ChronoDuration::days(3);
    db.put_entry(CachedResponse::with_timestamp("k", "old", old))
        .unwrap();
    db.put("k", "new").unwrap();

    assert_eq!(db.len().unwrap(), 1);
    assert_eq!(
        db.get("k", DEFAULT_API_CACHE_TTL).unwrap().as_deref(),
        Some("new")
    );
}

#[test]
fn test_remove_and_clear() {
    let (_temp_dir, db) = create_test_db();

    db.put("a", "1").unwrap();
    db.put("b", "2").unwrap();
    db.put("c", "3").unwrap();
    assert_eq!(db.len().unwrap(), 3);

    db.remove("b").unwrap();
    assert_eq!(db.len().unwrap(), 2);
    assert!(db.get_entry("b").unwrap().is_none());

    db.clear().unwrap();
    assert!(db.is_empty().unwrap());
}

#[test]
fn test_purge_expired() {
    let (_temp_dir, db) = create_test_db();

    let now = Utc::now();
    db.put_entry(CachedResponse::with_timestamp("fresh", "1", now))
        .unwrap();
    db.put_entry(CachedResponse::with_timestamp(
        "stale1",
        "2",
        now - ChronoDuration::hours(30),
    ))
    .unwrap();
    db.put_entry(CachedResponse::with_timestamp(
        "stale2",
        "3",
        now - ChronoDuration::days(10),
    ))
    .unwrap();

    let purged = db.purge_expired(DEFAULT_API_CACHE_TTL).unwrap();
    assert_eq!(purged, 2);
    assert_eq!(db.keys().unwrap(), vec!["fresh".to_string()]);
}

#[test]
fn test_persistence_across_reopen() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("api_cache.db");

    {
        let db = SqliteApiCache::open(&db_path).unwrap();
        db.put("persisted", "value").unwrap();
    }

    let db = SqliteApiCache::open(&db_path).unwrap();
    assert_eq!(
        db.get("persisted", Duration::from_secs(60)).unwrap().as_deref(),
        Some("value")
    );
}
