//! Integration tests for the cached station provider

use orcache::{ApiCache, InMemoryApiCache};
use orradio::{
    ApiServiceProvider, Error, ModelLayer, Page, RadioBrowserClient, StationDirectory,
    StationQuery, MAX_PLAYLIST_BYTES,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_station(uuid: &str, name: &str, lastcheckok: u8) -> serde_json::Value {
    json!({
        "stationuuid": uuid,
        "name": name,
        "url": format!("http://streams.example/{uuid}.mp3"),
        "url_resolved": "",
        "homepage": "https://radio.example",
        "favicon": "",
        "tags": "jazz,blues",
        "country": "France",
        "countrycode": "FR",
        "state": "",
        "language": "french",
        "votes": 10,
        "codec": "MP3",
        "bitrate": 128,
        "lastcheckok": lastcheckok,
        "clickcount": 42
    })
}

async fn provider_for(server: &MockServer) -> (ApiServiceProvider, Arc<InMemoryApiCache>) {
    let client = RadioBrowserClient::builder()
        .base_url(server.uri())
        .timeout(Duration::from_secs(5))
        .build()
        .await
        .unwrap();
    let layer = ModelLayer::new(&server.uri(), true).unwrap();
    let cache = Arc::new(InMemoryApiCache::new());
    let provider = ApiServiceProvider::new(client, layer, cache.clone()).with_page_size(2);
    (provider, cache)
}

#[tokio::test]
async fn test_categories_are_served_from_cache_on_second_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/tags"))
        .and(query_param("order", "stationcount"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "pop", "stationcount": 5000},
            {"name": "", "stationcount": 3},
            {"name": "jazz", "stationcount": 1200}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (provider, cache) = provider_for(&server).await;

    let first = provider.categories().await.unwrap();
    let second = provider.categories().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].name, "pop");
    assert_eq!(first[1].station_count, 1200);
    assert_eq!(cache.len().unwrap(), 1);
}

#[tokio::test]
async fn test_station_page_hides_broken_entries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/stations/bytagexact/jazz"))
        .and(query_param("offset", "2"))
        .and(query_param("limit", "2"))
        .and(query_param("hidebroken", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            mock_station("a", "Alpha", 1),
            mock_station("b", "Beta", 0)
        ])))
        .mount(&server)
        .await;

    let (provider, _cache) = provider_for(&server).await;
    let page = Page::first(provider.page_size()).next();
    let stations = provider
        .stations(&StationQuery::Category("jazz".into()), page)
        .await
        .unwrap();

    assert_eq!(stations.len(), 1);
    assert_eq!(stations[0].name, "Alpha");
    assert_eq!(stations[0].stream_url, "http://streams.example/a.mp3");
    assert_eq!(stations[0].media_subtitle(), "France, jazz, blues, 128 kbps");
}

#[tokio::test]
async fn test_stale_entry_is_served_when_download_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/countries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Germany", "iso_3166_1": "DE", "stationcount": 3000},
            {"name": "Austria", "iso_3166_1": "at", "stationcount": 500}
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/json/countries"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (provider, _cache) = provider_for(&server).await;
    // A zero TTL forces a network request on every call
    let provider = provider.with_ttl(Duration::ZERO);

    let fresh = provider.countries().await.unwrap();
    let stale = provider.countries().await.unwrap();

    assert_eq!(fresh, stale);
    assert_eq!(stale[0].name, "Austria");
    assert_eq!(stale[0].code, "AT");
}

#[tokio::test]
async fn test_undecodable_body_is_not_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/json/tags"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"name": "rock", "stationcount": 10}])),
        )
        .mount(&server)
        .await;

    let (provider, cache) = provider_for(&server).await;

    assert!(matches!(provider.categories().await, Err(Error::Json(_))));
    assert!(cache.is_empty().unwrap());

    let recovered = provider.categories().await.unwrap();
    assert_eq!(recovered[0].name, "rock");
    let cached = provider.categories().await.unwrap();
    assert_eq!(cached, recovered);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(cache.len().unwrap(), 1);
}

#[tokio::test]
async fn test_undecodable_body_falls_back_to_stale_entry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/tags"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"name": "rock", "stationcount": 10}])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/json/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let (provider, _cache) = provider_for(&server).await;
    let provider = provider.with_ttl(Duration::ZERO);

    let fresh = provider.categories().await.unwrap();
    let stale = provider.categories().await.unwrap();
    assert_eq!(fresh, stale);
    assert_eq!(stale[0].name, "rock");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_download_failure_without_cache_entry_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/countries"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (provider, cache) = provider_for(&server).await;
    let result = provider.countries().await;

    assert!(matches!(result, Err(Error::ApiError(_))));
    assert!(cache.is_empty().unwrap());
}

#[tokio::test]
async fn test_search_is_never_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/stations/search"))
        .and(query_param("name", "swiss jazz"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([mock_station("s", "Swiss Jazz", 1)])),
        )
        .expect(2)
        .mount(&server)
        .await;

    let (provider, cache) = provider_for(&server).await;

    for _ in 0..2 {
        let results = provider.search("swiss jazz", Page::first(10)).await.unwrap();
        assert_eq!(results.len(), 1);
    }
    assert!(cache.is_empty().unwrap());
}

#[tokio::test]
async fn test_click_and_vote_bypass_the_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/url/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "message": "retrieved station url",
            "stationuuid": "abc",
            "url": "http://streams.example/abc.mp3"
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/json/vote/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "message": "you are voting for the same station too often"
        })))
        .mount(&server)
        .await;

    let (provider, cache) = provider_for(&server).await;

    for _ in 0..2 {
        let url = provider.register_click("abc").await.unwrap();
        assert_eq!(url.as_deref(), Some("http://streams.example/abc.mp3"));
    }

    match provider.vote("abc").await {
        Err(Error::ApiError(message)) => assert!(message.contains("too often")),
        other => panic!("expected a rejected vote, got {other:?}"),
    }
    assert!(cache.is_empty().unwrap());
}

#[tokio::test]
async fn test_station_by_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/stations/byuuid/known"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([mock_station("known", "Known", 0)])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/json/stations/byuuid/unknown"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (provider, _cache) = provider_for(&server).await;

    // A direct lookup keeps stations whose last check failed
    let station = provider.station("known").await.unwrap().unwrap();
    assert_eq!(station.name, "Known");
    assert!(!station.last_check_ok);

    assert!(provider.station("unknown").await.unwrap().is_none());
}

#[tokio::test]
async fn test_resolve_pls_stream_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listen.pls"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "[playlist]\nNumberOfEntries=2\nFile1=http://first.example/stream\nFile2=http://second.example/stream\n",
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/empty.m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_string("#EXTM3U\n"))
        .mount(&server)
        .await;

    let (provider, _cache) = provider_for(&server).await;
    let client = provider.client();

    let resolved = client
        .resolve_stream_url(&format!("{}/listen.pls", server.uri()))
        .await
        .unwrap();
    assert_eq!(resolved, "http://first.example/stream");

    let empty = client
        .resolve_stream_url(&format!("{}/empty.m3u", server.uri()))
        .await;
    assert!(matches!(empty, Err(Error::EmptyPlaylist(_))));
}

#[tokio::test]
async fn test_playlist_url_serving_audio_is_returned_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/live.m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0xFFu8; 4096], "audio/mpeg"))
        .mount(&server)
        .await;

    let (provider, _cache) = provider_for(&server).await;
    let url = format!("{}/live.m3u", server.uri());

    assert_eq!(provider.client().resolve_stream_url(&url).await.unwrap(), url);
}

#[tokio::test]
async fn test_oversized_playlist_is_rejected() {
    let server = MockServer::start().await;

    let mut body = b"#EXTM3U\nhttp://first.example/stream\n".to_vec();
    body.resize(MAX_PLAYLIST_BYTES + 1, b'#');
    Mock::given(method("GET"))
        .and(path("/huge.m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "audio/x-mpegurl"))
        .mount(&server)
        .await;

    let (provider, _cache) = provider_for(&server).await;
    let result = provider
        .client()
        .resolve_stream_url(&format!("{}/huge.m3u", server.uri()))
        .await;

    assert!(matches!(result, Err(Error::ApiError(_))));
}
