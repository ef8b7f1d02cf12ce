//! Browse tree and presenter tests

mod common;

use common::{memory_store, FakeDirectory, RecordingConnection, RecordingListener};
use orbrowse::{media_id, ClickOutcome, MediaId, MediaItem, MediaPresenter, MediaTree, TreeConnection};
use orradio::{RadioStation, StationQuery};
use std::sync::Arc;

fn ids(items: &[MediaItem]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

#[tokio::test]
async fn test_root_without_user_stations() {
    let tree = MediaTree::new(Arc::new(FakeDirectory::new(3, 10)), memory_store());

    let root = tree.children(media_id::ROOT, 0).await.unwrap();
    assert_eq!(
        ids(&root),
        vec![
            media_id::POPULAR,
            media_id::RECENTLY_ADDED,
            media_id::COUNTRIES,
            media_id::CATEGORIES
        ]
    );
}

#[tokio::test]
async fn test_root_with_user_stations_and_country() {
    let store = memory_store();
    let directory = Arc::new(FakeDirectory::new(3, 10));
    store.add_favorite(&directory.stations[0]).unwrap();
    store.create_local("Pirate FM", "http://pirate.test/live").unwrap();
    store.add_recent(&directory.stations[1]).unwrap();

    let tree = MediaTree::new(directory, store).with_country_code(Some(" fr ".into()));
    assert_eq!(tree.country_code(), Some("FR"));

    let root = tree.children(media_id::ROOT, 0).await.unwrap();
    assert_eq!(
        ids(&root),
        vec![
            media_id::FAVORITES,
            media_id::LOCAL,
            media_id::RECENT,
            "__COUNTRY_STATIONS__FR",
            media_id::POPULAR,
            media_id::RECENTLY_ADDED,
            media_id::COUNTRIES,
            media_id::CATEGORIES
        ]
    );
}

#[tokio::test]
async fn test_paginated_list_ends_with_marker() {
    let directory = Arc::new(FakeDirectory::new(5, 2));
    let tree = MediaTree::new(directory.clone(), memory_store());

    let first = tree.children(media_id::POPULAR, 0).await.unwrap();
    assert_eq!(ids(&first), vec!["st-0", "st-1"]);
    assert!(first.iter().all(MediaItem::is_playable));

    let last = tree.children(media_id::POPULAR, 2).await.unwrap();
    assert_eq!(ids(&last), vec!["st-4"]);

    let past = tree.children(media_id::POPULAR, 3).await.unwrap();
    assert_eq!(past.len(), 1);
    assert!(past[0].is_list_ended());

    let queries = directory.queries.lock().unwrap().clone();
    assert_eq!(queries[1].0, StationQuery::Popular);
    assert_eq!(queries[1].1.offset, 4);
}

#[tokio::test]
async fn test_static_nodes_end_after_first_page() {
    let tree = MediaTree::new(Arc::new(FakeDirectory::new(1, 10)), memory_store());

    let categories = tree.children(media_id::CATEGORIES, 0).await.unwrap();
    assert_eq!(
        ids(&categories),
        vec!["__CATEGORY_STATIONS__jazz", "__CATEGORY_STATIONS__rock"]
    );
    assert_eq!(categories[0].subtitle.as_deref(), Some("12 stations"));

    let more = tree.children(media_id::CATEGORIES, 1).await.unwrap();
    assert!(more[0].is_list_ended());
}

#[tokio::test]
async fn test_search_and_flags() {
    let store = memory_store();
    let directory = Arc::new(FakeDirectory::new(12, 50));
    store.add_favorite(&directory.stations[11]).unwrap();
    let tree = MediaTree::new(directory, store);

    let id = MediaId::Search("Station 1".into()).to_string();
    let found = tree.children(&id, 0).await.unwrap();
    assert_eq!(ids(&found), vec!["st-1", "st-10", "st-11"]);
    let favorite = found[2].station.as_ref().unwrap();
    assert!(favorite.is_favorite);

    let blank = MediaId::Search("   ".into()).to_string();
    assert!(tree.children(&blank, 0).await.unwrap().is_empty());

    assert!(tree.children("st-1", 0).await.is_err());
}

#[tokio::test]
async fn test_station_lookup_order() {
    let store = memory_store();
    let local = store.create_local("Pirate FM", "http://pirate.test/live").unwrap();
    let tree = MediaTree::new(Arc::new(FakeDirectory::new(2, 10)), store);

    let found = tree.station(&local.id).await.unwrap().unwrap();
    assert!(found.is_local);
    assert_eq!(tree.station("st-1").await.unwrap().unwrap().name, "Station 1");
    assert!(tree.station("nope").await.unwrap().is_none());
}

fn presenter() -> (MediaPresenter, Arc<RecordingConnection>, Arc<RecordingListener>) {
    let connection = Arc::new(RecordingConnection::default());
    let listener = Arc::new(RecordingListener::default());
    let presenter = MediaPresenter::new(connection.clone(), listener.clone());
    (presenter, connection, listener)
}

#[test]
fn test_presenter_navigation_stack() {
    let (mut presenter, connection, _listener) = presenter();
    presenter.start();
    assert!(presenter.is_at_root());

    let popular = MediaItem::folder(&MediaId::Popular, "Popular");
    assert_eq!(
        presenter.handle_item_click(&popular, 7),
        ClickOutcome::Navigated(media_id::POPULAR.to_string())
    );
    assert_eq!(presenter.depth(), 2);
    assert_eq!(
        connection.calls(),
        vec![
            "sub __ROOT__".to_string(),
            "unsub __ROOT__".to_string(),
            "sub __POPULAR__".to_string()
        ]
    );

    connection.clear();
    assert_eq!(presenter.handle_back(), Some(7));
    assert_eq!(presenter.current_parent_id(), Some(media_id::ROOT));
    assert_eq!(
        connection.calls(),
        vec!["unsub __POPULAR__".to_string(), "sub __ROOT__".to_string()]
    );
    assert_eq!(presenter.handle_back(), None);
}

#[test]
fn test_presenter_click_station_and_marker() {
    let (mut presenter, _connection, listener) = presenter();
    presenter.start();

    let station = MediaItem::station(RadioStation::new("st-1", "Station 1", "http://s"));
    assert_eq!(
        presenter.handle_item_click(&station, 0),
        ClickOutcome::PlayRequested("st-1".to_string())
    );
    assert_eq!(*listener.played.lock().unwrap(), vec!["st-1".to_string()]);
    assert_eq!(
        presenter.handle_item_click(&MediaItem::list_ended(), 0),
        ClickOutcome::Ignored
    );
    assert_eq!(presenter.depth(), 1);
}

#[test]
fn test_presenter_paging_and_stale_loads() {
    let (mut presenter, connection, listener) = presenter();
    presenter.start();
    presenter.handle_item_click(&MediaItem::folder(&MediaId::Popular, "Popular"), 0);

    // Not loaded yet
    assert!(!presenter.load_more());

    assert!(!presenter.on_children_loaded(media_id::ROOT, 0, Vec::new()));
    let page0 = vec![MediaItem::station(RadioStation::new("a", "A", "http://a"))];
    assert!(presenter.on_children_loaded(media_id::POPULAR, 0, page0));

    connection.clear();
    assert!(presenter.load_more());
    assert!(!presenter.load_more());
    assert_eq!(connection.calls(), vec!["page __POPULAR__ 1".to_string()]);

    assert!(presenter.on_children_loaded(media_id::POPULAR, 1, vec![MediaItem::list_ended()]));
    assert!(presenter.is_list_ended());
    assert!(!presenter.load_more());

    let shown = listener.children.lock().unwrap().clone();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0], (media_id::POPULAR.to_string(), 0, vec!["a".to_string()]));
}

#[test]
fn test_presenter_drops_page_requested_before_reentering() {
    let (mut presenter, _connection, listener) = presenter();
    presenter.start();
    let popular = MediaItem::folder(&MediaId::Popular, "Popular");
    presenter.handle_item_click(&popular, 0);
    let page0 = vec![MediaItem::station(RadioStation::new("a", "A", "http://a"))];
    assert!(presenter.on_children_loaded(media_id::POPULAR, 0, page0.clone()));
    assert!(presenter.load_more());

    presenter.handle_back();
    presenter.handle_item_click(&popular, 0);
    let late = vec![MediaItem::station(RadioStation::new("b", "B", "http://b"))];
    assert!(!presenter.on_children_loaded(media_id::POPULAR, 1, late));

    assert!(presenter.on_children_loaded(media_id::POPULAR, 0, page0));
    let shown = listener.children.lock().unwrap().clone();
    assert!(shown.iter().all(|(_, page, _)| *page == 0));
}

#[test]
fn test_presenter_search() {
    let (mut presenter, connection, _listener) = presenter();
    presenter.start();
    presenter.open_search(" jazz ", 3);
    assert_eq!(presenter.current_parent_id(), Some("__SEARCH__jazz"));
    presenter.open_search("jazz", 0);
    assert_eq!(presenter.depth(), 2);
    assert_eq!(connection.calls().last().unwrap(), "sub __SEARCH__jazz");
}

#[tokio::test]
async fn test_tree_connection_delivers_children() {
    let tree = Arc::new(MediaTree::new(Arc::new(FakeDirectory::new(3, 10)), memory_store()));
    let (connection, mut rx) = TreeConnection::new(tree);
    let listener = Arc::new(RecordingListener::default());
    let mut presenter = MediaPresenter::new(Arc::new(connection), listener.clone());

    presenter.start();
    let loaded = rx.recv().await.unwrap();
    assert_eq!(loaded.parent_id, media_id::ROOT);
    assert!(presenter.on_children_loaded(&loaded.parent_id, loaded.page, loaded.items));

    presenter.handle_item_click(&MediaItem::folder(&MediaId::Popular, "Popular"), 0);
    let loaded = rx.recv().await.unwrap();
    assert!(presenter.on_children_loaded(&loaded.parent_id, loaded.page, loaded.items));

    let shown = listener.children.lock().unwrap().clone();
    assert_eq!(shown[1].2, vec!["st-0", "st-1", "st-2"]);
}
