//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use orbrowse::{BrowserConnection, MediaItem, MediaPresenterListener, Player, PlaybackState};
use orradio::{Category, Country, Page, RadioStation, StationDirectory, StationQuery};
use orstorage::StationStore;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// In-memory directory with `count` popular stations
pub struct FakeDirectory {
    pub stations: Vec<RadioStation>,
    pub page_size: usize,
    pub clicks: Mutex<Vec<String>>,
    pub queries: Mutex<Vec<(StationQuery, Page)>>,
    /// When set, stream resolution waits for a permit
    pub gate: Option<Arc<Notify>>,
}

impl FakeDirectory {
    pub fn new(count: usize, page_size: usize) -> Self {
        let stations = (0..count)
            .map(|i| {
                RadioStation::new(
                    format!("st-{i}"),
                    format!("Station {i}"),
                    format!("http://radio.test/{i}"),
                )
            })
            .collect();
        Self {
            stations,
            page_size,
            clicks: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn clicks(&self) -> Vec<String> {
        self.clicks.lock().unwrap().clone()
    }
}

#[async_trait]
impl StationDirectory for FakeDirectory {
    fn page_size(&self) -> usize {
        self.page_size
    }

    async fn categories(&self) -> orradio::Result<Vec<Category>> {
        Ok(vec![
            Category {
                name: "jazz".into(),
                station_count: 12,
            },
            Category {
                name: "rock".into(),
                station_count: 7,
            },
        ])
    }

    async fn countries(&self) -> orradio::Result<Vec<Country>> {
        Ok(vec![Country {
            name: "France".into(),
            code: "FR".into(),
            station_count: 3,
        }])
    }

    async fn stations(
        &self,
        query: &StationQuery,
        page: Page,
    ) -> orradio::Result<Vec<RadioStation>> {
        self.queries.lock().unwrap().push((query.clone(), page));
        let selected: Vec<RadioStation> = match query {
            StationQuery::Search(text) => self
                .stations
                .iter()
                .filter(|s| s.name.contains(text.as_str()))
                .cloned()
                .collect(),
            _ => self.stations.clone(),
        };
        Ok(selected
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect())
    }

    async fn station(&self, id: &str) -> orradio::Result<Option<RadioStation>> {
        Ok(self.stations.iter().find(|s| s.id == id).cloned())
    }

    async fn register_click(&self, id: &str) -> orradio::Result<Option<String>> {
        self.clicks.lock().unwrap().push(id.to_string());
        Ok(None)
    }

    async fn vote(&self, _id: &str) -> orradio::Result<()> {
        Ok(())
    }

    async fn resolve_stream_url(&self, station: &RadioStation) -> orradio::Result<String> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if station.stream_url.ends_with(".pls") {
            return Err(orradio::Error::EmptyPlaylist(station.stream_url.clone()));
        }
        Ok(station.stream_url.clone())
    }
}

pub fn memory_store() -> Arc<StationStore> {
    Arc::new(StationStore::open_in_memory().unwrap())
}

/// Player recording every call
#[derive(Default)]
pub struct RecordingPlayer {
    pub calls: Mutex<Vec<String>>,
}

impl RecordingPlayer {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Player for RecordingPlayer {
    fn prepare(&self, url: &str) {
        self.record(format!("prepare {url}"));
    }

    fn play(&self) {
        self.record("play".into());
    }

    fn pause(&self) {
        self.record("pause".into());
    }

    fn stop(&self) {
        self.record("stop".into());
    }

    fn set_volume(&self, volume: f32) {
        self.record(format!("volume {volume}"));
    }
}

/// Connection recording subscriptions
#[derive(Default)]
pub struct RecordingConnection {
    pub calls: Mutex<Vec<String>>,
}

impl RecordingConnection {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl BrowserConnection for RecordingConnection {
    fn subscribe(&self, parent_id: &str) {
        self.calls.lock().unwrap().push(format!("sub {parent_id}"));
    }

    fn unsubscribe(&self, parent_id: &str) {
        self.calls.lock().unwrap().push(format!("unsub {parent_id}"));
    }

    fn request_page(&self, parent_id: &str, page: usize) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("page {parent_id} {page}"));
    }
}

/// Listener keeping what was displayed
#[derive(Default)]
pub struct RecordingListener {
    pub children: Mutex<Vec<(String, usize, Vec<String>)>>,
    pub played: Mutex<Vec<String>>,
    pub states: Mutex<Vec<PlaybackState>>,
}

impl MediaPresenterListener for RecordingListener {
    fn on_children(&self, parent_id: &str, page: usize, items: &[MediaItem]) {
        let ids = items.iter().map(|i| i.id.clone()).collect();
        self.children
            .lock()
            .unwrap()
            .push((parent_id.to_string(), page, ids));
    }

    fn on_play_request(&self, item: &MediaItem) {
        self.played.lock().unwrap().push(item.id.clone());
    }

    fn on_playback_state(&self, state: PlaybackState, _error: Option<&str>) {
        self.states.lock().unwrap().push(state);
    }
}
