//! The browse tree served to media clients
//!
//! ```text
//! __ROOT__
//! ├── __FAVORITES__                  (only when not empty)
//! ├── __LOCAL__                      (only when not empty)
//! ├── __RECENT__                     (only when not empty)
//! ├── __COUNTRY_STATIONS__<code>     (only with a configured country)
//! ├── __POPULAR__
//! ├── __RECENT_ADDED__
//! ├── __COUNTRIES__ ── __COUNTRY_STATIONS__<code> ── stations
//! └── __CATEGORIES__ ── __CATEGORY_STATIONS__<tag> ── stations
//! ```
//!
//! Station lists from the directory are paginated. Asking for a page past
//! the end yields a single `__LIST_ENDED__` marker item.

use crate::error::{Error, Result};
use crate::media_id::{self, MediaId};
use orradio::{Page, RadioStation, StationDirectory, StationQuery};
use orstorage::StationStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Upper bound of stations remembered from loaded lists
const MAX_REMEMBERED_STATIONS: usize = 2000;

/// Whether an item opens a list or starts playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaItemKind {
    Browsable,
    Playable,
}

/// One entry of a browse list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub icon_url: Option<String>,
    pub kind: MediaItemKind,
    /// The station behind a playable item
    pub station: Option<RadioStation>,
}

impl MediaItem {
    /// A browsable node
    pub fn folder(id: &MediaId, title: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            title: title.into(),
            subtitle: None,
            icon_url: None,
            kind: MediaItemKind::Browsable,
            station: None,
        }
    }

    /// A playable station
    pub fn station(station: RadioStation) -> Self {
        let subtitle = station.media_subtitle();
        Self {
            id: station.id.clone(),
            title: station.name.clone(),
            subtitle: (!subtitle.is_empty()).then_some(subtitle),
            icon_url: station.image_url.clone(),
            kind: MediaItemKind::Playable,
            station: Some(station),
        }
    }

    /// Marker returned for a page past the end of a list
    pub fn list_ended() -> Self {
        Self {
            id: media_id::LIST_ENDED.to_string(),
            title: String::new(),
            subtitle: None,
            icon_url: None,
            kind: MediaItemKind::Browsable,
            station: None,
        }
    }

    fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn is_playable(&self) -> bool {
        self.kind == MediaItemKind::Playable
    }

    pub fn is_list_ended(&self) -> bool {
        self.id == media_id::LIST_ENDED
    }

    pub fn media_id(&self) -> MediaId {
        MediaId::parse(&self.id)
    }
}

/// Builds the children of every node of the browse tree
pub struct MediaTree {
    directory: Arc<dyn StationDirectory>,
    store: Arc<StationStore>,
    country_code: Option<String>,
    remembered: Mutex<HashMap<String, RadioStation>>,
}

impl std::fmt::Debug for MediaTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaTree")
            .field("country_code", &self.country_code)
            .field("page_size", &self.directory.page_size())
            .finish()
    }
}

impl MediaTree {
    pub fn new(directory: Arc<dyn StationDirectory>, store: Arc<StationStore>) -> Self {
        Self {
            directory,
            store,
            country_code: None,
            remembered: Mutex::new(HashMap::new()),
        }
    }

    /// Country of the "stations near me" node (ISO code, empty disables it)
    pub fn with_country_code(mut self, code: Option<String>) -> Self {
        self.country_code = code
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());
        self
    }

    pub fn directory(&self) -> &Arc<dyn StationDirectory> {
        &self.directory
    }

    pub fn store(&self) -> &Arc<StationStore> {
        &self.store
    }

    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    pub fn page_size(&self) -> usize {
        self.directory.page_size()
    }

    /// Children of `parent_id` for the 0-based `page`
    pub async fn children(&self, parent_id: &str, page: usize) -> Result<Vec<MediaItem>> {
        let parent = MediaId::parse(parent_id);
        if !parent.is_browsable() {
            return Err(Error::NotBrowsable(parent_id.to_string()));
        }

        if !parent.is_paginated() {
            if page > 0 {
                return Ok(vec![MediaItem::list_ended()]);
            }
            return self.static_children(&parent).await;
        }

        let query = match &parent {
            MediaId::Popular => StationQuery::Popular,
            MediaId::RecentlyAdded => StationQuery::RecentlyAdded,
            MediaId::CategoryStations(tag) => StationQuery::Category(tag.clone()),
            MediaId::CountryStations(code) if code.is_empty() => match &self.country_code {
                Some(configured) => StationQuery::Country(configured.clone()),
                None => return Ok(Vec::new()),
            },
            MediaId::CountryStations(code) => StationQuery::Country(code.clone()),
            MediaId::Search(text) if text.trim().is_empty() => return Ok(Vec::new()),
            MediaId::Search(text) => StationQuery::Search(text.trim().to_string()),
            _ => return Err(Error::NotBrowsable(parent_id.to_string())),
        };

        let stations = self
            .directory
            .stations(&query, Page::nth(page, self.page_size()))
            .await?;

        if stations.is_empty() && page > 0 {
            tracing::debug!(parent = parent_id, page, "List ended");
            return Ok(vec![MediaItem::list_ended()]);
        }
        self.station_items(stations)
    }

    async fn static_children(&self, parent: &MediaId) -> Result<Vec<MediaItem>> {
        match parent {
            MediaId::Root => self.root_children(),
            MediaId::Favorites => self.station_items(self.store.favorites()?),
            MediaId::Local => self.station_items(self.store.locals()?),
            MediaId::Recent => self.station_items(self.store.recents()?),
            MediaId::Countries => Ok(self
                .directory
                .countries()
                .await?
                .into_iter()
                .map(|country| {
                    MediaItem::folder(&MediaId::CountryStations(country.code), country.name)
                        .with_subtitle(format!("{} stations", country.station_count))
                })
                .collect()),
            MediaId::Categories => Ok(self
                .directory
                .categories()
                .await?
                .into_iter()
                .map(|category| {
                    let count = category.station_count;
                    MediaItem::folder(&MediaId::CategoryStations(category.name.clone()), category.name)
                        .with_subtitle(format!("{count} stations"))
                })
                .collect()),
            other => Err(Error::NotBrowsable(other.to_string())),
        }
    }

    fn root_children(&self) -> Result<Vec<MediaItem>> {
        let mut items = Vec::new();
        if !self.store.favorites()?.is_empty() {
            items.push(MediaItem::folder(&MediaId::Favorites, "Favorites"));
        }
        if !self.store.locals()?.is_empty() {
            items.push(MediaItem::folder(&MediaId::Local, "Local stations"));
        }
        if !self.store.recents()?.is_empty() {
            items.push(MediaItem::folder(&MediaId::Recent, "Recently played"));
        }
        if let Some(code) = &self.country_code {
            items.push(
                MediaItem::folder(&MediaId::CountryStations(code.clone()), "Stations in my country")
                    .with_subtitle(code.clone()),
            );
        }
        items.push(MediaItem::folder(&MediaId::Popular, "Popular"));
        items.push(MediaItem::folder(&MediaId::RecentlyAdded, "Recently added"));
        items.push(MediaItem::folder(&MediaId::Countries, "Countries"));
        items.push(MediaItem::folder(&MediaId::Categories, "Categories"));
        Ok(items)
    }

    /// Flag stations with their favorite/local state and remember them
    fn station_items(&self, stations: Vec<RadioStation>) -> Result<Vec<MediaItem>> {
        let mut items = Vec::with_capacity(stations.len());
        let mut remembered = self.remembered.lock().unwrap();
        if remembered.len() + stations.len() > MAX_REMEMBERED_STATIONS {
            remembered.clear();
        }
        for mut station in stations {
            station.is_favorite = self.store.is_favorite(&station.id)?;
            station.is_local = station.is_local || self.store.is_local(&station.id)?;
            remembered.insert(station.id.clone(), station.clone());
            items.push(MediaItem::station(station));
        }
        Ok(items)
    }

    /// Find a station by id
    ///
    /// Looks in the stations of recently loaded lists, then in local
    /// storage, then asks the directory.
    pub async fn station(&self, id: &str) -> Result<Option<RadioStation>> {
        let remembered = self.remembered.lock().unwrap().get(id).cloned();
        if let Some(mut station) = remembered {
            station.is_favorite = self.store.is_favorite(id)?;
            return Ok(Some(station));
        }
        if let Some(station) = self.store.find(id)? {
            return Ok(Some(station));
        }
        let Some(mut station) = self.directory.station(id).await? else {
            return Ok(None);
        };
        station.is_favorite = self.store.is_favorite(id)?;
        Ok(Some(station))
    }

    /// Playable stations among `items`, in order
    pub fn queue_from(items: &[MediaItem]) -> Vec<RadioStation> {
        items.iter().filter_map(|item| item.station.clone()).collect()
    }
}
