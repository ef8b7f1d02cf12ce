//! Identifiers of the nodes of the browse tree
//!
//! Well-known nodes use fixed ids wrapped in double underscores. Nodes that
//! carry a parameter (a country code, a tag, a search query) append it to
//! their prefix, e.g. `__CATEGORY_STATIONS__jazz`. Any other string is the
//! id of a station.

use std::fmt;

pub const ROOT: &str = "__ROOT__";
pub const FAVORITES: &str = "__FAVORITES__";
pub const LOCAL: &str = "__LOCAL__";
pub const RECENT: &str = "__RECENT__";
pub const POPULAR: &str = "__POPULAR__";
pub const RECENTLY_ADDED: &str = "__RECENT_ADDED__";
pub const COUNTRIES: &str = "__COUNTRIES__";
pub const CATEGORIES: &str = "__CATEGORIES__";
pub const COUNTRY_STATIONS: &str = "__COUNTRY_STATIONS__";
pub const CATEGORY_STATIONS: &str = "__CATEGORY_STATIONS__";
pub const SEARCH: &str = "__SEARCH__";
pub const LIST_ENDED: &str = "__LIST_ENDED__";

/// A parsed node id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaId {
    Root,
    Favorites,
    Local,
    Recent,
    Popular,
    RecentlyAdded,
    Countries,
    Categories,
    /// Stations of a country; an empty code means the configured country
    CountryStations(String),
    /// Stations carrying a tag
    CategoryStations(String),
    /// Name search results
    Search(String),
    /// Marker item returned past the end of a paginated list
    ListEnded,
    /// A playable station
    Station(String),
}

impl MediaId {
    /// Parse a node id; never fails, unknown ids are stations
    pub fn parse(id: &str) -> Self {
        match id {
            ROOT => return MediaId::Root,
            FAVORITES => return MediaId::Favorites,
            LOCAL => return MediaId::Local,
            RECENT => return MediaId::Recent,
            POPULAR => return MediaId::Popular,
            RECENTLY_ADDED => return MediaId::RecentlyAdded,
            COUNTRIES => return MediaId::Countries,
            CATEGORIES => return MediaId::Categories,
            LIST_ENDED => return MediaId::ListEnded,
            _ => {}
        }

        if let Some(code) = id.strip_prefix(COUNTRY_STATIONS) {
            MediaId::CountryStations(code.to_string())
        } else if let Some(tag) = id.strip_prefix(CATEGORY_STATIONS) {
            MediaId::CategoryStations(tag.to_string())
        } else if let Some(query) = id.strip_prefix(SEARCH) {
            MediaId::Search(query.to_string())
        } else {
            MediaId::Station(id.to_string())
        }
    }

    /// Whether the node has children
    pub fn is_browsable(&self) -> bool {
        !matches!(self, MediaId::Station(_) | MediaId::ListEnded)
    }

    /// Whether the children are fetched page by page
    pub fn is_paginated(&self) -> bool {
        matches!(
            self,
            MediaId::Popular
                | MediaId::RecentlyAdded
                | MediaId::CountryStations(_)
                | MediaId::CategoryStations(_)
                | MediaId::Search(_)
        )
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaId::Root => f.write_str(ROOT),
            MediaId::Favorites => f.write_str(FAVORITES),
            MediaId::Local => f.write_str(LOCAL),
            MediaId::Recent => f.write_str(RECENT),
            MediaId::Popular => f.write_str(POPULAR),
            MediaId::RecentlyAdded => f.write_str(RECENTLY_ADDED),
            MediaId::Countries => f.write_str(COUNTRIES),
            MediaId::Categories => f.write_str(CATEGORIES),
            MediaId::CountryStations(code) => write!(f, "{COUNTRY_STATIONS}{code}"),
            MediaId::CategoryStations(tag) => write!(f, "{CATEGORY_STATIONS}{tag}"),
            MediaId::Search(query) => write!(f, "{SEARCH}{query}"),
            MediaId::ListEnded => f.write_str(LIST_ENDED),
            MediaId::Station(id) => f.write_str(id),
        }
    }
}

impl From<&str> for MediaId {
    fn from(id: &str) -> Self {
        MediaId::parse(id)
    }
}
