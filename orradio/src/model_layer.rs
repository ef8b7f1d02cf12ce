//! Request URLs for the Radio Browser API
//!
//! Every catalog request is a plain GET whose full URL doubles as the key of
//! the response cache, so URL construction must be deterministic: the same
//! query and page always yield the same string.

use crate::error::{Error, Result};
use crate::models::{Page, StationQuery};
use url::Url;

/// Default Radio Browser mirror
pub const DEFAULT_BASE_URL: &str = "https://de1.api.radio-browser.info";

/// Builds Radio Browser request URLs relative to a mirror
#[derive(Debug, Clone)]
pub struct ModelLayer {
    base_url: Url,
    hide_broken: bool,
}

impl Default for ModelLayer {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            hide_broken: true,
        }
    }
}

impl ModelLayer {
    /// Create a URL builder for the given mirror
    pub fn new(base_url: &str, hide_broken: bool) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            hide_broken,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn hide_broken(&self) -> bool {
        self.hide_broken
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn station_list(&self, segments: &[&str], page: Page, order: Option<&str>) -> Result<String> {
        let mut url = self.endpoint(segments)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("offset", &page.offset.to_string())
                .append_pair("limit", &page.limit.to_string())
                .append_pair("hidebroken", bool_param(self.hide_broken));
            if let Some(order) = order {
                query.append_pair("order", order).append_pair("reverse", "true");
            }
        }
        Ok(url.into())
    }

    /// `/json/tags`, most populated tags first
    pub fn all_categories(&self) -> Result<String> {
        let mut url = self.endpoint(&["json", "tags"])?;
        url.query_pairs_mut()
            .append_pair("hidebroken", bool_param(self.hide_broken))
            .append_pair("order", "stationcount")
            .append_pair("reverse", "true");
        Ok(url.into())
    }

    /// `/json/countries`
    pub fn countries(&self) -> Result<String> {
        let mut url = self.endpoint(&["json", "countries"])?;
        url.query_pairs_mut()
            .append_pair("hidebroken", bool_param(self.hide_broken));
        Ok(url.into())
    }

    /// `/json/stations/bytagexact/{tag}`
    pub fn stations_in_category(&self, tag: &str, page: Page) -> Result<String> {
        self.station_list(
            &["json", "stations", "bytagexact", tag],
            page,
            Some("clickcount"),
        )
    }

    /// `/json/stations/bycountrycodeexact/{code}`
    pub fn stations_in_country(&self, code: &str, page: Page) -> Result<String> {
        self.station_list(
            &["json", "stations", "bycountrycodeexact", &code.to_uppercase()],
            page,
            Some("clickcount"),
        )
    }

    /// `/json/stations/topclick`
    pub fn popular_stations(&self, page: Page) -> Result<String> {
        self.station_list(&["json", "stations", "topclick"], page, None)
    }

    /// `/json/stations/lastchange`
    pub fn recently_added_stations(&self, page: Page) -> Result<String> {
        self.station_list(&["json", "stations", "lastchange"], page, None)
    }

    /// `/json/stations/search?name={query}`
    pub fn search(&self, query: &str, page: Page) -> Result<String> {
        let mut url = self.endpoint(&["json", "stations", "search"])?;
        url.query_pairs_mut()
            .append_pair("name", query.trim())
            .append_pair("offset", &page.offset.to_string())
            .append_pair("limit", &page.limit.to_string())
            .append_pair("hidebroken", bool_param(self.hide_broken))
            .append_pair("order", "clickcount")
            .append_pair("reverse", "true");
        Ok(url.into())
    }

    /// URL of a station list query
    pub fn stations(&self, query: &StationQuery, page: Page) -> Result<String> {
        match query {
            StationQuery::Category(tag) => self.stations_in_category(tag, page),
            StationQuery::Country(code) => self.stations_in_country(code, page),
            StationQuery::Popular => self.popular_stations(page),
            StationQuery::RecentlyAdded => self.recently_added_stations(page),
            StationQuery::Search(text) => self.search(text, page),
        }
    }

    /// `/json/stations/byuuid/{id}`
    pub fn station_by_id(&self, id: &str) -> Result<String> {
        Ok(self.endpoint(&["json", "stations", "byuuid", id])?.into())
    }

    /// `/json/url/{id}`: counts a click and returns the stream URL
    pub fn click(&self, id: &str) -> Result<String> {
        Ok(self.endpoint(&["json", "url", id])?.into())
    }

    /// `/json/vote/{id}`
    pub fn vote(&self, id: &str) -> Result<String> {
        Ok(self.endpoint(&["json", "vote", id])?.into())
    }

    /// `/json/servers`
    pub fn servers(&self) -> Result<String> {
        Ok(self.endpoint(&["json", "servers"])?.into())
    }
}

fn bool_param(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
