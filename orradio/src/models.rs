//! Domain models for the station catalog
//!
//! These are the value objects handed to the browse tree, the storage layer
//! and the playback session. Raw API payloads live in [`crate::parser`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Sort position of a station that was never reordered
pub const UNSORTED: i32 = -1;

// ============================================================================
// Radio Station
// ============================================================================

/// A single internet radio stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RadioStation {
    /// Directory UUID, or a generated UUID for user-added stations
    pub id: String,
    /// Display name
    pub name: String,
    /// Playable stream URL (may still be a playlist, see `resolve_stream_url`)
    pub stream_url: String,
    /// Station homepage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// Logo / favicon URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Country display name
    #[serde(default)]
    pub country: String,
    /// ISO 3166-1 alpha-2 country code
    #[serde(default)]
    pub country_code: String,
    /// Region / state
    #[serde(default)]
    pub state: String,
    /// Broadcast language(s)
    #[serde(default)]
    pub language: String,
    /// Comma separated genre tags, normalized
    #[serde(default)]
    pub genre: String,
    /// Audio codec reported by the directory (MP3, AAC, ...)
    #[serde(default)]
    pub codec: String,
    /// Bitrate in kbps, 0 when unknown
    #[serde(default)]
    pub bitrate: u32,
    /// Directory vote count
    #[serde(default)]
    pub votes: u32,
    /// Directory click count
    #[serde(default)]
    pub click_count: u32,
    /// Result of the directory's last availability check
    #[serde(default = "default_true")]
    pub last_check_ok: bool,
    /// Station is in the user's favorites
    #[serde(default)]
    pub is_favorite: bool,
    /// Station was added by the user (not from the directory)
    #[serde(default)]
    pub is_local: bool,
    /// User-defined ordering within favorites or local stations
    #[serde(default = "default_sort_id")]
    pub sort_id: i32,
}

fn default_true() -> bool {
    true
}

fn default_sort_id() -> i32 {
    UNSORTED
}

impl RadioStation {
    /// Create a directory station with minimal info
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        stream_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stream_url: stream_url.into(),
            homepage: None,
            image_url: None,
            country: String::new(),
            country_code: String::new(),
            state: String::new(),
            language: String::new(),
            genre: String::new(),
            codec: String::new(),
            bitrate: 0,
            votes: 0,
            click_count: 0,
            last_check_ok: true,
            is_favorite: false,
            is_local: false,
            sort_id: UNSORTED,
        }
    }

    /// Create a user-added station
    ///
    /// The name must not be blank and the stream URL must be an absolute
    /// `http` or `https` URL. A fresh UUID is generated as identifier.
    pub fn local(name: &str, stream_url: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::invalid_station("station name is empty"));
        }
        let stream_url = validate_stream_url(stream_url)?;

        let mut station = Self::new(uuid::Uuid::new_v4().to_string(), name, stream_url);
        station.is_local = true;
        Ok(station)
    }

    /// Set the logo URL
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Set the genre from a comma separated tag list
    pub fn with_genre(mut self, tags: &str) -> Self {
        self.genre = normalize_tags(tags);
        self
    }

    /// Set country name and code
    pub fn with_country(mut self, country: impl Into<String>, code: impl Into<String>) -> Self {
        self.country = country.into();
        self.country_code = code.into();
        self
    }

    /// Set the bitrate in kbps
    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = bitrate;
        self
    }

    /// Iterate over the individual genre tags
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.genre
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }

    /// Human readable bitrate, `None` when unknown
    pub fn display_bitrate(&self) -> Option<String> {
        (self.bitrate > 0).then(|| format!("{} kbps", self.bitrate))
    }

    /// One-line description used as browse item subtitle
    ///
    /// Joins country, genre and bitrate, skipping the empty ones.
    pub fn media_subtitle(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(3);
        if !self.country.is_empty() {
            parts.push(self.country.clone());
        }
        if !self.genre.is_empty() {
            parts.push(self.genre.clone());
        }
        if let Some(bitrate) = self.display_bitrate() {
            parts.push(bitrate);
        }
        parts.join(", ")
    }

    /// Check the station is usable for playback
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.name.trim().is_empty() && !self.stream_url.is_empty()
    }
}

/// Validate a user-supplied stream URL and return it trimmed
pub fn validate_stream_url(stream_url: &str) -> Result<String> {
    let stream_url = stream_url.trim();
    let parsed = Url::parse(stream_url)
        .map_err(|e| Error::invalid_station(format!("invalid stream URL '{stream_url}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(stream_url.to_string()),
        scheme => Err(Error::invalid_station(format!(
            "unsupported stream URL scheme: {scheme}"
        ))),
    }
}

/// Normalize a comma separated tag list
///
/// Tags are trimmed, lower-cased, de-duplicated (first occurrence wins) and
/// joined with `", "`.
pub fn normalize_tags(tags: &str) -> String {
    let mut seen: Vec<String> = Vec::new();
    for tag in tags.split(',') {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen.join(", ")
}

// ============================================================================
// Catalog nodes
// ============================================================================

/// A directory tag used as browse category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Tag name (e.g., "jazz")
    pub name: String,
    /// Number of stations carrying the tag
    pub station_count: u32,
}

/// A country known to the directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Country {
    /// Display name
    pub name: String,
    /// ISO 3166-1 alpha-2 code
    pub code: String,
    /// Number of stations in the country
    pub station_count: u32,
}

/// A directory mirror
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiServer {
    /// Host name (e.g., "de1.api.radio-browser.info")
    pub name: String,
    /// IP address
    pub ip: String,
}

impl ApiServer {
    /// HTTPS base URL of the mirror
    pub fn base_url(&self) -> String {
        format!("https://{}", self.name)
    }
}

/// A window over a paginated list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    /// First page with the given size
    pub fn first(limit: usize) -> Self {
        Self { offset: 0, limit }
    }

    /// Page number `index` (0-based) with the given size
    pub fn nth(index: usize, limit: usize) -> Self {
        Self {
            offset: index * limit,
            limit,
        }
    }

    /// The page following this one
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset + self.limit,
            limit: self.limit,
        }
    }

    /// 0-based page number
    pub fn index(&self) -> usize {
        if self.limit == 0 {
            0
        } else {
            self.offset / self.limit
        }
    }
}

/// What list of stations to fetch from the directory
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StationQuery {
    /// Stations tagged with a category
    Category(String),
    /// Stations in a country (ISO code)
    Country(String),
    /// Most clicked stations
    Popular,
    /// Most recently added or changed stations
    RecentlyAdded,
    /// Free text search on the station name
    Search(String),
}

impl StationQuery {
    /// Whether responses for this query go through the response cache
    pub fn is_cacheable(&self) -> bool {
        !matches!(self, StationQuery::Search(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_station_validation() {
        let station = RadioStation::local("  My Radio ", "http://example.com/stream").unwrap();
        assert_eq!(station.name, "My Radio");
        assert!(station.is_local);
        assert!(!station.is_favorite);
        assert_eq!(station.id.len(), 36);

        assert!(matches!(
            RadioStation::local("   ", "http://example.com/stream"),
            Err(Error::InvalidStation(_))
        ));
        assert!(matches!(
            RadioStation::local("Radio", "ftp://example.com/stream"),
            Err(Error::InvalidStation(_))
        ));
        assert!(matches!(
            RadioStation::local("Radio", "not a url"),
            Err(Error::InvalidStation(_))
        ));
    }

    #[test]
    fn test_local_stations_get_distinct_ids() {
        let a = RadioStation::local("A", "https://a.example/stream").unwrap();
        let b = RadioStation::local("A", "https://a.example/stream").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_normalize_tags() {
        assert_eq!(normalize_tags("Rock, pop,,rock , Classic Rock"), "rock, pop, classic rock");
        assert_eq!(normalize_tags("  "), "");
    }

    #[test]
    fn test_media_subtitle() {
        let station = RadioStation::new("id", "Name", "http://s")
            .with_country("Germany", "DE")
            .with_genre("jazz,blues")
            .with_bitrate(128);
        assert_eq!(station.media_subtitle(), "Germany, jazz, blues, 128 kbps");

        let bare = RadioStation::new("id", "Name", "http://s");
        assert_eq!(bare.media_subtitle(), "");
        assert_eq!(bare.display_bitrate(), None);
    }

    #[test]
    fn test_tags_iterator() {
        let station = RadioStation::new("id", "Name", "http://s").with_genre("jazz, ,blues");
        assert_eq!(station.tags().collect::<Vec<_>>(), vec!["jazz", "blues"]);
    }

    #[test]
    fn test_page_arithmetic() {
        let page = Page::first(50);
        assert_eq!(page.index(), 0);
        assert_eq!(page.next(), Page { offset: 50, limit: 50 });
        assert_eq!(Page::nth(3, 20).offset, 60);
        assert_eq!(Page::nth(3, 20).index(), 3);
    }

    #[test]
    fn test_station_deserializes_with_defaults() {
        let station: RadioStation =
            serde_json::from_str(r#"{"id":"x","name":"X","stream_url":"http://x"}"#).unwrap();
        assert!(station.last_check_ok);
        assert_eq!(station.sort_id, UNSORTED);
        assert!(!station.is_local);
    }

    #[test]
    fn test_search_is_not_cacheable() {
        assert!(!StationQuery::Search("abc".into()).is_cacheable());
        assert!(StationQuery::Popular.is_cacheable());
    }
}
