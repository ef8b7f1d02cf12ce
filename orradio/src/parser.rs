//! JSON mapping from Radio Browser responses to domain models
//!
//! Responses are JSON arrays. Each element is decoded on its own so that a
//! single malformed entry is skipped (with a warning) instead of failing the
//! whole list. A body that is not an array is an error.

use crate::error::{Error, Result};
use crate::models::{normalize_tags, ApiServer, Category, Country, RadioStation};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

/// Station entry as returned by `/json/stations/*`
#[derive(Debug, Deserialize)]
struct RawStation {
    #[serde(default)]
    stationuuid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    url_resolved: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    favicon: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    countrycode: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    votes: Option<i64>,
    #[serde(default)]
    codec: Option<String>,
    #[serde(default)]
    bitrate: Option<i64>,
    #[serde(default)]
    lastcheckok: Option<i64>,
    #[serde(default)]
    clickcount: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(default)]
    name: String,
    #[serde(default)]
    stationcount: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawCountry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    iso_3166_1: String,
    #[serde(default)]
    stationcount: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    #[serde(default)]
    name: String,
    #[serde(default)]
    ip: String,
}

/// Acknowledgement returned by `/json/url/{id}` and `/json/vote/{id}`
#[derive(Debug, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub message: String,
    /// Stream URL, only sent back by `/json/url/{id}`
    #[serde(default)]
    pub url: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn count(value: Option<i64>) -> u32 {
    value
        .map(|v| v.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}

/// Decode a JSON array, skipping entries that don't match `T`
fn parse_array<T: DeserializeOwned>(body: &str, what: &str) -> Result<Vec<T>> {
    let value: Value = serde_json::from_str(body)?;
    let entries = match value {
        Value::Array(entries) => entries,
        other => {
            return Err(Error::api_error(format!(
                "expected a JSON array of {what}, got {}",
                json_kind(&other)
            )))
        }
    };

    let total = entries.len();
    let parsed: Vec<T> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<T>(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed {} entry", what);
                None
            }
        })
        .collect();

    if parsed.len() < total {
        tracing::debug!(kept = parsed.len(), total, "Parsed {} with skipped entries", what);
    }
    Ok(parsed)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl RawStation {
    fn into_station(self) -> Option<RadioStation> {
        let id = self.stationuuid.trim().to_string();
        let name = self.name.trim().to_string();
        let stream_url = non_empty(self.url_resolved).or_else(|| non_empty(Some(self.url)))?;

        if id.is_empty() || name.is_empty() {
            return None;
        }

        let mut station = RadioStation::new(id, name, stream_url);
        station.homepage = non_empty(self.homepage);
        station.image_url = non_empty(self.favicon);
        station.genre = normalize_tags(self.tags.as_deref().unwrap_or_default());
        station.country = non_empty(self.country).unwrap_or_default();
        station.country_code = non_empty(self.countrycode)
            .map(|c| c.to_uppercase())
            .unwrap_or_default();
        station.state = non_empty(self.state).unwrap_or_default();
        station.language = non_empty(self.language).unwrap_or_default();
        station.codec = non_empty(self.codec).unwrap_or_default();
        station.bitrate = count(self.bitrate);
        station.votes = count(self.votes);
        station.click_count = count(self.clickcount);
        station.last_check_ok = self.lastcheckok.map(|v| v != 0).unwrap_or(true);
        Some(station)
    }
}

/// Parse a list of stations
///
/// - the stream URL is `url_resolved` when present, else `url`
/// - entries without UUID, name or stream URL are skipped
/// - with `hide_broken`, entries whose last check failed are dropped
/// - duplicate UUIDs keep the first occurrence
pub fn parse_stations(body: &str, hide_broken: bool) -> Result<Vec<RadioStation>> {
    let raw: Vec<RawStation> = parse_array(body, "stations")?;
    let mut seen = HashSet::new();
    let mut stations = Vec::with_capacity(raw.len());

    for entry in raw {
        let uuid = entry.stationuuid.clone();
        let Some(station) = entry.into_station() else {
            tracing::warn!(stationuuid = %uuid, "Skipping station without id, name or stream URL");
            continue;
        };
        if hide_broken && !station.last_check_ok {
            tracing::debug!(station = %station.name, "Dropping broken station");
            continue;
        }
        if !seen.insert(station.id.clone()) {
            continue;
        }
        stations.push(station);
    }

    Ok(stations)
}

/// Parse the tag list used as categories
pub fn parse_categories(body: &str) -> Result<Vec<Category>> {
    let raw: Vec<RawCategory> = parse_array(body, "categories")?;
    Ok(raw
        .into_iter()
        .filter_map(|c| {
            let name = c.name.trim().to_string();
            (!name.is_empty()).then(|| Category {
                name,
                station_count: count(c.stationcount),
            })
        })
        .collect())
}

/// Parse the country list, sorted by display name
pub fn parse_countries(body: &str) -> Result<Vec<Country>> {
    let raw: Vec<RawCountry> = parse_array(body, "countries")?;
    let mut countries: Vec<Country> = raw
        .into_iter()
        .filter_map(|c| {
            let name = c.name.trim().to_string();
            let code = c.iso_3166_1.trim().to_uppercase();
            (!name.is_empty() && !code.is_empty()).then(|| Country {
                name,
                code,
                station_count: count(c.stationcount),
            })
        })
        .collect();
    countries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(countries)
}

/// Parse the mirror list returned by `/json/servers`
pub fn parse_servers(body: &str) -> Result<Vec<ApiServer>> {
    let raw: Vec<RawServer> = parse_array(body, "servers")?;
    let mut servers: Vec<ApiServer> = raw
        .into_iter()
        .filter(|s| !s.name.trim().is_empty())
        .map(|s| ApiServer {
            name: s.name.trim().to_string(),
            ip: s.ip,
        })
        .collect();
    servers.sort_by(|a, b| a.name.cmp(&b.name));
    servers.dedup_by(|a, b| a.name == b.name);
    Ok(servers)
}

/// Parse a click/vote acknowledgement, failing on `ok: false`
pub fn parse_action(body: &str) -> Result<ActionResponse> {
    let response: ActionResponse = serde_json::from_str(body)?;
    if response.ok {
        Ok(response)
    } else {
        Err(Error::api_error(response.message))
    }
}
