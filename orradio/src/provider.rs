//! Cached access to the station directory
//!
//! [`ApiServiceProvider`] combines the HTTP client, the URL builder and an
//! [`ApiCache`]. Every catalog request URL is also its cache key, so the
//! same list requested twice within the TTL costs a single HTTP request.
//!
//! # Caching Strategy
//!
//! - **Catalog lists and station details**: cached for the configured TTL
//!   (default 24 hours)
//! - **Search**: never cached
//! - **Clicks and votes**: never cached, they have side effects
//! - **Network failure**: the last cached body is served even if expired
//! - **Undecodable body**: never stored, handled like a network failure
//!
//! # Example
//!
//! ```no_run
//! use orcache::InMemoryApiCache;
//! use orradio::{ApiServiceProvider, ModelLayer, Page, RadioBrowserClient, StationDirectory, StationQuery};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RadioBrowserClient::new().await?;
//!     let provider = ApiServiceProvider::new(
//!         client,
//!         ModelLayer::default(),
//!         Arc::new(InMemoryApiCache::new()),
//!     );
//!
//!     let page = Page::first(provider.page_size());
//!     for station in provider.stations(&StationQuery::Popular, page).await? {
//!         println!("{}", station.name);
//!     }
//!     Ok(())
//! }
//! ```

use crate::client::RadioBrowserClient;
use crate::error::{Error, Result};
use crate::model_layer::ModelLayer;
use crate::models::{ApiServer, Category, Country, Page, RadioStation, StationQuery};
use crate::parser;
use async_trait::async_trait;
use orcache::{ApiCache, DEFAULT_API_CACHE_TTL};
use std::sync::Arc;
use std::time::Duration;

/// Default number of stations per catalog page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Read access to a station catalog
///
/// The browse tree only depends on this trait, so tests and alternative
/// directories can replace the Radio Browser implementation.
#[async_trait]
pub trait StationDirectory: Send + Sync {
    /// Number of stations requested per page
    fn page_size(&self) -> usize;

    /// All categories (tags), most populated first
    async fn categories(&self) -> Result<Vec<Category>>;

    /// All countries, sorted by name
    async fn countries(&self) -> Result<Vec<Country>>;

    /// One page of a station list
    async fn stations(&self, query: &StationQuery, page: Page) -> Result<Vec<RadioStation>>;

    /// One page of name search results
    async fn search(&self, text: &str, page: Page) -> Result<Vec<RadioStation>> {
        self.stations(&StationQuery::Search(text.to_string()), page)
            .await
    }

    /// A single station by identifier, `None` when unknown
    async fn station(&self, id: &str) -> Result<Option<RadioStation>>;

    /// Report that a station was played
    ///
    /// Returns the stream URL sent back by the directory, if any.
    async fn register_click(&self, id: &str) -> Result<Option<String>>;

    /// Vote for a station
    async fn vote(&self, id: &str) -> Result<()>;

    /// URL handed to the player for `station`
    async fn resolve_stream_url(&self, station: &RadioStation) -> Result<String> {
        Ok(station.stream_url.clone())
    }
}

/// Station directory backed by the Radio Browser API and a response cache
#[derive(Clone)]
pub struct ApiServiceProvider {
    client: RadioBrowserClient,
    layer: ModelLayer,
    cache: Arc<dyn ApiCache>,
    ttl: Duration,
    page_size: usize,
}

impl std::fmt::Debug for ApiServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiServiceProvider")
            .field("base_url", &self.layer.base_url().as_str())
            .field("cache", &self.cache.name())
            .field("ttl", &self.ttl)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl ApiServiceProvider {
    /// Create a provider with the default TTL and page size
    pub fn new(client: RadioBrowserClient, layer: ModelLayer, cache: Arc<dyn ApiCache>) -> Self {
        Self {
            client,
            layer,
            cache,
            ttl: DEFAULT_API_CACHE_TTL,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the cache TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the page size (at least 1)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn client(&self) -> &RadioBrowserClient {
        &self.client
    }

    pub fn model_layer(&self) -> &ModelLayer {
        &self.layer
    }

    pub fn cache(&self) -> &Arc<dyn ApiCache> {
        &self.cache
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch `url`, going through the cache when `use_cache` is set
    ///
    /// The body is returned as is; see [`fetch`](Self::fetch) for the
    /// cache policy.
    pub async fn download(&self, url: &str, use_cache: bool) -> Result<String> {
        self.fetch(url, use_cache, |body| Ok(body.to_string())).await
    }

    /// Fetch `url` and decode the body with `parse`
    ///
    /// A fresh cache entry is decoded without network access. Otherwise the
    /// body is downloaded, and stored only once `parse` accepted it. If the
    /// download fails or the body cannot be decoded, an expired entry for the
    /// same URL is used instead of the error.
    ///
    /// Cache failures are logged and treated as misses. An entry that no
    /// longer decodes is removed.
    pub async fn fetch<T, P>(&self, url: &str, use_cache: bool, parse: P) -> Result<T>
    where
        P: Fn(&str) -> Result<T> + Send,
    {
        if use_cache {
            match self.cache.get(url, self.ttl) {
                Ok(Some(body)) => match parse(&body) {
                    Ok(value) => return Ok(value),
                    Err(e) => {
                        tracing::warn!(url, error = %e, "Dropping unreadable API cache entry");
                        if let Err(e) = self.cache.remove(url) {
                            tracing::warn!(url, error = %e, "API cache removal failed");
                        }
                    }
                },
                Ok(None) => {}
                Err(e) => tracing::warn!(url, error = %e, "API cache read failed"),
            }
        }

        let err = match self.client.get_text(url).await {
            Ok(body) => match parse(&body) {
                Ok(value) => {
                    if use_cache {
                        if let Err(e) = self.cache.put(url, &body) {
                            tracing::warn!(url, error = %e, "API cache write failed");
                        }
                    }
                    return Ok(value);
                }
                Err(e) => e,
            },
            Err(e) => e,
        };

        if use_cache {
            if let Ok(Some(stale)) = self.cache.get_stale(url) {
                if let Ok(value) = parse(&stale) {
                    tracing::warn!(url, error = %err, "Download failed, serving stale cache entry");
                    return Ok(value);
                }
            }
        }
        Err(err)
    }

    /// Mirror list of the directory (cached)
    pub async fn servers(&self) -> Result<Vec<ApiServer>> {
        self.fetch(&self.layer.servers()?, true, parser::parse_servers)
            .await
    }
}

#[async_trait]
impl StationDirectory for ApiServiceProvider {
    fn page_size(&self) -> usize {
        self.page_size
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        self.fetch(&self.layer.all_categories()?, true, parser::parse_categories)
            .await
    }

    async fn countries(&self) -> Result<Vec<Country>> {
        self.fetch(&self.layer.countries()?, true, parser::parse_countries)
            .await
    }

    async fn stations(&self, query: &StationQuery, page: Page) -> Result<Vec<RadioStation>> {
        let url = self.layer.stations(query, page)?;
        let hide_broken = self.layer.hide_broken();
        let stations = self
            .fetch(&url, query.is_cacheable(), |body| {
                parser::parse_stations(body, hide_broken)
            })
            .await?;
        tracing::debug!(?query, offset = page.offset, count = stations.len(), "Loaded stations");
        Ok(stations)
    }

    async fn station(&self, id: &str) -> Result<Option<RadioStation>> {
        let stations = self
            .fetch(&self.layer.station_by_id(id)?, true, |body| {
                parser::parse_stations(body, false)
            })
            .await?;
        Ok(stations.into_iter().next())
    }

    async fn register_click(&self, id: &str) -> Result<Option<String>> {
        let body = self.download(&self.layer.click(id)?, false).await?;
        let response = parser::parse_action(&body)?;
        tracing::debug!(station = id, "Click registered");
        Ok(response.url.filter(|url| !url.is_empty()))
    }

    async fn vote(&self, id: &str) -> Result<()> {
        let body = self.download(&self.layer.vote(id)?, false).await?;
        parser::parse_action(&body).map_err(|e| match e {
            Error::ApiError(message) => {
                Error::api_error(format!("vote for {id} rejected: {message}"))
            }
            other => other,
        })?;
        tracing::info!(station = id, "Vote registered");
        Ok(())
    }

    async fn resolve_stream_url(&self, station: &RadioStation) -> Result<String> {
        self.client.resolve_stream_url(&station.stream_url).await
    }
}
