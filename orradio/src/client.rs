//! HTTP client for the Radio Browser API
//!
//! The client only knows how to fetch text over HTTP; it does not cache and
//! does not interpret the payload. Caching and JSON mapping are done by
//! [`ApiServiceProvider`](crate::provider::ApiServiceProvider).
//!
//! # Example
//!
//! ```no_run
//! use orradio::{ModelLayer, RadioBrowserClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RadioBrowserClient::new().await?;
//!     let layer = ModelLayer::default();
//!
//!     let body = client.get_text(&layer.all_categories()?).await?;
//!     println!("{} bytes of tags", body.len());
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::model_layer::DEFAULT_BASE_URL;
use crate::playlist::{is_hls, PlaylistFormat};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent (the directory asks clients to identify themselves)
pub const DEFAULT_USER_AGENT: &str = concat!("OpenRadio/", env!("CARGO_PKG_VERSION"));

/// Largest playlist body read while resolving a stream URL
pub const MAX_PLAYLIST_BYTES: usize = 64 * 1024;

/// Radio Browser HTTP client
#[derive(Debug, Clone)]
pub struct RadioBrowserClient {
    pub(crate) client: Client,
    base_url: String,
    timeout: Duration,
}

impl RadioBrowserClient {
    /// Create a new client with default settings
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client with a custom reqwest::Client
    ///
    /// Useful for sharing HTTP connection pools or custom proxy settings
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the internal HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// GET `url` and return the body as text
    ///
    /// Non-2xx statuses are reported as [`Error::ApiError`].
    pub async fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).timeout(self.timeout).send().await?;

        if !response.status().is_success() {
            return Err(Error::ApiError(format!(
                "{} returned status: {}",
                url,
                response.status()
            )));
        }

        Ok(response.text().await?)
    }

    /// Resolve a station URL to a playable stream URL
    ///
    /// `.m3u`, `.m3u8` and `.pls` playlists are downloaded and their first
    /// stream entry is returned. HLS playlists and any other URL are returned
    /// unchanged, as is a playlist URL that actually serves audio.
    ///
    /// At most [`MAX_PLAYLIST_BYTES`] are read; a larger announced body is
    /// rejected before reading.
    pub async fn resolve_stream_url(&self, url: &str) -> Result<String> {
        let Some(format) = PlaylistFormat::from_url(url) else {
            return Ok(url.to_string());
        };

        let mut response = self.client.get(url).timeout(self.timeout).send().await?;
        if !response.status().is_success() {
            return Err(Error::ApiError(format!(
                "{} returned status: {}",
                url,
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();
        let format = match PlaylistFormat::from_content_type(&content_type) {
            Some(announced) => announced,
            None if content_type.starts_with("audio/") => {
                tracing::debug!(url, content_type, "Playlist URL serves audio directly");
                return Ok(url.to_string());
            }
            None => format,
        };

        if let Some(length) = response.content_length() {
            if length > MAX_PLAYLIST_BYTES as u64 {
                return Err(Error::ApiError(format!(
                    "{url} is too large for a playlist ({length} bytes)"
                )));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let room = MAX_PLAYLIST_BYTES - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                break;
            }
            body.extend_from_slice(&chunk);
        }
        let body = String::from_utf8_lossy(&body);

        if is_hls(&body) {
            return Ok(url.to_string());
        }

        let resolved = format
            .parse(&body)
            .into_iter()
            .next()
            .ok_or_else(|| Error::EmptyPlaylist(url.to_string()))?;

        tracing::debug!(playlist = url, stream = %resolved, "Resolved playlist");
        Ok(resolved)
    }
}

/// Builder for configuring a RadioBrowserClient
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    proxy: Option<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a proxy URL
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Build the client
    pub async fn build(self) -> Result<RadioBrowserClient> {
        let client = if let Some(client) = self.client {
            client
        } else {
            let mut builder = Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout);

            if let Some(proxy_url) = &self.proxy {
                let proxy = reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::other(format!("Invalid proxy: {}", e)))?;
                builder = builder.proxy(proxy);
            }

            builder.build()?
        };

        Ok(RadioBrowserClient {
            client,
            base_url: self.base_url,
            timeout: self.timeout,
        })
    }
}
