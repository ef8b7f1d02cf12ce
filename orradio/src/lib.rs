//! Radio Browser station directory for OpenRadio
//!
//! This crate provides the catalog side of OpenRadio: a client for the
//! public [Radio Browser](https://www.radio-browser.info/) API, the domain
//! models handed to the rest of the application, and a cached provider.
//!
//! # Features
//!
//! - **Catalog**: categories (tags), countries, popular and recently added
//!   stations, stations per category or country, name search
//! - **Response cache**: every request URL is a cache key in an
//!   [`orcache::ApiCache`], 24 hours TTL by default, with stale fallback
//!   when the network is down
//! - **Stream resolution**: `.m3u`/`.pls` playlists resolved to the first
//!   stream URL
//! - **Configuration Extension**: directory settings stored in orconfig
//!
//! # Example
//!
//! ```no_run
//! use orcache::InMemoryApiCache;
//! use orradio::{ApiServiceProvider, ModelLayer, Page, RadioBrowserClient, StationDirectory};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = ApiServiceProvider::new(
//!         RadioBrowserClient::new().await?,
//!         ModelLayer::default(),
//!         Arc::new(InMemoryApiCache::new()),
//!     );
//!
//!     let categories = provider.categories().await?;
//!     println!("Found {} categories", categories.len());
//!
//!     let results = provider.search("jazz", Page::first(10)).await?;
//!     for station in results {
//!         println!("{} ({})", station.name, station.media_subtitle());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Configuration Extension
//!
//! When the `orconfig` feature is enabled (default), the provider can be
//! built from the application configuration:
//!
//! ```no_run
//! use orconfig::get_config;
//! use orradio::ApiServiceProvider;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let provider = ApiServiceProvider::from_config(&get_config()).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod model_layer;
pub mod models;
pub mod parser;
pub mod playlist;
pub mod provider;

#[cfg(feature = "orconfig")]
pub mod config_ext;

// Re-exports
pub use client::{ClientBuilder, RadioBrowserClient, MAX_PLAYLIST_BYTES};
pub use error::{Error, Result};
pub use model_layer::ModelLayer;
pub use models::{ApiServer, Category, Country, Page, RadioStation, StationQuery, UNSORTED};
pub use playlist::PlaylistFormat;
pub use provider::{ApiServiceProvider, StationDirectory, DEFAULT_PAGE_SIZE};

#[cfg(feature = "orconfig")]
pub use config_ext::RadioBrowserConfigExt;
