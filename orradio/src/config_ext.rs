//! Extension to configure the Radio Browser directory through orconfig
//!
//! ```no_run
//! use orconfig::get_config;
//! use orradio::{ApiServiceProvider, RadioBrowserConfigExt};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = get_config();
//!     println!("Directory: {}", config.get_radiobrowser_base_url()?);
//!
//!     let provider = ApiServiceProvider::from_config(&config).await?;
//!     Ok(())
//! }
//! ```

use crate::client::{RadioBrowserClient, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::model_layer::{ModelLayer, DEFAULT_BASE_URL};
use crate::provider::{ApiServiceProvider, DEFAULT_PAGE_SIZE};
use anyhow::Result;
use orcache::ApiCacheConfigExt;
use orconfig::Config;
use serde_yaml::Value;
use std::sync::Arc;
use std::time::Duration;

/// Extension trait for the `radiobrowser` section of the configuration
///
/// Getters persist their default value when the key is missing or invalid.
pub trait RadioBrowserConfigExt {
    /// Base URL of the directory mirror
    fn get_radiobrowser_base_url(&self) -> Result<String>;
    fn set_radiobrowser_base_url(&self, url: &str) -> Result<()>;

    /// User-Agent sent with every request
    fn get_radiobrowser_user_agent(&self) -> Result<String>;
    fn set_radiobrowser_user_agent(&self, user_agent: &str) -> Result<()>;

    /// HTTP request timeout
    fn get_radiobrowser_timeout(&self) -> Result<Duration>;
    fn set_radiobrowser_timeout(&self, timeout: Duration) -> Result<()>;

    /// Stations per catalog page
    fn get_radiobrowser_page_size(&self) -> Result<usize>;
    fn set_radiobrowser_page_size(&self, page_size: usize) -> Result<()>;

    /// Whether stations failing the directory check are hidden
    fn get_radiobrowser_hide_broken(&self) -> Result<bool>;
    fn set_radiobrowser_hide_broken(&self, hide: bool) -> Result<()>;
}

impl RadioBrowserConfigExt for Config {
    fn get_radiobrowser_base_url(&self) -> Result<String> {
        match self.get_value(&["radiobrowser", "base_url"]) {
            Ok(Value::String(url)) if !url.trim().is_empty() => Ok(url),
            _ => {
                self.set_radiobrowser_base_url(DEFAULT_BASE_URL)?;
                Ok(DEFAULT_BASE_URL.to_string())
            }
        }
    }

    fn set_radiobrowser_base_url(&self, url: &str) -> Result<()> {
        self.set_value(&["radiobrowser", "base_url"], Value::String(url.to_string()))
    }

    fn get_radiobrowser_user_agent(&self) -> Result<String> {
        match self.get_value(&["radiobrowser", "user_agent"]) {
            Ok(Value::String(agent)) if !agent.trim().is_empty() => Ok(agent),
            _ => {
                self.set_radiobrowser_user_agent(DEFAULT_USER_AGENT)?;
                Ok(DEFAULT_USER_AGENT.to_string())
            }
        }
    }

    fn set_radiobrowser_user_agent(&self, user_agent: &str) -> Result<()> {
        self.set_value(
            &["radiobrowser", "user_agent"],
            Value::String(user_agent.to_string()),
        )
    }

    fn get_radiobrowser_timeout(&self) -> Result<Duration> {
        match self.get_value(&["radiobrowser", "timeout_secs"]) {
            Ok(Value::Number(n)) if n.as_u64().is_some_and(|secs| secs > 0) => {
                Ok(Duration::from_secs(n.as_u64().unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)))
            }
            _ => {
                let timeout = Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS);
                self.set_radiobrowser_timeout(timeout)?;
                Ok(timeout)
            }
        }
    }

    fn set_radiobrowser_timeout(&self, timeout: Duration) -> Result<()> {
        self.set_value(
            &["radiobrowser", "timeout_secs"],
            Value::Number(serde_yaml::Number::from(timeout.as_secs())),
        )
    }

    fn get_radiobrowser_page_size(&self) -> Result<usize> {
        match self.get_value(&["radiobrowser", "page_size"]) {
            Ok(Value::Number(n)) if n.as_u64().is_some_and(|size| size > 0) => {
                Ok(n.as_u64().unwrap_or(DEFAULT_PAGE_SIZE as u64) as usize)
            }
            _ => {
                self.set_radiobrowser_page_size(DEFAULT_PAGE_SIZE)?;
                Ok(DEFAULT_PAGE_SIZE)
            }
        }
    }

    fn set_radiobrowser_page_size(&self, page_size: usize) -> Result<()> {
        self.set_value(
            &["radiobrowser", "page_size"],
            Value::Number(serde_yaml::Number::from(page_size as u64)),
        )
    }

    fn get_radiobrowser_hide_broken(&self) -> Result<bool> {
        match self.get_value(&["radiobrowser", "hide_broken"]) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => {
                self.set_radiobrowser_hide_broken(true)?;
                Ok(true)
            }
        }
    }

    fn set_radiobrowser_hide_broken(&self, hide: bool) -> Result<()> {
        self.set_value(&["radiobrowser", "hide_broken"], Value::Bool(hide))
    }
}

impl ApiServiceProvider {
    /// Build a provider from the configuration
    ///
    /// Uses the two-tier API cache from `cache.api.*` and the client
    /// settings from `radiobrowser.*`.
    pub async fn from_config(config: &Config) -> crate::Result<Self> {
        let base_url = config.get_radiobrowser_base_url()?;
        let client = RadioBrowserClient::builder()
            .base_url(base_url.clone())
            .user_agent(config.get_radiobrowser_user_agent()?)
            .timeout(config.get_radiobrowser_timeout()?)
            .build()
            .await?;
        let layer = ModelLayer::new(&base_url, config.get_radiobrowser_hide_broken()?)?;
        let cache = Arc::new(config.open_api_cache()?);

        tracing::info!(
            base_url = %base_url,
            cache_dir = %config.get_api_cache_dir()?,
            "Radio Browser provider configured"
        );

        Ok(Self::new(client, layer, cache)
            .with_ttl(config.get_api_cache_ttl()?)
            .with_page_size(config.get_radiobrowser_page_size()?))
    }
}
