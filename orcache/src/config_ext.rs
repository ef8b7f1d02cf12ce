//! Extension pour intégrer le cache d'API dans orconfig
//!
//! ```no_run
//! use orcache::ApiCacheConfigExt;
//! use orconfig::get_config;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! let cache = config.open_api_cache()?;
//! let ttl = config.get_api_cache_ttl()?;
//! # Ok(())
//! # }
//! ```

use crate::{InMemoryApiCache, SqliteApiCache, TwoTierApiCache, DEFAULT_API_CACHE_TTL};
use anyhow::Result;
use orconfig::Config;
use serde_yaml::Value;
use std::path::Path;
use std::time::Duration;

/// Nom du fichier SQLite dans le répertoire du cache
pub const API_CACHE_DB_FILE: &str = "api_cache.db";

/// Répertoire par défaut (relatif au répertoire de configuration)
pub const DEFAULT_API_CACHE_DIR: &str = "cache";

/// Trait d'extension pour la configuration du cache d'API
///
/// Les getters persistent la valeur par défaut si la clé est absente.
pub trait ApiCacheConfigExt {
    /// Répertoire du cache d'API (créé si nécessaire)
    fn get_api_cache_dir(&self) -> Result<String>;

    /// Durée de vie des réponses en cache
    fn get_api_cache_ttl(&self) -> Result<Duration>;

    fn set_api_cache_ttl(&self, ttl: Duration) -> Result<()>;

    /// Ouvre le cache à deux niveaux configuré
    ///
    /// Les entrées persistantes plus vieilles que le TTL sont purgées à
    /// l'ouverture.
    fn open_api_cache(&self) -> Result<TwoTierApiCache<InMemoryApiCache, SqliteApiCache>>;
}

impl ApiCacheConfigExt for Config {
    fn get_api_cache_dir(&self) -> Result<String> {
        self.get_managed_dir(&["cache", "api", "directory"], DEFAULT_API_CACHE_DIR)
    }

    fn get_api_cache_ttl(&self) -> Result<Duration> {
        match self.get_value(&["cache", "api", "ttl_secs"]) {
            Ok(Value::Number(n)) if n.as_u64().is_some() => {
                Ok(Duration::from_secs(n.as_u64().unwrap_or_default()))
            }
            _ => {
                self.set_api_cache_ttl(DEFAULT_API_CACHE_TTL)?;
                Ok(DEFAULT_API_CACHE_TTL)
            }
        }
    }

    fn set_api_cache_ttl(&self, ttl: Duration) -> Result<()> {
        self.set_value(
            &["cache", "api", "ttl_secs"],
            Value::Number(serde_yaml::Number::from(ttl.as_secs())),
        )
    }

    fn open_api_cache(&self) -> Result<TwoTierApiCache<InMemoryApiCache, SqliteApiCache>> {
        let dir = self.get_api_cache_dir()?;
        let ttl = self.get_api_cache_ttl()?;
        let persistent = SqliteApiCache::open(&Path::new(&dir).join(API_CACHE_DB_FILE))?;
        if let Err(e) = persistent.purge_expired(ttl) {
            tracing::warn!(error = %e, "Failed to purge the API cache");
        }
        Ok(TwoTierApiCache::new(InMemoryApiCache::new(), persistent))
    }
}
