//! # orcache - cache des réponses de l'annuaire de stations
//!
//! Les réponses HTTP de l'annuaire Radio Browser sont mises en cache sous
//! forme de texte brut, indexées par l'URL de la requête, avec une durée de
//! vie (TTL) de 24 heures par défaut.
//!
//! Deux implémentations de [`ApiCache`] sont fournies :
//!
//! - [`InMemoryApiCache`] : dictionnaire en mémoire, perdu au redémarrage
//! - [`SqliteApiCache`] : table SQLite persistante
//!
//! [`TwoTierApiCache`] les combine : la mémoire sert de premier niveau devant
//! le stockage persistant.
//!
//! ```rust,no_run
//! use orcache::{ApiCache, InMemoryApiCache, SqliteApiCache, TwoTierApiCache, DEFAULT_API_CACHE_TTL};
//! use std::path::Path;
//!
//! let cache = TwoTierApiCache::new(
//!     InMemoryApiCache::new(),
//!     SqliteApiCache::open(Path::new("api_cache.db"))?,
//! );
//!
//! let url = "https://de1.api.radio-browser.info/json/tags";
//! if cache.get(url, DEFAULT_API_CACHE_TTL)?.is_none() {
//!     cache.put(url, "[]")?;
//! }
//! # Ok::<(), orcache::Error>(())
//! ```

pub mod db;
pub mod error;
pub mod memory;
pub mod two_tier;

#[cfg(feature = "orconfig")]
pub mod config_ext;

use chrono::{DateTime, Utc};
use std::time::Duration;

pub use db::SqliteApiCache;
pub use error::{Error, Result};
pub use memory::InMemoryApiCache;
pub use two_tier::TwoTierApiCache;

#[cfg(feature = "orconfig")]
pub use config_ext::ApiCacheConfigExt;

/// TTL par défaut des réponses de l'API (24 heures)
pub const DEFAULT_API_CACHE_TTL: Duration = Duration::from_secs(24 * 3600);

/// Réponse mise en cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// Clé du cache (URL de la requête)
    pub key: String,
    /// Corps de la réponse
    pub data: String,
    /// Date de stockage
    pub stored_at: DateTime<Utc>,
}

impl CachedResponse {
    /// Crée une entrée horodatée maintenant
    pub fn new(key: impl Into<String>, data: impl Into<String>) -> Self {
        Self::with_timestamp(key, data, Utc::now())
    }

    /// Crée une entrée avec un horodatage explicite
    pub fn with_timestamp(
        key: impl Into<String>,
        data: impl Into<String>,
        stored_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key: key.into(),
            data: data.into(),
            stored_at,
        }
    }

    /// Âge de l'entrée à l'instant `now` (zéro si horodatée dans le futur)
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.stored_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Vrai si l'entrée est plus jeune que `ttl` à l'instant `now`
    ///
    /// Un TTL nul n'est jamais frais.
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) < ttl
    }
}

/// Cache clé → texte pour les réponses de l'API
///
/// Les implémentations ne fournissent que le stockage brut
/// ([`get_entry`](ApiCache::get_entry), [`put_entry`](ApiCache::put_entry)) ;
/// la validation du TTL est commune.
pub trait ApiCache: Send + Sync {
    /// Nom court utilisé dans les logs
    fn name(&self) -> &'static str;

    /// Récupère une entrée quel que soit son âge
    fn get_entry(&self, key: &str) -> Result<Option<CachedResponse>>;

    /// Ajoute ou remplace une entrée en conservant son horodatage
    fn put_entry(&self, entry: CachedResponse) -> Result<()>;

    /// Supprime une entrée
    fn remove(&self, key: &str) -> Result<()>;

    /// Vide le cache
    fn clear(&self) -> Result<()>;

    /// Nombre d'entrées
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Récupère une entrée encore valide pour `ttl`
    fn get(&self, key: &str, ttl: Duration) -> Result<Option<String>> {
        let now = Utc::now();
        match self.get_entry(key)? {
            Some(entry) if entry.is_fresh(ttl, now) => {
                tracing::debug!(cache = self.name(), key, "API cache hit");
                Ok(Some(entry.data))
            }
            Some(entry) => {
                tracing::debug!(
                    cache = self.name(),
                    key,
                    age_secs = entry.age(now).as_secs(),
                    "API cache entry expired"
                );
                Ok(None)
            }
            None => {
                tracing::debug!(cache = self.name(), key, "API cache miss");
                Ok(None)
            }
        }
    }

    /// Récupère une entrée même expirée
    ///
    /// Utilisé en mode dégradé lorsque le réseau est indisponible.
    fn get_stale(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_entry(key)?.map(|entry| entry.data))
    }

    /// Stocke une réponse horodatée maintenant
    fn put(&self, key: &str, data: &str) -> Result<()> {
        self.put_entry(CachedResponse::new(key, data))
    }
}

impl<T: ApiCache + ?Sized> ApiCache for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn get_entry(&self, key: &str) -> Result<Option<CachedResponse>> {
        (**self).get_entry(key)
    }

    fn put_entry(&self, entry: CachedResponse) -> Result<()> {
        (**self).put_entry(entry)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn len(&self) -> Result<usize> {
        (**self).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_is_fresh() {
        let now = Utc::now();
        let entry = CachedResponse::with_timestamp("k", "v", now - ChronoDuration::hours(1));

        assert!(entry.is_fresh(DEFAULT_API_CACHE_TTL, now));
        assert!(!entry.is_fresh(Duration::from_secs(1800), now));
        assert!(!entry.is_fresh(Duration::ZERO, now));
    }

    #[test]
    fn test_future_timestamp_has_zero_age() {
        let now = Utc::now();
        let entry = CachedResponse::with_timestamp("k", "v", now + ChronoDuration::minutes(5));
        assert_eq!(entry.age(now), Duration::ZERO);
        assert!(entry.is_fresh(Duration::from_secs(1), now));
    }

    #[test]
    fn test_expires_exactly_at_ttl() {
        let now = Utc::now();
        let entry = CachedResponse::with_timestamp("k", "v", now - ChronoDuration::hours(24));
        assert!(!entry.is_fresh(DEFAULT_API_CACHE_TTL, now));
    }
}
