//! Ouverture du magasin de stations depuis orconfig

use crate::{Result, StationStore};
use orconfig::Config;
use std::path::Path;

/// Nom du fichier SQLite dans `storage.directory`
pub const STATION_DB_FILE: &str = "stations.db";

impl StationStore {
    /// Ouvre la base configurée (`storage.directory`, `storage.recent_max`)
    pub fn from_config(config: &Config) -> Result<Self> {
        let dir = config.get_storage_dir()?;
        let store = Self::open(&Path::new(&dir).join(STATION_DB_FILE))?
            .with_recent_max(config.get_recent_max()?);
        tracing::info!(directory = %dir, recent_max = store.recent_max(), "Station store ready");
        Ok(store)
    }
}
