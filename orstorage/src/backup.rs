//! Sauvegarde des favoris et des stations locales
//!
//! Le document de sauvegarde est un JSON indenté, indépendant du support de
//! stockage (fichier local ou service distant).
//!
//! ```no_run
//! use orstorage::backup::{self, ImportMode};
//! use orstorage::StationStore;
//! use std::path::Path;
//!
//! # fn main() -> orstorage::Result<()> {
//! let store = StationStore::open(Path::new("stations.db"))?;
//! let document = backup::export(&store)?;
//! document.write_to(Path::new("openradio-backup.json"))?;
//!
//! let restored = backup::BackupDocument::read_from(Path::new("openradio-backup.json"))?;
//! backup::import(&store, &restored, ImportMode::Merge)?;
//! # Ok(())
//! # }
//! ```

use crate::store::{validated_local, StationList, StationStore};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use orradio::RadioStation;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Version courante du format de sauvegarde
pub const BACKUP_VERSION: u32 = 1;

/// Contenu d'une sauvegarde
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupDocument {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub favorites: Vec<RadioStation>,
    #[serde(default)]
    pub locals: Vec<RadioStation>,
}

/// Stratégie d'import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Ajoute les stations absentes, conserve l'existant
    Merge,
    /// Remplace favoris et stations locales par le contenu du document
    Replace,
}

/// Bilan d'un import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub favorites_added: usize,
    pub locals_added: usize,
    pub skipped: usize,
}

impl BackupDocument {
    /// Sérialise le document en JSON indenté
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Lit un document, en refusant les versions plus récentes que
    /// [`BACKUP_VERSION`]
    pub fn from_json(json: &str) -> Result<Self> {
        let document: BackupDocument = serde_json::from_str(json)?;
        if document.version > BACKUP_VERSION {
            return Err(Error::UnsupportedBackupVersion {
                found: document.version,
                supported: BACKUP_VERSION,
            });
        }
        Ok(document)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "Backup written");
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

/// Construit une sauvegarde de l'état courant du magasin
pub fn export(store: &StationStore) -> Result<BackupDocument> {
    Ok(BackupDocument {
        version: BACKUP_VERSION,
        created_at: Utc::now(),
        favorites: store.favorites()?,
        locals: store.locals()?,
    })
}

/// Restaure une sauvegarde
///
/// Les stations invalides du document sont ignorées et comptées dans
/// [`ImportReport::skipped`]. Les stations locales passent la même
/// validation que [`StationStore::add_local`] (nom, URL http(s)).
pub fn import(store: &StationStore, document: &BackupDocument, mode: ImportMode) -> Result<ImportReport> {
    if document.version > BACKUP_VERSION {
        return Err(Error::UnsupportedBackupVersion {
            found: document.version,
            supported: BACKUP_VERSION,
        });
    }

    let mut report = ImportReport::default();
    let locals: Vec<RadioStation> = document
        .locals
        .iter()
        .filter_map(|s| keep_local(s, &mut report))
        .collect();
    let favorites: Vec<RadioStation> = document
        .favorites
        .iter()
        .filter(|s| keep(s, &mut report))
        .cloned()
        .collect();

    match mode {
        ImportMode::Replace => {
            store.replace_all(&favorites, &locals)?;
            report.locals_added = locals.len();
            report.favorites_added = favorites.len();
        }
        ImportMode::Merge => {
            for station in &locals {
                if store.merge_into(StationList::Locals, station)? {
                    report.locals_added += 1;
                }
            }
            for station in &favorites {
                if store.merge_into(StationList::Favorites, station)? {
                    report.favorites_added += 1;
                }
            }
        }
    }

    tracing::info!(
        ?mode,
        favorites = report.favorites_added,
        locals = report.locals_added,
        skipped = report.skipped,
        "Backup imported"
    );
    Ok(report)
}

fn keep_local(station: &RadioStation, report: &mut ImportReport) -> Option<RadioStation> {
    match validated_local(station) {
        Ok(local) if local.is_valid() => Some(local),
        Ok(_) => {
            tracing::warn!(name = %station.name, "Skipping local station without id in backup");
            report.skipped += 1;
            None
        }
        Err(e) => {
            tracing::warn!(id = %station.id, error = %e, "Skipping invalid local station in backup");
            report.skipped += 1;
            None
        }
    }
}

fn keep(station: &RadioStation, report: &mut ImportReport) -> bool {
    if station.is_valid() {
        true
    } else {
        tracing::warn!(id = %station.id, "Skipping invalid station in backup");
        report.skipped += 1;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_future_version_is_rejected() {
        let json = r#"{"version": 99, "created_at": "2024-01-01T00:00:00Z"}"#;
        match BackupDocument::from_json(json) {
            Err(Error::UnsupportedBackupVersion { found, supported }) => {
                assert_eq!(found, 99);
                assert_eq!(supported, BACKUP_VERSION);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let json = r#"{"version": 1, "created_at": "2024-01-01T00:00:00Z"}"#;
        let document = BackupDocument::from_json(json).unwrap();
        assert!(document.favorites.is_empty());
        assert!(document.locals.is_empty());
    }

    #[test]
    fn test_import_rejects_local_with_unsupported_url() {
        let store = StationStore::open_in_memory().unwrap();
        let mut ftp = RadioStation::new("ftp-1", "Ftp Radio", "ftp://radio.example/live");
        ftp.is_local = true;
        let mut broken = RadioStation::new("bad-1", "Bad Radio", "not a url");
        broken.is_local = true;
        let good = RadioStation::new("ok-1", "  Good Radio ", "http://radio.example/live");
        let document = BackupDocument {
            version: BACKUP_VERSION,
            created_at: Utc::now(),
            favorites: Vec::new(),
            locals: vec![ftp, broken, good],
        };

        let report = import(&store, &document, ImportMode::Merge).unwrap();
        assert_eq!(report.locals_added, 1);
        assert_eq!(report.skipped, 2);

        let locals = store.locals().unwrap();
        assert_eq!(locals.len(), 1);
        assert_eq!(locals[0].name, "Good Radio");
        assert!(locals[0].is_local);
    }

    #[test]
    fn test_json_is_pretty_printed() {
        let store = StationStore::open_in_memory().unwrap();
        let json = export(&store).unwrap().to_json().unwrap();
        assert!(json.contains("\n  \"version\": 1"));
    }
}
