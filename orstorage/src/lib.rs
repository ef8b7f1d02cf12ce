//! # orstorage - stations de l'utilisateur
//!
//! Persistance SQLite des stations favorites, des stations ajoutées à la
//! main, de l'historique d'écoute et de quelques réglages, plus le format
//! de sauvegarde JSON associé.
//!
//! ```no_run
//! use orradio::RadioStation;
//! use orstorage::StationStore;
//! use std::path::Path;
//!
//! # fn main() -> orstorage::Result<()> {
//! let store = StationStore::open(Path::new("stations.db"))?.with_recent_max(10);
//!
//! let station = store.create_local("Ma radio", "http://stream.example/live.mp3")?;
//! store.add_favorite(&station)?;
//! store.add_recent(&station)?;
//!
//! for favorite in store.favorites()? {
//!     println!("{} (local: {})", favorite.name, favorite.is_local);
//! }
//! # Ok(())
//! # }
//! ```

pub mod backup;
pub mod error;
pub mod store;

#[cfg(feature = "orconfig")]
pub mod config_ext;

pub use backup::{BackupDocument, ImportMode, ImportReport, BACKUP_VERSION};
pub use error::{Error, Result};
pub use store::{StationList, StationStore, DEFAULT_RECENT_MAX};
