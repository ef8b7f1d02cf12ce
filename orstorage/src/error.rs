//! Types d'erreurs pour orstorage

/// Erreurs de persistance des stations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Station not found: {0}")]
    StationNotFound(String),

    #[error("Invalid station: {0}")]
    InvalidStation(String),

    #[error("Unsupported backup version {found} (supported up to {supported})")]
    UnsupportedBackupVersion { found: u32, supported: u32 },

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<orradio::Error> for Error {
    fn from(err: orradio::Error) -> Self {
        match err {
            orradio::Error::InvalidStation(msg) => Error::InvalidStation(msg),
            other => Error::Other(other.into()),
        }
    }
}

/// Type Result spécialisé pour orstorage
pub type Result<T> = std::result::Result<T, Error>;
