//! Types d'erreurs pour orcache

/// Erreurs du cache d'API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid timestamp for key {key}: {millis}")]
    InvalidTimestamp { key: String, millis: i64 },
}

/// Type Result spécialisé pour orcache
pub type Result<T> = std::result::Result<T, Error>;
