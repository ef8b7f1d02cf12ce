//! Error types for the browse tree and playback session

/// Result type alias for browse and session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while browsing or playing
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Station directory failure
    #[error("Directory error: {0}")]
    Directory(#[from] orradio::Error),

    /// Local station storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] orstorage::Error),

    /// The media id does not name a browsable node
    #[error("Not a browsable media id: {0}")]
    NotBrowsable(String),

    /// No station matches the media id
    #[error("Station not found: {0}")]
    StationNotFound(String),

    /// Nothing queued for playback
    #[error("Playback queue is empty")]
    EmptyQueue,

    /// Equalizer settings rejected
    #[error("Invalid equalizer settings: {0}")]
    InvalidEqualizer(String),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error (from orconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl Error {
    /// Create an equalizer validation error
    pub fn invalid_equalizer(msg: impl Into<String>) -> Self {
        Self::InvalidEqualizer(msg.into())
    }
}
