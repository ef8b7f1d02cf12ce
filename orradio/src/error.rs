//! Error types for the station directory client

/// Result type alias for station directory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the station directory
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Response cache failure
    #[error("Cache error: {0}")]
    Cache(#[from] orcache::Error),

    /// API returned an error status or a negative acknowledgement
    #[error("API error: {0}")]
    ApiError(String),

    /// Station not found
    #[error("Station not found: {0}")]
    StationNotFound(String),

    /// Station data rejected (empty name, non-http URL, ...)
    #[error("Invalid station: {0}")]
    InvalidStation(String),

    /// A playlist URL resolved to no playable stream
    #[error("No stream found in playlist: {0}")]
    EmptyPlaylist(String),

    /// Configuration error (from orconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an API error
    pub fn api_error(msg: impl Into<String>) -> Self {
        Self::ApiError(msg.into())
    }

    /// Create an invalid station error
    pub fn invalid_station(msg: impl Into<String>) -> Self {
        Self::InvalidStation(msg.into())
    }
}
