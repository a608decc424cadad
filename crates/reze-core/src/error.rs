//! Error types for Reze Core

use thiserror::Error;

/// Result type alias for display operations
pub type Result<T> = std::result::Result<T, Error>;

/// Display engine error types
///
/// Backend failures are not represented here: they are normalized into
/// [`DisplayError`](crate::types::DisplayError) and emitted as events.
#[derive(Error, Debug)]
pub enum Error {
    // Track errors
    #[error("Subtitle track for '{language}' did not load within {waited_ms}ms")]
    TrackLoadTimeout { language: String, waited_ms: u64 },

    #[error("Subtitle track wait for '{language}' was cancelled")]
    TrackWaitCancelled { language: String },

    // Lifecycle errors
    #[error("Display adapter has been destroyed")]
    AdapterDestroyed,

    // Manifest errors
    #[error("Failed to fetch manifest: {0}")]
    ManifestFetch(String),

    #[error("Failed to parse manifest: {0}")]
    ManifestParse(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::TrackLoadTimeout { .. } | Error::ManifestFetch(_) | Error::Network(_)
        )
    }

    /// Returns the error code for diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::TrackLoadTimeout { .. } => "TRACK_LOAD_TIMEOUT",
            Error::TrackWaitCancelled { .. } => "TRACK_WAIT_CANCELLED",
            Error::AdapterDestroyed => "ADAPTER_DESTROYED",
            Error::ManifestFetch(_) => "MANIFEST_FETCH",
            Error::ManifestParse(_) => "MANIFEST_PARSE",
            Error::Network(_) => "NETWORK",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Json(_) => "JSON",
            Error::Io(_) => "IO",
        }
    }
}
