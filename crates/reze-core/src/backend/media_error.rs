//! HTML media error code table

use serde::Serialize;

/// Structured description of a native element failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MediaErrorDetails {
    pub name: &'static str,
    /// Translation key for the UI layer
    pub key: &'static str,
}

const UNKNOWN: MediaErrorDetails = MediaErrorDetails {
    name: "MEDIA_ERR_UNKNOWN",
    key: "player.playbackErrors.unknown",
};

/// Translate a media error code (1..=4) into its details
pub fn media_error_details(code: Option<u16>) -> MediaErrorDetails {
    match code {
        Some(1) => MediaErrorDetails {
            name: "MEDIA_ERR_ABORTED",
            key: "player.playbackErrors.aborted",
        },
        Some(2) => MediaErrorDetails {
            name: "MEDIA_ERR_NETWORK",
            key: "player.playbackErrors.network",
        },
        Some(3) => MediaErrorDetails {
            name: "MEDIA_ERR_DECODE",
            key: "player.playbackErrors.decode",
        },
        Some(4) => MediaErrorDetails {
            name: "MEDIA_ERR_SRC_NOT_SUPPORTED",
            key: "player.playbackErrors.notSupported",
        },
        _ => UNKNOWN,
    }
}
