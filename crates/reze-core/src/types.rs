//! Core types for Reze Core

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use url::Url;
use uuid::Uuid;

/// Unique identifier for a display adapter instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayId(pub Uuid);

impl DisplayId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DisplayId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DisplayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Container format of a loadable source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Segmented adaptive stream
    Hls,
    /// Single progressive file
    Mp4,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Hls => write!(f, "hls"),
            SourceType::Mp4 => write!(f, "mp4"),
        }
    }
}

/// A stream that can be attached to the display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadableSource {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_headers: Option<BTreeMap<String, String>>,
}

impl LoadableSource {
    pub fn hls(url: Url) -> Self {
        Self {
            source_type: SourceType::Hls,
            url,
            headers: None,
            preferred_headers: None,
        }
    }

    pub fn mp4(url: Url) -> Self {
        Self {
            source_type: SourceType::Mp4,
            url,
            headers: None,
            preferred_headers: None,
        }
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_preferred_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.preferred_headers = Some(headers);
        self
    }

    pub fn is_adaptive(&self) -> bool {
        self.source_type == SourceType::Hls
    }

    /// Headers to send for this source: preferred headers overlaid by the required ones
    pub fn request_headers(&self) -> BTreeMap<String, String> {
        let mut merged = self.preferred_headers.clone().unwrap_or_default();
        if let Some(headers) = &self.headers {
            merged.extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }
}

/// Semantic quality label, ordered by ascending resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceQuality {
    /// No discrete ladder
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "144")]
    Q144,
    #[serde(rename = "240")]
    Q240,
    #[serde(rename = "360")]
    Q360,
    #[serde(rename = "480")]
    Q480,
    #[serde(rename = "540")]
    Q540,
    #[serde(rename = "720")]
    Q720,
    #[serde(rename = "1080")]
    Q1080,
    #[serde(rename = "1440")]
    Q1440,
    #[serde(rename = "4k")]
    Q4k,
}

impl SourceQuality {
    /// Every label with a fixed height, ascending
    pub const LADDER: [SourceQuality; 9] = [
        SourceQuality::Q144,
        SourceQuality::Q240,
        SourceQuality::Q360,
        SourceQuality::Q480,
        SourceQuality::Q540,
        SourceQuality::Q720,
        SourceQuality::Q1080,
        SourceQuality::Q1440,
        SourceQuality::Q4k,
    ];

    /// Canonical label as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceQuality::Unknown => "unknown",
            SourceQuality::Q144 => "144",
            SourceQuality::Q240 => "240",
            SourceQuality::Q360 => "360",
            SourceQuality::Q480 => "480",
            SourceQuality::Q540 => "540",
            SourceQuality::Q720 => "720",
            SourceQuality::Q1080 => "1080",
            SourceQuality::Q1440 => "1440",
            SourceQuality::Q4k => "4k",
        }
    }
}

impl std::fmt::Display for SourceQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceQuality {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let label = normalized.trim_end_matches('p');
        std::iter::once(SourceQuality::Unknown)
            .chain(SourceQuality::LADDER)
            .find(|q| q.as_str() == label)
            .ok_or_else(|| crate::Error::InvalidConfig(format!("unknown quality label '{}'", s)))
    }
}

/// A backend-reported rendition of an adaptive source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Level {
    pub width: u32,
    pub height: u32,
    /// Bits per second
    pub bitrate: u64,
}

impl Level {
    pub fn new(width: u32, height: u32, bitrate: u64) -> Self {
        Self { width, height, bitrate }
    }
}

/// A selectable audio rendition; `id` is valid only for the current source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTrackInfo {
    pub id: String,
    pub label: String,
    pub language: String,
}

/// A subtitle track discovered from the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrackRef {
    pub id: String,
    pub language: String,
    pub url: String,
    pub needs_proxy: bool,
    pub hls: bool,
}

/// Options applied atomically on each load
///
/// With `automatic_quality` set, `preferred_quality` is ignored for selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayLoadOptions {
    pub source: Option<LoadableSource>,
    #[serde(default)]
    pub start_at: f64,
    #[serde(default)]
    pub automatic_quality: bool,
    #[serde(default)]
    pub preferred_quality: Option<SourceQuality>,
}

impl DisplayLoadOptions {
    pub fn new(source: LoadableSource) -> Self {
        Self {
            source: Some(source),
            start_at: 0.0,
            automatic_quality: true,
            preferred_quality: None,
        }
    }

    /// Options that unload the current source
    pub fn empty() -> Self {
        Self {
            source: None,
            start_at: 0.0,
            automatic_quality: true,
            preferred_quality: None,
        }
    }

    pub fn start_at(mut self, seconds: f64) -> Self {
        self.start_at = seconds;
        self
    }

    pub fn preferred_quality(mut self, quality: SourceQuality) -> Self {
        self.automatic_quality = false;
        self.preferred_quality = Some(quality);
        self
    }
}

/// Display state machine states for a single load cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayState {
    /// No source attached
    Idle,
    /// Backend selected, waiting for the element or engine
    Attaching,
    /// Streaming engine fetching the manifest
    ManifestLoading,
    /// Initial playability confirmed
    Ready,
    Playing,
    Paused,
    /// Fatal backend error
    Errored,
}

impl DisplayState {
    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: DisplayState) -> bool {
        use DisplayState::*;
        matches!(
            (self, target),
            // Any state can be forced back to Idle
            (_, Idle) |
            // From Idle
            (Idle, Attaching) |
            // From Attaching
            (Attaching, ManifestLoading) | (Attaching, Ready) | (Attaching, Errored) |
            // From ManifestLoading
            (ManifestLoading, Ready) | (ManifestLoading, Errored) |
            // From Ready
            (Ready, Playing) | (Ready, Paused) | (Ready, Errored) |
            // From Playing
            (Playing, Paused) | (Playing, Errored) |
            // From Paused
            (Paused, Playing) | (Paused, Errored)
        )
    }

    /// True before playability has been confirmed
    pub fn is_pending(&self) -> bool {
        matches!(self, DisplayState::Attaching | DisplayState::ManifestLoading)
    }
}

impl std::fmt::Display for DisplayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayState::Idle => write!(f, "idle"),
            DisplayState::Attaching => write!(f, "attaching"),
            DisplayState::ManifestLoading => write!(f, "manifest_loading"),
            DisplayState::Ready => write!(f, "ready"),
            DisplayState::Playing => write!(f, "playing"),
            DisplayState::Paused => write!(f, "paused"),
            DisplayState::Errored => write!(f, "errored"),
        }
    }
}

/// Origin of a surfaced backend error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    /// Streaming engine failure
    Hls,
    /// Native media element failure
    HtmlVideo,
}

/// Normalized backend failure, the only error shape consumers observe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayError {
    pub error_name: String,
    #[serde(rename = "type")]
    pub kind: ErrorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}
