//! Backend seams: the native media element, the streaming engine, and the
//! host platform.
//!
//! Backends report through a [`BackendSink`] handed to them when listeners are
//! added. Their events form a tagged union owned by the adapter; consumers of
//! the adapter only ever see [`DisplayEvent`](crate::DisplayEvent)s.

mod buffered;
mod media_error;

pub use buffered::buffered_ahead;
pub use media_error::{media_error_details, MediaErrorDetails};

use crate::config::EngineConfig;
use crate::types::Level;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use url::Url;

/// Low-level events from the native media element
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    Play,
    Playing,
    Pause,
    CanPlay,
    Waiting,
    VolumeChange,
    TimeUpdate,
    LoadedMetadata,
    Progress,
    Error,
    /// Native (element-level) fullscreen was left
    EndFullscreen,
    PlaybackTargetAvailability { available: bool },
    RateChange,
}

/// Failure reported by the streaming engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineError {
    pub fatal: bool,
    /// Playlist or source the failing request belonged to, if known
    pub url: Option<Url>,
    pub name: String,
    pub message: String,
    pub stack: Option<String>,
    /// Engine-specific detail code, logged only
    pub details: String,
}

/// Low-level events from the streaming engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Error(EngineError),
    ManifestLoaded,
    LevelLoaded { fragment_urls: Vec<Url> },
    AudioTrackLoaded { fragment_urls: Vec<Url> },
    LevelSwitched { level: usize },
    SubtitleTrackLoaded,
}

/// Document-level events from the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    FullscreenChange { active: bool },
}

/// Everything a backend can report to the adapter
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    Media(MediaEvent),
    Engine(EngineEvent),
    Document(DocumentEvent),
}

impl From<MediaEvent> for BackendEvent {
    fn from(event: MediaEvent) -> Self {
        BackendEvent::Media(event)
    }
}

impl From<EngineEvent> for BackendEvent {
    fn from(event: EngineEvent) -> Self {
        BackendEvent::Engine(event)
    }
}

impl From<DocumentEvent> for BackendEvent {
    fn from(event: DocumentEvent) -> Self {
        BackendEvent::Document(event)
    }
}

/// Which registration a sink belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkScope {
    /// Bound to one load cycle
    Load(u64),
    /// Bound to the adapter's lifetime
    Document,
}

#[derive(Debug)]
pub(crate) struct Envelope {
    pub(crate) scope: SinkScope,
    pub(crate) event: BackendEvent,
}

/// Channel end handed to a backend when its listeners are added
///
/// Events sent through a sink from a finished load cycle are dropped by the
/// adapter, so a backend that fires late cannot leak into the next source.
#[derive(Debug, Clone)]
pub struct BackendSink {
    scope: SinkScope,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl BackendSink {
    pub(crate) fn new(scope: SinkScope, tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { scope, tx }
    }

    pub fn scope(&self) -> SinkScope {
        self.scope
    }

    /// Queue an event. Returns false once the adapter is gone.
    pub fn send(&self, event: impl Into<BackendEvent>) -> bool {
        self.tx
            .send(Envelope {
                scope: self.scope,
                event: event.into(),
            })
            .is_ok()
    }
}

/// Webkit presentation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationMode {
    Inline,
    PictureInPicture,
}

/// The native playback element
pub trait MediaElement {
    fn set_src(&mut self, url: &Url);
    /// Drop the current source and reset the element
    fn unload(&mut self);

    fn add_listeners(&mut self, sink: BackendSink);
    fn remove_listeners(&mut self);

    fn play(&mut self);
    fn pause(&mut self);
    fn paused(&self) -> bool;

    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// NaN until metadata is known
    fn duration(&self) -> f64;

    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    fn muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);

    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);

    /// Buffered time ranges as `(start, end)` seconds
    fn buffered(&self) -> Vec<(f64, f64)>;
    /// HTML media error code of the last failure
    fn error_code(&self) -> Option<u16>;

    /// Element-level fullscreen (platforms that cannot fullscreen a container)
    fn enter_native_fullscreen(&mut self) {}

    fn is_picture_in_picture(&self) -> bool {
        false
    }
    fn request_picture_in_picture(&mut self) {}
    fn exit_picture_in_picture(&mut self) {}
    fn presentation_mode(&self) -> PresentationMode {
        PresentationMode::Inline
    }
    fn set_presentation_mode(&mut self, _mode: PresentationMode) {}

    fn show_playback_target_picker(&mut self) {}
}

/// A streaming engine audio rendition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineAudioTrack {
    pub id: u32,
    pub name: String,
    pub lang: Option<String>,
}

/// A streaming engine subtitle rendition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSubtitleTrack {
    pub id: u32,
    pub lang: Option<String>,
    pub url: String,
    /// The engine has fetched the track's playlist
    pub details_loaded: bool,
}

/// An adaptive streaming engine instance, created per load
pub trait StreamingEngine {
    fn add_listeners(&mut self, sink: BackendSink);
    fn remove_listeners(&mut self);

    fn attach_media(&mut self, element: &mut dyn MediaElement);
    fn load_source(&mut self, url: &Url, headers: &BTreeMap<String, String>);

    fn levels(&self) -> Vec<Level>;
    /// Level currently playing
    fn current_level(&self) -> Option<usize>;
    /// Level the engine is fetching next
    fn load_level(&self) -> Option<usize>;
    /// `None` hands level choice back to the engine
    fn set_current_level(&mut self, level: Option<usize>);
    fn set_load_level(&mut self, level: Option<usize>);

    fn audio_tracks(&self) -> Vec<EngineAudioTrack>;
    fn audio_track(&self) -> Option<usize>;
    fn set_audio_track(&mut self, index: usize);

    fn subtitle_tracks(&self) -> Vec<EngineSubtitleTrack>;
    fn set_subtitle_option(&mut self, language: &str);

    /// Detach from the element and release every resource
    fn destroy(&mut self);
}

/// Creates streaming engines
pub trait EngineFactory {
    fn is_supported(&self) -> bool;
    fn create(&self, config: &EngineConfig) -> Box<dyn StreamingEngine>;
}

/// Request-rewrite rule slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    HlsLevels,
    HlsAudio,
}

/// Headers to attach to requests for a set of domains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRule {
    pub rule_id: RuleId,
    pub target_domains: Vec<String>,
    pub request_headers: BTreeMap<String, String>,
}

/// Capability probes and document-level operations of the host
///
/// Probes default to "unsupported" so a minimal platform is a no-op one.
pub trait Platform {
    fn can_play_hls_natively(&self) -> bool {
        false
    }
    fn can_change_volume(&self) -> bool {
        false
    }
    fn can_fullscreen(&self) -> bool {
        false
    }
    fn can_fullscreen_any_element(&self) -> bool {
        false
    }
    fn can_webkit_fullscreen(&self) -> bool {
        false
    }
    fn can_picture_in_picture(&self) -> bool {
        false
    }
    fn can_webkit_picture_in_picture(&self) -> bool {
        false
    }
    fn can_airplay(&self) -> bool {
        false
    }
    fn can_cast(&self) -> bool {
        false
    }
    /// A request-rewrite extension is available for header rules
    fn extension_active(&self) -> bool {
        false
    }

    fn fullscreen_element_active(&self) -> bool {
        false
    }
    fn request_container_fullscreen(&mut self) {}
    fn exit_fullscreen(&mut self) {}
    fn watch_fullscreen(&mut self, _sink: BackendSink) {}
    fn unwatch_fullscreen(&mut self) {}

    fn request_cast_session(&mut self) {}
    fn set_domain_rule(&mut self, _rule: DomainRule) {}
}
