//! Typed publish/subscribe for display events
//!
//! Handlers run synchronously on the emitting call, in registration order.
//! Each registration returns a [`HandlerId`]; `off` removes exactly that
//! registration and nothing else.

use crate::types::{AudioTrackInfo, DisplayError, SourceQuality};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// An event that can be routed by kind
pub trait EventPayload {
    type Kind: Copy + Eq + Hash + Debug;

    fn kind(&self) -> Self::Kind;
}

/// Identity of a single handler registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler<E> = Box<dyn FnMut(&E) + Send>;

/// Minimal typed event emitter
pub struct EventEmitter<E: EventPayload> {
    handlers: HashMap<E::Kind, Vec<(HandlerId, Handler<E>)>>,
    next_id: u64,
}

impl<E: EventPayload> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            next_id: 0,
        }
    }

    /// Register a handler for one event kind
    pub fn on<F>(&mut self, kind: E::Kind, handler: F) -> HandlerId
    where
        F: FnMut(&E) + Send + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Remove a registration. Returns false if it was not registered for `kind`.
    pub fn off(&mut self, kind: E::Kind, id: HandlerId) -> bool {
        let Some(list) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(registered, _)| *registered != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.handlers.remove(&kind);
        }
        removed
    }

    /// Deliver an event to every handler of its kind
    pub fn emit(&mut self, event: &E) {
        if let Some(list) = self.handlers.get_mut(&event.kind()) {
            for (_, handler) in list.iter_mut() {
                handler(event);
            }
        }
    }

    pub fn handler_count(&self, kind: E::Kind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    pub fn total_handlers(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    /// Drop every registration
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl<E: EventPayload> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform events emitted by the display adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum DisplayEvent {
    Play,
    Pause,
    Loading(bool),
    /// Current position in seconds
    Time(f64),
    Duration(f64),
    /// End of the buffered range around the current position, in seconds
    Buffered(f64),
    /// Effective volume, 0 when muted
    VolumeChange(f64),
    PlaybackRate(f64),
    Fullscreen(bool),
    /// The platform needs a native text track to show captions in fullscreen
    NeedsTrack(bool),
    CanAirplay(bool),
    Qualities(Vec<SourceQuality>),
    ChangedQuality(SourceQuality),
    AudioTracks(Vec<AudioTrackInfo>),
    ChangedAudioTrack(AudioTrackInfo),
    Error(DisplayError),
}

/// Discriminant of [`DisplayEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayEventKind {
    Play,
    Pause,
    Loading,
    Time,
    Duration,
    Buffered,
    VolumeChange,
    PlaybackRate,
    Fullscreen,
    NeedsTrack,
    CanAirplay,
    Qualities,
    ChangedQuality,
    AudioTracks,
    ChangedAudioTrack,
    Error,
}

impl DisplayEventKind {
    pub const ALL: [DisplayEventKind; 16] = [
        DisplayEventKind::Play,
        DisplayEventKind::Pause,
        DisplayEventKind::Loading,
        DisplayEventKind::Time,
        DisplayEventKind::Duration,
        DisplayEventKind::Buffered,
        DisplayEventKind::VolumeChange,
        DisplayEventKind::PlaybackRate,
        DisplayEventKind::Fullscreen,
        DisplayEventKind::NeedsTrack,
        DisplayEventKind::CanAirplay,
        DisplayEventKind::Qualities,
        DisplayEventKind::ChangedQuality,
        DisplayEventKind::AudioTracks,
        DisplayEventKind::ChangedAudioTrack,
        DisplayEventKind::Error,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DisplayEventKind::Play => "play",
            DisplayEventKind::Pause => "pause",
            DisplayEventKind::Loading => "loading",
            DisplayEventKind::Time => "time",
            DisplayEventKind::Duration => "duration",
            DisplayEventKind::Buffered => "buffered",
            DisplayEventKind::VolumeChange => "volumechange",
            DisplayEventKind::PlaybackRate => "playbackrate",
            DisplayEventKind::Fullscreen => "fullscreen",
            DisplayEventKind::NeedsTrack => "needstrack",
            DisplayEventKind::CanAirplay => "canairplay",
            DisplayEventKind::Qualities => "qualities",
            DisplayEventKind::ChangedQuality => "changedquality",
            DisplayEventKind::AudioTracks => "audiotracks",
            DisplayEventKind::ChangedAudioTrack => "changedaudiotrack",
            DisplayEventKind::Error => "error",
        }
    }
}

impl std::fmt::Display for DisplayEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl EventPayload for DisplayEvent {
    type Kind = DisplayEventKind;

    fn kind(&self) -> DisplayEventKind {
        match self {
            DisplayEvent::Play => DisplayEventKind::Play,
            DisplayEvent::Pause => DisplayEventKind::Pause,
            DisplayEvent::Loading(_) => DisplayEventKind::Loading,
            DisplayEvent::Time(_) => DisplayEventKind::Time,
            DisplayEvent::Duration(_) => DisplayEventKind::Duration,
            DisplayEvent::Buffered(_) => DisplayEventKind::Buffered,
            DisplayEvent::VolumeChange(_) => DisplayEventKind::VolumeChange,
            DisplayEvent::PlaybackRate(_) => DisplayEventKind::PlaybackRate,
            DisplayEvent::Fullscreen(_) => DisplayEventKind::Fullscreen,
            DisplayEvent::NeedsTrack(_) => DisplayEventKind::NeedsTrack,
            DisplayEvent::CanAirplay(_) => DisplayEventKind::CanAirplay,
            DisplayEvent::Qualities(_) => DisplayEventKind::Qualities,
            DisplayEvent::ChangedQuality(_) => DisplayEventKind::ChangedQuality,
            DisplayEvent::AudioTracks(_) => DisplayEventKind::AudioTracks,
            DisplayEvent::ChangedAudioTrack(_) => DisplayEventKind::ChangedAudioTrack,
            DisplayEvent::Error(_) => DisplayEventKind::Error,
        }
    }
}
