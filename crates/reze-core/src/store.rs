//! Playback store - mirrors display events into a queryable snapshot

use crate::{
    display::DisplayAdapter,
    events::{DisplayEvent, DisplayEventKind, HandlerId},
    types::{AudioTrackInfo, DisplayError, SourceQuality},
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Last known playback state as reported by the display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub playing: bool,
    /// Playback started at least once since the store was created or reset
    pub has_played: bool,
    pub loading: bool,
    pub time: f64,
    pub duration: f64,
    pub buffered: f64,
    pub volume: f64,
    pub playback_rate: f64,
    pub fullscreen: bool,
    pub needs_track: bool,
    pub can_airplay: bool,
    pub qualities: Vec<SourceQuality>,
    pub current_quality: Option<SourceQuality>,
    pub audio_tracks: Vec<AudioTrackInfo>,
    pub current_audio_track: Option<AudioTrackInfo>,
    pub error: Option<DisplayError>,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            playing: false,
            has_played: false,
            loading: false,
            time: 0.0,
            duration: 0.0,
            buffered: 0.0,
            volume: 1.0,
            playback_rate: 1.0,
            fullscreen: false,
            needs_track: false,
            can_airplay: false,
            qualities: Vec::new(),
            current_quality: None,
            audio_tracks: Vec::new(),
            current_audio_track: None,
            error: None,
        }
    }
}

impl PlaybackSnapshot {
    /// Fold one event into the snapshot
    pub fn apply(&mut self, event: &DisplayEvent) {
        match event {
            DisplayEvent::Play => {
                self.playing = true;
                self.has_played = true;
                self.error = None;
            }
            DisplayEvent::Pause => self.playing = false,
            DisplayEvent::Loading(loading) => self.loading = *loading,
            DisplayEvent::Time(time) => self.time = *time,
            DisplayEvent::Duration(duration) => {
                // NaN until metadata is known
                if duration.is_finite() {
                    self.duration = *duration;
                }
            }
            DisplayEvent::Buffered(buffered) => self.buffered = *buffered,
            DisplayEvent::VolumeChange(volume) => self.volume = *volume,
            DisplayEvent::PlaybackRate(rate) => self.playback_rate = *rate,
            DisplayEvent::Fullscreen(active) => self.fullscreen = *active,
            DisplayEvent::NeedsTrack(needed) => self.needs_track = *needed,
            DisplayEvent::CanAirplay(available) => self.can_airplay = *available,
            DisplayEvent::Qualities(qualities) => self.qualities = qualities.clone(),
            DisplayEvent::ChangedQuality(quality) => self.current_quality = Some(*quality),
            DisplayEvent::AudioTracks(tracks) => self.audio_tracks = tracks.clone(),
            DisplayEvent::ChangedAudioTrack(track) => {
                self.current_audio_track = Some(track.clone())
            }
            DisplayEvent::Error(err) => {
                self.playing = false;
                self.loading = false;
                self.error = Some(err.clone());
            }
        }
    }

    /// Fraction of the duration that has been played
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Subscribes to every display event kind and keeps a [`PlaybackSnapshot`]
#[derive(Default)]
pub struct PlaybackStore {
    snapshot: Arc<Mutex<PlaybackSnapshot>>,
    registrations: Vec<(DisplayEventKind, HandlerId)>,
}

impl PlaybackStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackSnapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register handlers on `display`; a store already attached is detached first
    pub fn attach(&mut self, display: &mut DisplayAdapter) {
        self.detach(display);
        for kind in DisplayEventKind::ALL {
            let snapshot = Arc::clone(&self.snapshot);
            let id = display.on(kind, move |event| {
                snapshot
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .apply(event);
            });
            self.registrations.push((kind, id));
        }
        let display_id = display.id();
        debug!(display_id = %display_id, "Playback store attached");
    }

    /// Remove exactly the handlers this store registered. Returns how many were removed.
    pub fn detach(&mut self, display: &mut DisplayAdapter) -> usize {
        self.registrations
            .drain(..)
            .filter(|(kind, id)| display.off(*kind, *id))
            .count()
    }

    pub fn is_attached(&self) -> bool {
        !self.registrations.is_empty()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.lock().clone()
    }

    /// Forget everything seen so far
    pub fn reset(&self) {
        *self.lock() = PlaybackSnapshot::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorType;

    #[test]
    fn test_apply_playback_events() {
        let mut snapshot = PlaybackSnapshot::default();
        snapshot.apply(&DisplayEvent::Loading(true));
        snapshot.apply(&DisplayEvent::Duration(120.0));
        snapshot.apply(&DisplayEvent::Time(30.0));
        snapshot.apply(&DisplayEvent::Play);

        assert!(snapshot.playing);
        assert!(snapshot.loading);
        assert_eq!(snapshot.progress(), 0.25);

        snapshot.apply(&DisplayEvent::Pause);
        assert!(!snapshot.playing);
        assert!(snapshot.has_played);
    }

    #[test]
    fn test_unknown_duration_is_ignored() {
        let mut snapshot = PlaybackSnapshot::default();
        snapshot.apply(&DisplayEvent::Duration(f64::NAN));
        assert_eq!(snapshot.duration, 0.0);
        assert_eq!(snapshot.progress(), 0.0);
    }

    #[test]
    fn test_error_stops_playback() {
        let mut snapshot = PlaybackSnapshot::default();
        snapshot.apply(&DisplayEvent::Play);
        snapshot.apply(&DisplayEvent::Error(DisplayError {
            error_name: "MEDIA_ERR_DECODE".into(),
            kind: ErrorType::HtmlVideo,
            key: Some("player.playbackErrors.decode".into()),
            message: None,
            stack_trace: None,
        }));

        assert!(!snapshot.playing);
        assert_eq!(
            snapshot.error.as_ref().map(|e| e.error_name.as_str()),
            Some("MEDIA_ERR_DECODE")
        );
    }

    #[test]
    fn test_quality_events() {
        let mut snapshot = PlaybackSnapshot::default();
        snapshot.apply(&DisplayEvent::Qualities(vec![
            SourceQuality::Q480,
            SourceQuality::Q1080,
        ]));
        snapshot.apply(&DisplayEvent::ChangedQuality(SourceQuality::Q480));

        assert_eq!(snapshot.qualities.len(), 2);
        assert_eq!(snapshot.current_quality, Some(SourceQuality::Q480));
    }
}
