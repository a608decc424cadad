//! Display Adapter - owns the playback element and the streaming engine
//!
//! Coordinates:
//! - Backend selection per load (native element or streaming engine)
//! - Normalization of backend events into [`DisplayEvent`]s
//! - Quality pinning and audio/subtitle track selection
//! - Teardown of every backend resource between load cycles
//!
//! Backend callbacks are queued through a [`BackendSink`] and applied by
//! [`DisplayAdapter::pump`]. Each load cycle has its own generation; events
//! queued by an earlier cycle are dropped.

mod tracks;

use crate::{
    backend::{
        buffered_ahead, media_error_details, BackendEvent, BackendSink, DocumentEvent, DomainRule,
        EngineAudioTrack, EngineError, EngineEvent, EngineFactory, Envelope, MediaElement,
        MediaEvent, Platform, PresentationMode, RuleId, SinkScope, StreamingEngine,
    },
    config::DisplayConfig,
    events::{DisplayEvent, DisplayEventKind, EventEmitter, HandlerId},
    quality::{
        best_effort_level_index, rank_levels, resolution_to_quality, resolve_level_index,
        select_preferred,
    },
    types::*,
    Error, Result,
};
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use tracks::{PendingTrackWaits, TrackWait};
use url::Url;

/// Playback display engine bound to one player mount
pub struct DisplayAdapter {
    /// Unique adapter ID
    id: DisplayId,
    config: DisplayConfig,
    platform: Box<dyn Platform>,
    engines: Box<dyn EngineFactory>,
    emitter: EventEmitter<DisplayEvent>,
    /// Backend event queue
    tx: mpsc::UnboundedSender<Envelope>,
    rx: mpsc::UnboundedReceiver<Envelope>,
    /// Current load cycle
    generation: u64,
    state: DisplayState,
    element: Option<Box<dyn MediaElement>>,
    has_container: bool,
    engine: Option<Box<dyn StreamingEngine>>,
    source: Option<LoadableSource>,
    start_at: f64,
    automatic_quality: bool,
    preferred_quality: Option<SourceQuality>,
    last_volume: f64,
    is_fullscreen: bool,
    is_seeking: bool,
    paused_before_seeking: bool,
    track_waits: PendingTrackWaits,
    destroyed: bool,
}

impl DisplayAdapter {
    /// Create an adapter; backends are attached per load
    pub fn new(
        config: DisplayConfig,
        mut platform: Box<dyn Platform>,
        engines: Box<dyn EngineFactory>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        platform.watch_fullscreen(BackendSink::new(SinkScope::Document, tx.clone()));

        let id = DisplayId::new();
        info!(display_id = %id, "Display adapter created");

        Self {
            id,
            config,
            platform,
            engines,
            emitter: EventEmitter::new(),
            tx,
            rx,
            generation: 0,
            state: DisplayState::Idle,
            element: None,
            has_container: false,
            engine: None,
            source: None,
            start_at: 0.0,
            automatic_quality: true,
            preferred_quality: None,
            last_volume: 1.0,
            is_fullscreen: false,
            is_seeking: false,
            paused_before_seeking: false,
            track_waits: PendingTrackWaits::default(),
            destroyed: false,
        }
    }

    pub fn id(&self) -> DisplayId {
        self.id
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn source(&self) -> Option<&LoadableSource> {
        self.source.as_ref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Number of subtitle waits still in flight
    pub fn pending_subtitle_waits(&self) -> usize {
        self.track_waits.len()
    }

    /// Subscribe to one event kind
    pub fn on<F>(&mut self, kind: DisplayEventKind, handler: F) -> HandlerId
    where
        F: FnMut(&DisplayEvent) + Send + 'static,
    {
        self.emitter.on(kind, handler)
    }

    pub fn off(&mut self, kind: DisplayEventKind, id: HandlerId) -> bool {
        self.emitter.off(kind, id)
    }

    /// Bind a playback element, replacing the previous one
    ///
    /// The current source (if any) is re-attached to the new element and the
    /// last requested volume is applied.
    #[instrument(skip(self, element))]
    pub fn attach_element(&mut self, element: Box<dyn MediaElement>) {
        if self.destroyed {
            warn!("Ignoring element for destroyed display");
            return;
        }
        self.unload_source();
        self.element = Some(element);
        self.set_source();
        self.set_volume(self.last_volume);
    }

    /// Record that a container is available for container fullscreen
    pub fn attach_container(&mut self) {
        self.has_container = true;
    }

    /// Start a new load cycle, tearing down the previous one first
    #[instrument(skip(self, options), fields(display_id = %self.id))]
    pub fn load(&mut self, options: DisplayLoadOptions) -> Result<()> {
        if self.destroyed {
            return Err(Error::AdapterDestroyed);
        }

        self.unload_source();
        self.automatic_quality = options.automatic_quality;
        self.preferred_quality = options.preferred_quality;
        self.start_at = options.start_at;
        self.source = options.source;

        let Some(source) = &self.source else {
            info!("Display unloaded");
            return Ok(());
        };
        info!(url = %source.url, kind = %source.source_type, generation = self.generation, "Loading source");

        self.emit(DisplayEvent::Loading(true));
        self.set_source();
        Ok(())
    }

    /// Apply queued backend events. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(envelope) = self.rx.try_recv() {
            if !self.accepts(envelope.scope) {
                debug!(scope = ?envelope.scope, "Dropping stale backend event");
                continue;
            }
            self.handle_backend_event(envelope.event);
            applied += 1;
        }
        applied
    }

    /// Switch between automatic and pinned quality
    #[instrument(skip(self))]
    pub fn change_quality(&mut self, automatic: bool, preferred: Option<SourceQuality>) {
        if self.destroyed || !self.source.as_ref().is_some_and(LoadableSource::is_adaptive) {
            return;
        }
        self.automatic_quality = automatic;
        self.preferred_quality = preferred;

        let Some(engine) = self.engine.as_mut() else {
            // natively played adaptive sources expose no ladder
            return;
        };

        let levels = engine.levels();
        let mut pinned = None;
        if automatic {
            engine.set_current_level(None);
            engine.set_load_level(None);
        } else if let Some(index) = preferred.and_then(|q| best_effort_level_index(&levels, q)) {
            engine.set_current_level(Some(index));
            engine.set_load_level(Some(index));
            pinned = Some(index);
            info!(level = index, height = levels[index].height, "Quality pinned");
        }

        let quality = pinned
            .and_then(|index| levels.get(index))
            .map(|level| resolution_to_quality(level.height))
            .unwrap_or_else(|| self.effective_quality());
        self.emit(DisplayEvent::ChangedQuality(quality));
    }

    #[instrument(skip(self))]
    pub fn play(&mut self) {
        if let Some(element) = self.element.as_mut() {
            element.play();
        }
    }

    #[instrument(skip(self))]
    pub fn pause(&mut self) {
        if let Some(element) = self.element.as_mut() {
            element.pause();
        }
    }

    /// Enter or leave scrubbing; playback resumes only if it was playing before
    pub fn set_seeking(&mut self, active: bool) {
        if active == self.is_seeking {
            return;
        }
        self.is_seeking = active;

        if !active {
            if !self.paused_before_seeking {
                self.play();
            }
            return;
        }

        self.paused_before_seeking = self.element.as_ref().map_or(true, |el| el.paused());
        self.pause();
    }

    /// Seek, clamped to `[0, duration]`
    #[instrument(skip(self))]
    pub fn set_time(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        let Some(element) = self.element.as_mut() else {
            return;
        };
        let duration = element.duration();
        if duration.is_nan() {
            // metadata not loaded yet
            return;
        }
        let time = seconds.min(duration).max(0.0);
        element.set_current_time(time);
        self.emit(DisplayEvent::Time(time));
    }

    /// Set volume in `[0, 1]`; zero mutes
    #[instrument(skip(self))]
    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_nan() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.last_volume = volume;

        let can_change = self.platform.can_change_volume();
        let Some(element) = self.element.as_mut() else {
            return;
        };
        // muting is always supported
        element.set_muted(volume == 0.0);
        if can_change {
            element.set_volume(volume);
        } else {
            let binary = if volume == 0.0 { 0.0 } else { 1.0 };
            self.emit(DisplayEvent::VolumeChange(binary));
        }
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            return;
        }
        if let Some(element) = self.element.as_mut() {
            element.set_playback_rate(rate);
        }
    }

    #[instrument(skip(self))]
    pub fn toggle_fullscreen(&mut self) {
        if self.destroyed {
            return;
        }
        if self.is_fullscreen {
            self.is_fullscreen = false;
            self.emit(DisplayEvent::Fullscreen(false));
            self.emit(DisplayEvent::NeedsTrack(false));
            if self.platform.fullscreen_element_active() {
                self.platform.exit_fullscreen();
            }
            return;
        }

        if !self.platform.can_fullscreen() {
            return;
        }
        self.is_fullscreen = true;
        self.emit(DisplayEvent::Fullscreen(true));
        if self.platform.fullscreen_element_active() {
            return;
        }

        if self.platform.can_fullscreen_any_element() {
            if self.has_container {
                self.platform.request_container_fullscreen();
            }
            return;
        }
        if self.platform.can_webkit_fullscreen() && self.element.is_some() {
            self.emit(DisplayEvent::NeedsTrack(true));
            if let Some(element) = self.element.as_mut() {
                element.enter_native_fullscreen();
            }
        }
    }

    pub fn toggle_picture_in_picture(&mut self) {
        if self.destroyed {
            return;
        }
        let Some(element) = self.element.as_mut() else {
            return;
        };
        if self.platform.can_webkit_picture_in_picture() {
            let next = match element.presentation_mode() {
                PresentationMode::PictureInPicture => PresentationMode::Inline,
                PresentationMode::Inline => PresentationMode::PictureInPicture,
            };
            element.set_presentation_mode(next);
        }
        if self.platform.can_picture_in_picture() {
            if element.is_picture_in_picture() {
                element.exit_picture_in_picture();
            } else {
                element.request_picture_in_picture();
            }
        }
    }

    pub fn start_airplay(&mut self) {
        if self.destroyed {
            return;
        }
        if !self.platform.can_airplay() {
            return;
        }
        if let Some(element) = self.element.as_mut() {
            element.show_playback_target_picker();
        }
    }

    pub fn start_cast(&mut self) {
        if self.destroyed {
            return;
        }
        if self.platform.can_cast() {
            self.platform.request_cast_session();
        }
    }

    /// Switch to the engine audio track with the same id
    #[instrument(skip(self))]
    pub fn change_audio_track(&mut self, track: &AudioTrackInfo) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let tracks = engine.audio_tracks();
        let Some(index) = tracks.iter().position(|t| t.id.to_string() == track.id) else {
            return;
        };
        engine.set_audio_track(index);
        let info = audio_track_info(&tracks[index]);
        self.emit(DisplayEvent::ChangedAudioTrack(info));
    }

    /// Subtitle tracks announced by the streaming engine
    pub fn get_caption_list(&self) -> Vec<CaptionTrackRef> {
        let Some(engine) = self.engine.as_ref() else {
            return Vec::new();
        };
        engine
            .subtitle_tracks()
            .into_iter()
            .map(|track| CaptionTrackRef {
                id: track.id.to_string(),
                language: track.lang.unwrap_or_else(|| "unknown".to_string()),
                url: track.url,
                needs_proxy: false,
                hls: true,
            })
            .collect()
    }

    /// Ask the engine for a subtitle language and wait until it has loaded
    ///
    /// Resolves immediately when the track is already loaded. Otherwise the
    /// returned future fails with [`Error::TrackLoadTimeout`] once the
    /// configured bound elapses, or [`Error::TrackWaitCancelled`] when a new
    /// load cycle or a newer request for the language supersedes it.
    pub fn set_subtitle_preference(
        &mut self,
        language: &str,
    ) -> impl Future<Output = Result<()>> + Send + 'static {
        let outcome = self.request_subtitle(language);
        async move {
            match outcome? {
                Some(wait) => wait.wait().await,
                None => Ok(()),
            }
        }
    }

    /// Register a wait for `language` unless its track is already loaded
    #[instrument(skip(self))]
    fn request_subtitle(&mut self, language: &str) -> Result<Option<TrackWait>> {
        if self.destroyed {
            return Err(Error::AdapterDestroyed);
        }
        let loaded = self.engine.as_ref().is_some_and(|engine| {
            engine
                .subtitle_tracks()
                .iter()
                .any(|t| t.lang.as_deref() == Some(language) && t.details_loaded)
        });
        if loaded {
            return Ok(None);
        }

        let wait = self
            .track_waits
            .register(language, self.config.subtitle_wait_timeout());
        if let Some(engine) = self.engine.as_mut() {
            engine.set_subtitle_option(language);
        }
        debug!("Waiting for subtitle track");
        Ok(Some(wait))
    }

    /// Release every backend resource; later calls are no-ops
    #[instrument(skip(self), fields(display_id = %self.id))]
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.unload_source();
        self.element = None;
        self.engine = None;
        self.source = None;
        self.platform.unwatch_fullscreen();
        self.emitter.clear();
        while self.rx.try_recv().is_ok() {}
        self.destroyed = true;
        info!("Display adapter destroyed");
    }

    // ---------------------------------------------------------------------
    // Load cycle
    // ---------------------------------------------------------------------

    /// Tear down the current cycle: listeners, engine, element source, waits
    fn unload_source(&mut self) {
        self.generation += 1;

        if let Some(element) = self.element.as_mut() {
            element.remove_listeners();
            element.unload();
        }
        if let Some(mut engine) = self.engine.take() {
            engine.remove_listeners();
            engine.destroy();
            debug!("Streaming engine destroyed");
        }
        self.track_waits.clear();
        self.is_seeking = false;
        self.force_state(DisplayState::Idle);
    }

    /// Attach the current source to the current element
    fn set_source(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        if self.element.is_none() {
            debug!("Source stored until an element is attached");
            return;
        }
        self.transition(DisplayState::Attaching);

        let sink = BackendSink::new(SinkScope::Load(self.generation), self.tx.clone());
        let native = match source.source_type {
            SourceType::Mp4 => true,
            SourceType::Hls => self.platform.can_play_hls_natively(),
        };

        if !native && !self.engines.is_supported() {
            self.fail(DisplayError {
                error_name: "EngineUnsupported".to_string(),
                kind: ErrorType::Hls,
                key: None,
                message: Some("HLS not supported".to_string()),
                stack_trace: None,
            });
            return;
        }

        let Some(element) = self.element.as_mut() else {
            return;
        };
        element.remove_listeners();
        element.add_listeners(sink.clone());

        if native {
            element.set_src(&source.url);
            debug!(url = %source.url, "Attached native playback");
            return;
        }

        let mut engine = self.engines.create(&self.config.engine);
        engine.add_listeners(sink);
        engine.attach_media(element.as_mut());
        engine.load_source(&source.url, &source.request_headers());
        self.engine = Some(engine);
        self.transition(DisplayState::ManifestLoading);
        debug!(url = %source.url, "Attached streaming engine");
    }

    /// Staged initialization, run once when playability is first confirmed
    fn confirm_ready(&mut self) {
        if !self.state.is_pending() {
            return;
        }
        if self.start_at > 0.0 {
            if let Some(element) = self.element.as_mut() {
                element.set_current_time(self.start_at);
            }
        }
        self.set_volume(self.last_volume);
        self.transition(DisplayState::Ready);
    }

    fn accepts(&self, scope: SinkScope) -> bool {
        if self.destroyed {
            return false;
        }
        match scope {
            SinkScope::Load(generation) => generation == self.generation && self.source.is_some(),
            SinkScope::Document => true,
        }
    }

    fn transition(&mut self, target: DisplayState) {
        if self.state == target {
            return;
        }
        if !self.state.can_transition_to(target) {
            warn!(from = %self.state, to = %target, "Ignoring invalid state transition");
            return;
        }
        debug!(from = %self.state, to = %target, "State transition");
        self.state = target;
    }

    fn force_state(&mut self, target: DisplayState) {
        self.state = target;
    }

    fn fail(&mut self, err: DisplayError) {
        error!(name = %err.error_name, kind = ?err.kind, "Playback failed");
        self.transition(DisplayState::Errored);
        self.emit(DisplayEvent::Error(err));
    }

    fn emit(&mut self, event: DisplayEvent) {
        self.emitter.emit(&event);
    }

    // ---------------------------------------------------------------------
    // Backend event normalization
    // ---------------------------------------------------------------------

    fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Media(event) => self.handle_media_event(event),
            BackendEvent::Engine(event) => self.handle_engine_event(event),
            BackendEvent::Document(DocumentEvent::FullscreenChange { active }) => {
                self.is_fullscreen = active;
                self.emit(DisplayEvent::Fullscreen(active));
                if !active {
                    self.emit(DisplayEvent::NeedsTrack(false));
                }
            }
        }
    }

    fn handle_media_event(&mut self, event: MediaEvent) {
        let Some(element) = self.element.as_ref() else {
            return;
        };

        match event {
            MediaEvent::Play => {
                self.confirm_ready();
                self.transition(DisplayState::Playing);
                self.emit(DisplayEvent::Play);
                self.emit(DisplayEvent::Loading(false));
            }
            MediaEvent::Playing => {
                self.confirm_ready();
                self.transition(DisplayState::Playing);
                self.emit(DisplayEvent::Play);
            }
            MediaEvent::Pause => {
                self.transition(DisplayState::Paused);
                self.emit(DisplayEvent::Pause);
            }
            MediaEvent::CanPlay => {
                self.confirm_ready();
                self.emit(DisplayEvent::Loading(false));
            }
            MediaEvent::Waiting => self.emit(DisplayEvent::Loading(true)),
            MediaEvent::VolumeChange => {
                let volume = if element.muted() { 0.0 } else { element.volume() };
                self.emit(DisplayEvent::VolumeChange(volume));
            }
            MediaEvent::TimeUpdate => {
                let time = element.current_time();
                self.emit(DisplayEvent::Time(time));
            }
            MediaEvent::LoadedMetadata => {
                let duration = element.duration();
                if self.engine.is_none() {
                    // progressive or natively played: no ladder
                    self.emit(DisplayEvent::Qualities(vec![SourceQuality::Unknown]));
                    self.emit(DisplayEvent::ChangedQuality(SourceQuality::Unknown));
                }
                self.emit(DisplayEvent::Duration(duration));
            }
            MediaEvent::Progress => {
                let buffered = buffered_ahead(element.current_time(), &element.buffered());
                self.emit(DisplayEvent::Buffered(buffered));
            }
            MediaEvent::Error => {
                let details = media_error_details(element.error_code());
                self.fail(DisplayError {
                    error_name: details.name.to_string(),
                    kind: ErrorType::HtmlVideo,
                    key: Some(details.key.to_string()),
                    message: None,
                    stack_trace: None,
                });
            }
            MediaEvent::EndFullscreen => {
                self.is_fullscreen = false;
                self.emit(DisplayEvent::Fullscreen(false));
                self.emit(DisplayEvent::NeedsTrack(false));
            }
            MediaEvent::PlaybackTargetAvailability { available } => {
                if available {
                    self.emit(DisplayEvent::CanAirplay(true));
                }
            }
            MediaEvent::RateChange => {
                let rate = element.playback_rate();
                self.emit(DisplayEvent::PlaybackRate(rate));
            }
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        if self.engine.is_none() {
            return;
        }

        match event {
            EngineEvent::Error(err) => self.handle_engine_error(err),
            EngineEvent::ManifestLoaded => {
                self.report_levels();
                self.setup_quality();
                self.report_audio_tracks();
            }
            EngineEvent::LevelLoaded { fragment_urls } => {
                self.apply_domain_rule(RuleId::HlsLevels, &fragment_urls);
            }
            EngineEvent::AudioTrackLoaded { fragment_urls } => {
                self.apply_domain_rule(RuleId::HlsAudio, &fragment_urls);
            }
            EngineEvent::LevelSwitched { level } => {
                let levels = self.engine.as_ref().map(|e| e.levels()).unwrap_or_default();
                if let Some(level) = levels.get(level) {
                    let quality = resolution_to_quality(level.height);
                    debug!(height = level.height, quality = %quality, "Level switched");
                    self.emit(DisplayEvent::ChangedQuality(quality));
                }
            }
            EngineEvent::SubtitleTrackLoaded => {
                let tracks = self
                    .engine
                    .as_ref()
                    .map(|e| e.subtitle_tracks())
                    .unwrap_or_default();
                let settled = self.track_waits.resolve_ready(|language| {
                    tracks
                        .iter()
                        .any(|t| t.lang.as_deref() == Some(language) && t.details_loaded)
                });
                for language in settled {
                    debug!(language = %language, "Subtitle track loaded");
                }
            }
        }
    }

    fn handle_engine_error(&mut self, err: EngineError) {
        let current = self.source.as_ref().map(|s| &s.url);
        let ours = err.url.as_ref().map_or(true, |url| Some(url) == current);

        if !err.fatal {
            // the engine's retry policy owns recovery
            warn!(name = %err.name, details = %err.details, "Recoverable streaming error");
            return;
        }
        if !ours {
            warn!(name = %err.name, url = ?err.url, "Fatal streaming error for another source");
            return;
        }

        self.fail(DisplayError {
            error_name: err.name,
            kind: ErrorType::Hls,
            key: None,
            message: Some(err.message),
            stack_trace: err.stack,
        });
    }

    fn report_levels(&mut self) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        let qualities = rank_levels(&engine.levels());
        self.emit(DisplayEvent::Qualities(qualities));
    }

    /// Pin or release the engine level after the manifest is known
    fn setup_quality(&mut self) {
        if self.platform.can_play_hls_natively() {
            return;
        }
        let automatic = self.automatic_quality;
        let preferred = self.preferred_quality;
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        if automatic {
            engine.set_current_level(None);
            engine.set_load_level(None);
        } else {
            let levels = engine.levels();
            let qualities = rank_levels(&levels);
            let index = select_preferred(&qualities, preferred, automatic)
                .and_then(|quality| resolve_level_index(&levels, quality));
            if let Some(index) = index {
                engine.set_current_level(Some(index));
                engine.set_load_level(Some(index));
                info!(level = index, height = levels[index].height, "Restored preferred quality");
            }
        }

        let quality = self.effective_quality();
        self.emit(DisplayEvent::ChangedQuality(quality));
    }

    /// Label of the level playing, or about to be loaded
    fn effective_quality(&self) -> SourceQuality {
        let Some(engine) = self.engine.as_ref() else {
            return SourceQuality::Unknown;
        };
        let levels = engine.levels();
        engine
            .current_level()
            .or_else(|| engine.load_level())
            .and_then(|index| levels.get(index))
            .map(|level| resolution_to_quality(level.height))
            .unwrap_or(SourceQuality::Unknown)
    }

    fn report_audio_tracks(&mut self) {
        let preferred = self.config.preferred_audio_language.clone();
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let tracks = engine.audio_tracks();

        if let Some(language) = preferred {
            if let Some(index) = tracks.iter().position(|t| t.lang.as_deref() == Some(&language)) {
                engine.set_audio_track(index);
            }
        }

        let Some(current) = tracks.get(engine.audio_track().unwrap_or(0)) else {
            return;
        };
        let current = audio_track_info(current);
        let all = tracks.iter().map(audio_track_info).collect();
        self.emit(DisplayEvent::ChangedAudioTrack(current));
        self.emit(DisplayEvent::AudioTracks(all));
    }

    fn apply_domain_rule(&mut self, rule_id: RuleId, fragment_urls: &[Url]) {
        if !self.platform.extension_active() {
            return;
        }
        let Some(source) = self.source.as_ref() else {
            return;
        };

        let mut target_domains: Vec<String> = Vec::new();
        for host in fragment_urls.iter().filter_map(Url::host_str) {
            if !target_domains.iter().any(|d| d == host) {
                target_domains.push(host.to_string());
            }
        }

        let rule = DomainRule {
            rule_id,
            target_domains,
            request_headers: source.request_headers(),
        };
        debug!(rule = ?rule.rule_id, domains = rule.target_domains.len(), "Updating domain rule");
        self.platform.set_domain_rule(rule);
    }
}

impl Drop for DisplayAdapter {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn audio_track_info(track: &EngineAudioTrack) -> AudioTrackInfo {
    AudioTrackInfo {
        id: track.id.to_string(),
        label: track.name.clone(),
        language: track.lang.clone().unwrap_or_else(|| "unknown".to_string()),
    }
}
