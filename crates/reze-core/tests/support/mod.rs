//! In-memory backends for driving a `DisplayAdapter` from tests

#![allow(dead_code)]

use reze_core::backend::{
    BackendSink, DomainRule, EngineAudioTrack, EngineSubtitleTrack, MediaElement, MediaEvent,
    EngineEvent, Platform, PresentationMode, StreamingEngine, EngineFactory,
};
use reze_core::{
    DisplayAdapter, DisplayConfig, DisplayEvent, DisplayEventKind, EngineConfig, Level,
    LoadableSource,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

// =============================================================================
// Media element
// =============================================================================

pub struct ElementState {
    pub src: Option<Url>,
    pub sink: Option<BackendSink>,
    pub unloads: usize,
    pub listener_adds: usize,
    pub paused: bool,
    pub play_calls: usize,
    pub pause_calls: usize,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: f64,
    pub buffered: Vec<(f64, f64)>,
    pub error_code: Option<u16>,
    pub native_fullscreen: bool,
    pub picture_in_picture: bool,
    pub presentation_mode: PresentationMode,
    pub target_pickers: usize,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            src: None,
            sink: None,
            unloads: 0,
            listener_adds: 0,
            paused: true,
            play_calls: 0,
            pause_calls: 0,
            current_time: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            muted: false,
            playback_rate: 1.0,
            buffered: Vec::new(),
            error_code: None,
            native_fullscreen: false,
            picture_in_picture: false,
            presentation_mode: PresentationMode::Inline,
            target_pickers: 0,
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeElement {
    state: Arc<Mutex<ElementState>>,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, ElementState> {
        self.state.lock().unwrap()
    }

    /// Current listener sink, if listeners are registered
    pub fn sink(&self) -> Option<BackendSink> {
        self.state().sink.clone()
    }

    /// Fire an event through the registered listeners
    pub fn fire(&self, event: MediaEvent) -> bool {
        match self.sink() {
            Some(sink) => sink.send(event),
            None => false,
        }
    }
}

impl MediaElement for FakeElement {
    fn set_src(&mut self, url: &Url) {
        self.state().src = Some(url.clone());
    }

    fn unload(&mut self) {
        let mut state = self.state();
        state.src = None;
        state.unloads += 1;
    }

    fn add_listeners(&mut self, sink: BackendSink) {
        let mut state = self.state();
        state.sink = Some(sink);
        state.listener_adds += 1;
    }

    fn remove_listeners(&mut self) {
        self.state().sink = None;
    }

    fn play(&mut self) {
        let mut state = self.state();
        state.paused = false;
        state.play_calls += 1;
    }

    fn pause(&mut self) {
        let mut state = self.state();
        state.paused = true;
        state.pause_calls += 1;
    }

    fn paused(&self) -> bool {
        self.state().paused
    }

    fn current_time(&self) -> f64 {
        self.state().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.state().current_time = seconds;
    }

    fn duration(&self) -> f64 {
        self.state().duration
    }

    fn volume(&self) -> f64 {
        self.state().volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.state().volume = volume;
    }

    fn muted(&self) -> bool {
        self.state().muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.state().muted = muted;
    }

    fn playback_rate(&self) -> f64 {
        self.state().playback_rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.state().playback_rate = rate;
    }

    fn buffered(&self) -> Vec<(f64, f64)> {
        self.state().buffered.clone()
    }

    fn error_code(&self) -> Option<u16> {
        self.state().error_code
    }

    fn enter_native_fullscreen(&mut self) {
        self.state().native_fullscreen = true;
    }

    fn is_picture_in_picture(&self) -> bool {
        self.state().picture_in_picture
    }

    fn request_picture_in_picture(&mut self) {
        self.state().picture_in_picture = true;
    }

    fn exit_picture_in_picture(&mut self) {
        self.state().picture_in_picture = false;
    }

    fn presentation_mode(&self) -> PresentationMode {
        self.state().presentation_mode
    }

    fn set_presentation_mode(&mut self, mode: PresentationMode) {
        self.state().presentation_mode = mode;
    }

    fn show_playback_target_picker(&mut self) {
        self.state().target_pickers += 1;
    }
}

// =============================================================================
// Streaming engine
// =============================================================================

#[derive(Default)]
pub struct EngineState {
    pub sink: Option<BackendSink>,
    pub attached: bool,
    pub loaded: Option<(Url, BTreeMap<String, String>)>,
    pub levels: Vec<Level>,
    pub current_level: Option<usize>,
    pub load_level: Option<usize>,
    pub audio_tracks: Vec<EngineAudioTrack>,
    pub audio_track: Option<usize>,
    pub subtitle_tracks: Vec<EngineSubtitleTrack>,
    pub subtitle_requests: Vec<String>,
    pub destroy_calls: usize,
}

#[derive(Clone, Default)]
pub struct FakeEngine {
    state: Arc<Mutex<EngineState>>,
}

impl FakeEngine {
    pub fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap()
    }

    pub fn sink(&self) -> Option<BackendSink> {
        self.state().sink.clone()
    }

    pub fn fire(&self, event: EngineEvent) -> bool {
        match self.sink() {
            Some(sink) => sink.send(event),
            None => false,
        }
    }
}

impl StreamingEngine for FakeEngine {
    fn add_listeners(&mut self, sink: BackendSink) {
        self.state().sink = Some(sink);
    }

    fn remove_listeners(&mut self) {
        self.state().sink = None;
    }

    fn attach_media(&mut self, _element: &mut dyn MediaElement) {
        self.state().attached = true;
    }

    fn load_source(&mut self, url: &Url, headers: &BTreeMap<String, String>) {
        self.state().loaded = Some((url.clone(), headers.clone()));
    }

    fn levels(&self) -> Vec<Level> {
        self.state().levels.clone()
    }

    fn current_level(&self) -> Option<usize> {
        self.state().current_level
    }

    fn load_level(&self) -> Option<usize> {
        self.state().load_level
    }

    fn set_current_level(&mut self, level: Option<usize>) {
        self.state().current_level = level;
    }

    fn set_load_level(&mut self, level: Option<usize>) {
        self.state().load_level = level;
    }

    fn audio_tracks(&self) -> Vec<EngineAudioTrack> {
        self.state().audio_tracks.clone()
    }

    fn audio_track(&self) -> Option<usize> {
        self.state().audio_track
    }

    fn set_audio_track(&mut self, index: usize) {
        self.state().audio_track = Some(index);
    }

    fn subtitle_tracks(&self) -> Vec<EngineSubtitleTrack> {
        self.state().subtitle_tracks.clone()
    }

    fn set_subtitle_option(&mut self, language: &str) {
        self.state().subtitle_requests.push(language.to_string());
    }

    fn destroy(&mut self) {
        let mut state = self.state();
        state.attached = false;
        state.destroy_calls += 1;
    }
}

#[derive(Default)]
pub struct FactoryState {
    pub unsupported: bool,
    pub levels: Vec<Level>,
    pub audio_tracks: Vec<EngineAudioTrack>,
    pub subtitle_tracks: Vec<EngineSubtitleTrack>,
    pub created: Vec<FakeEngine>,
    pub configs: Vec<EngineConfig>,
}

/// Hands out engines pre-populated with the configured ladder and tracks
#[derive(Clone, Default)]
pub struct FakeEngineFactory {
    state: Arc<Mutex<FactoryState>>,
}

impl FakeEngineFactory {
    pub fn state(&self) -> MutexGuard<'_, FactoryState> {
        self.state.lock().unwrap()
    }

    pub fn with_heights(self, heights: &[u32]) -> Self {
        self.state().levels = heights
            .iter()
            .map(|&h| Level::new(h * 16 / 9, h, u64::from(h) * 4_000))
            .collect();
        self
    }

    pub fn created(&self) -> usize {
        self.state().created.len()
    }

    /// Most recently created engine
    pub fn last(&self) -> FakeEngine {
        self.state().created.last().cloned().expect("no engine created")
    }
}

impl EngineFactory for FakeEngineFactory {
    fn is_supported(&self) -> bool {
        !self.state().unsupported
    }

    fn create(&self, config: &EngineConfig) -> Box<dyn StreamingEngine> {
        let mut factory = self.state();
        let engine = FakeEngine::default();
        {
            let mut state = engine.state();
            state.levels = factory.levels.clone();
            state.audio_tracks = factory.audio_tracks.clone();
            state.subtitle_tracks = factory.subtitle_tracks.clone();
        }
        factory.created.push(engine.clone());
        factory.configs.push(config.clone());
        Box::new(engine)
    }
}

// =============================================================================
// Platform
// =============================================================================

#[derive(Default)]
pub struct PlatformState {
    pub native_hls: bool,
    pub can_change_volume: bool,
    pub can_fullscreen_any_element: bool,
    pub can_webkit_fullscreen: bool,
    pub can_picture_in_picture: bool,
    pub can_airplay: bool,
    pub can_cast: bool,
    pub extension_active: bool,
    pub fullscreen_element_active: bool,
    pub fullscreen_sink: Option<BackendSink>,
    pub container_fullscreen_requests: usize,
    pub exit_fullscreen_calls: usize,
    pub unwatch_calls: usize,
    pub cast_requests: usize,
    pub domain_rules: Vec<DomainRule>,
}

#[derive(Clone, Default)]
pub struct FakePlatform {
    state: Arc<Mutex<PlatformState>>,
}

impl FakePlatform {
    pub fn state(&self) -> MutexGuard<'_, PlatformState> {
        self.state.lock().unwrap()
    }
}

impl Platform for FakePlatform {
    fn can_play_hls_natively(&self) -> bool {
        self.state().native_hls
    }

    fn can_change_volume(&self) -> bool {
        self.state().can_change_volume
    }

    fn can_fullscreen(&self) -> bool {
        let state = self.state();
        state.can_fullscreen_any_element || state.can_webkit_fullscreen
    }

    fn can_fullscreen_any_element(&self) -> bool {
        self.state().can_fullscreen_any_element
    }

    fn can_webkit_fullscreen(&self) -> bool {
        self.state().can_webkit_fullscreen
    }

    fn can_picture_in_picture(&self) -> bool {
        self.state().can_picture_in_picture
    }

    fn can_airplay(&self) -> bool {
        self.state().can_airplay
    }

    fn can_cast(&self) -> bool {
        self.state().can_cast
    }

    fn extension_active(&self) -> bool {
        self.state().extension_active
    }

    fn fullscreen_element_active(&self) -> bool {
        self.state().fullscreen_element_active
    }

    fn request_container_fullscreen(&mut self) {
        let mut state = self.state();
        state.container_fullscreen_requests += 1;
        state.fullscreen_element_active = true;
    }

    fn exit_fullscreen(&mut self) {
        let mut state = self.state();
        state.exit_fullscreen_calls += 1;
        state.fullscreen_element_active = false;
    }

    fn watch_fullscreen(&mut self, sink: BackendSink) {
        self.state().fullscreen_sink = Some(sink);
    }

    fn unwatch_fullscreen(&mut self) {
        let mut state = self.state();
        state.fullscreen_sink = None;
        state.unwatch_calls += 1;
    }

    fn request_cast_session(&mut self) {
        self.state().cast_requests += 1;
    }

    fn set_domain_rule(&mut self, rule: DomainRule) {
        self.state().domain_rules.push(rule);
    }
}

// =============================================================================
// Harness
// =============================================================================

/// A display wired to fakes, recording every emitted event
pub struct Harness {
    pub display: DisplayAdapter,
    pub element: FakeElement,
    pub engines: FakeEngineFactory,
    pub platform: FakePlatform,
    events: Arc<Mutex<Vec<DisplayEvent>>>,
}

impl Harness {
    pub fn new(engines: FakeEngineFactory, platform: FakePlatform) -> Self {
        Self::with_config(DisplayConfig::default(), engines, platform)
    }

    pub fn with_config(
        config: DisplayConfig,
        engines: FakeEngineFactory,
        platform: FakePlatform,
    ) -> Self {
        let mut display =
            DisplayAdapter::new(config, Box::new(platform.clone()), Box::new(engines.clone()));
        let element = FakeElement::new();
        display.attach_element(Box::new(element.clone()));

        let events = Arc::new(Mutex::new(Vec::new()));
        for kind in DisplayEventKind::ALL {
            let events = Arc::clone(&events);
            display.on(kind, move |event| events.lock().unwrap().push(event.clone()));
        }

        Self {
            display,
            element,
            engines,
            platform,
            events,
        }
    }

    /// A 360/720/1080 ladder on a platform that can change volume
    pub fn hls() -> Self {
        let platform = FakePlatform::default();
        platform.state().can_change_volume = true;
        Self::new(
            FakeEngineFactory::default().with_heights(&[360, 720, 1080]),
            platform,
        )
    }

    /// Drain recorded events
    pub fn take_events(&self) -> Vec<DisplayEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn pump(&mut self) -> usize {
        self.display.pump()
    }
}

pub fn hls_source() -> LoadableSource {
    LoadableSource::hls(Url::parse("https://cdn.example.com/show/master.m3u8").unwrap())
}

pub fn other_hls_source() -> LoadableSource {
    LoadableSource::hls(Url::parse("https://cdn.example.com/other/master.m3u8").unwrap())
}

pub fn mp4_source() -> LoadableSource {
    LoadableSource::mp4(Url::parse("https://cdn.example.com/clip.mp4").unwrap())
}

pub fn audio_track(id: u32, name: &str, lang: &str) -> EngineAudioTrack {
    EngineAudioTrack {
        id,
        name: name.to_string(),
        lang: Some(lang.to_string()),
    }
}

pub fn subtitle_track(id: u32, lang: &str, details_loaded: bool) -> EngineSubtitleTrack {
    EngineSubtitleTrack {
        id,
        lang: Some(lang.to_string()),
        url: format!("https://cdn.example.com/show/subs/{lang}.m3u8"),
        details_loaded,
    }
}
