//! Reze Core - playback display engine for the Reze player
//!
//! This crate turns a playable source into uniform playback events:
//! - Backend selection (native element or adaptive streaming engine)
//! - Quality ladder mapping and pinning
//! - Audio and subtitle track selection
//! - A typed event emitter for consumers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Reze Core                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │    Media     │  │  Streaming   │  │   Platform   │           │
//! │  │   Element    │  │    Engine    │  │  (document)  │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └────────── BackendSink ────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐      ┌──────────────┐        │
//! │                    │   Display   │──────│   Quality    │        │
//! │                    │   Adapter   │      │   Mapper     │        │
//! │                    └──────┬──────┘      └──────────────┘        │
//! │                           │                                     │
//! │                    ┌──────┴──────┐      ┌──────────────┐        │
//! │                    │    Event    │──────│   Playback   │        │
//! │                    │   Emitter   │      │    Store     │        │
//! │                    └─────────────┘      └──────────────┘        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod manifest;
pub mod quality;
pub mod store;
pub mod types;

pub use backend::{
    BackendEvent, BackendSink, DocumentEvent, EngineError, EngineEvent, EngineFactory,
    MediaElement, MediaEvent, Platform, StreamingEngine,
};
pub use config::{DisplayConfig, EngineConfig};
pub use display::DisplayAdapter;
pub use error::{Error, Result};
pub use events::{DisplayEvent, DisplayEventKind, EventEmitter, EventPayload, HandlerId};
pub use manifest::{fetch_ladder, parse_ladder, LadderManifest};
pub use quality::{quality_to_resolution, quality_to_string, resolution_to_quality};
pub use store::{PlaybackSnapshot, PlaybackStore};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log library initialization
pub fn init() {
    tracing::info!(version = VERSION, "Reze Core initialized");
}
