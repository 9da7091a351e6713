//! Cassette - Playback Control
//!
//! Platform-agnostic playlist and transport control for Cassette.
//!
//! This crate provides:
//! - Playlist with wrap-around next/previous and per-track selection
//! - Transport (play/pause, seek, ±10s skip clamped to the track)
//! - Playback rate from a fixed selector set (0.5x-2x)
//! - Volume (0.0-1.0) with independent mute
//! - Periodic reconciliation of position/duration with the engine
//! - Scoped release of source handles (object URLs, etc.)
//!
//! # Architecture
//!
//! `cassette-playback` is completely platform-agnostic:
//! - State changes are pure transitions (`PlaylistState::apply`)
//! - `PlayerController` commits a transition, then drives the engine
//! - The audio engine is provided via the `AudioEngine` trait
//!
//! With the `wasm` feature, `wasm::WasmPlayer` exposes the controller to
//! the browser on top of an `HtmlAudioElement`.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use cassette_playback::{NewTrack, PlayerConfig, PlayerController};
//!
//! let mut player = PlayerController::new(PlayerConfig::default());
//!
//! player
//!     .add_tracks([
//!         NewTrack::new("blob:a", "a.mp3"),
//!         NewTrack::new("blob:b", "b.mp3"),
//!     ])
//!     .unwrap();
//! assert!(player.state().is_playing());
//!
//! player.next().unwrap();
//! assert_eq!(player.state().current_index(), Some(1));
//!
//! player.set_playback_rate(1.5).unwrap();
//! assert!(player.set_playback_rate(3.0).is_err());
//! ```
//!
//! # Example: Platform Integration
//!
//! ```rust,no_run
//! use cassette_playback::{AudioEngine, PlayerConfig, PlayerController, Result, SourceHandle};
//!
//! // Implement AudioEngine for your platform
//! struct MyEngine {
//!     // ... platform-specific player
//! }
//!
//! impl AudioEngine for MyEngine {
//!     fn load(&mut self, source: &SourceHandle) -> Result<()> { Ok(()) }
//!     fn unload(&mut self) {}
//!     fn play(&mut self) {}
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, position: f64) -> f64 { position }
//!     fn position(&self) -> f64 { 0.0 }
//!     fn duration(&self) -> Option<f64> { Some(180.0) }
//!     fn set_rate(&mut self, rate: f64) {}
//!     fn set_volume(&mut self, volume: f64) {}
//!     fn is_ended(&self) -> bool { false }
//! }
//!
//! let mut player = PlayerController::with_engine(
//!     PlayerConfig::default(),
//!     Box::new(MyEngine { /* ... */ }),
//! );
//!
//! // Call from the platform timer every `player.poll_interval()`
//! // while `player.should_poll()` holds
//! player.tick();
//! for event in player.drain_events() {
//!     println!("{:?}", event);
//! }
//! ```

mod controller;
mod engine;
mod error;
pub mod events;
mod playlist;
mod resources;
pub mod state;
pub mod types;
pub mod view;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use controller::{LoadTicket, PlayerController};
pub use engine::{AudioEngine, NullEngine};
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use resources::{SourceRegistry, SourceReleaser};
pub use types::{
    AudioFormat, NewTrack, PlayMode, PlaybackRate, PlayerConfig, PlayerStatus, SourceHandle,
    Track, TrackId,
};
pub use view::{format_time, progress_ratio, PlayerSnapshot};
pub use volume::parse_level;
