//! Platform-agnostic audio engine trait
//!
//! Abstracts the decode/playback capability for different platforms
//! (HTML audio element in the browser, a clocked engine on the terminal).

use crate::error::Result;
use crate::types::SourceHandle;

/// Audio engine driven by the player controller
///
/// All commands are fire-and-forget: the controller never waits for the
/// engine to confirm one before issuing the next. Implementors are not
/// required to be `Send`; browser engines live on the main thread.
pub trait AudioEngine {
    /// Start loading a source, replacing whatever was loaded
    ///
    /// # Returns
    /// * `Ok(())` - Load accepted (it may still fail later, see
    ///   `PlayerController::load_failed`)
    /// * `Err(_)` - Source rejected immediately
    fn load(&mut self, source: &SourceHandle) -> Result<()>;

    /// Drop the loaded source and stop output
    fn unload(&mut self);

    /// Start or resume playback
    fn play(&mut self);

    /// Pause playback, keeping the position
    fn pause(&mut self);

    /// Seek to position in seconds
    ///
    /// Returns the position the engine actually moved to
    fn seek(&mut self, position: f64) -> f64;

    /// Current playback position in seconds
    fn position(&self) -> f64;

    /// Total track length in seconds, `None` until metadata is known
    fn duration(&self) -> Option<f64>;

    /// Set the playback rate multiplier
    fn set_rate(&mut self, rate: f64);

    /// Set the output volume (0.0-1.0)
    fn set_volume(&mut self, volume: f64);

    /// Check if the loaded track has played to its end
    fn is_ended(&self) -> bool;
}

/// Engine that accepts every command and never produces sound
///
/// Used before a platform engine is attached and in tests.
#[derive(Debug, Default)]
pub struct NullEngine {
    loaded: Option<SourceHandle>,
    position: f64,
}

impl AudioEngine for NullEngine {
    fn load(&mut self, source: &SourceHandle) -> Result<()> {
        self.loaded = Some(source.clone());
        self.position = 0.0;
        Ok(())
    }

    fn unload(&mut self) {
        self.loaded = None;
        self.position = 0.0;
    }

    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn seek(&mut self, position: f64) -> f64 {
        if self.loaded.is_some() {
            self.position = position;
        }
        self.position
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        None
    }

    fn set_rate(&mut self, _rate: f64) {}

    fn set_volume(&mut self, _volume: f64) {}

    fn is_ended(&self) -> bool {
        false
    }
}
