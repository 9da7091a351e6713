//! Virtual-clock audio engine
//!
//! Produces no sound. Durations come from the file's own properties and the
//! position advances with the runtime clock scaled by the playback rate,
//! which is enough to drive the controller from a terminal.

use cassette_playback::{AudioEngine, PlaybackError, Result, SourceHandle};
use lofty::AudioFile;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Reads a track length from a file
pub type DurationProbe = Box<dyn Fn(&Path) -> std::result::Result<Duration, String>>;

/// Probe track length with lofty
pub fn lofty_duration(path: &Path) -> std::result::Result<Duration, String> {
    let tagged = lofty::read_from_path(path).map_err(|e| e.to_string())?;
    Ok(tagged.properties().duration())
}

struct Loaded {
    duration: f64,
    /// Position at `started`, or the resting position while paused
    offset: f64,
    started: Option<Instant>,
}

impl Loaded {
    fn position(&self, rate: f64) -> f64 {
        let running = self
            .started
            .map(|started| started.elapsed().as_secs_f64() * rate)
            .unwrap_or(0.0);
        (self.offset + running).min(self.duration)
    }
}

/// Engine that plays silence on a clock
pub struct ClockEngine {
    probe: DurationProbe,
    track: Option<Loaded>,
    rate: f64,
    volume: f64,
}

impl ClockEngine {
    /// Engine probing durations with lofty
    pub fn new() -> Self {
        Self::with_probe(Box::new(lofty_duration))
    }

    /// Engine with a custom duration probe
    pub fn with_probe(probe: DurationProbe) -> Self {
        Self {
            probe,
            track: None,
            rate: 1.0,
            volume: 1.0,
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_running(&self) -> bool {
        self.track.as_ref().is_some_and(|t| t.started.is_some())
    }

    /// Fold elapsed time into the offset so the clock can be restarted
    fn settle(&mut self) {
        let rate = self.rate;
        if let Some(track) = self.track.as_mut() {
            if track.started.is_some() {
                track.offset = track.position(rate);
                track.started = Some(Instant::now());
            }
        }
    }
}

impl Default for ClockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine for ClockEngine {
    fn load(&mut self, source: &SourceHandle) -> Result<()> {
        self.track = None;

        let duration = (self.probe)(Path::new(source.uri())).map_err(|reason| {
            PlaybackError::LoadFailed {
                track: source.uri().to_string(),
                reason,
            }
        })?;

        debug!("Loaded {} ({:.1}s)", source, duration.as_secs_f64());
        self.track = Some(Loaded {
            duration: duration.as_secs_f64(),
            offset: 0.0,
            started: None,
        });
        Ok(())
    }

    fn unload(&mut self) {
        self.track = None;
    }

    fn play(&mut self) {
        if let Some(track) = self.track.as_mut() {
            if track.started.is_none() {
                track.started = Some(Instant::now());
            }
        }
    }

    fn pause(&mut self) {
        let rate = self.rate;
        if let Some(track) = self.track.as_mut() {
            track.offset = track.position(rate);
            track.started = None;
        }
    }

    fn seek(&mut self, position: f64) -> f64 {
        let Some(track) = self.track.as_mut() else {
            return 0.0;
        };
        track.offset = position.clamp(0.0, track.duration);
        if track.started.is_some() {
            track.started = Some(Instant::now());
        }
        trace!("Clock seek to {:.2}s", track.offset);
        track.offset
    }

    fn position(&self) -> f64 {
        self.track
            .as_ref()
            .map(|track| track.position(self.rate))
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.track.as_ref().map(|track| track.duration)
    }

    fn set_rate(&mut self, rate: f64) {
        self.settle();
        self.rate = rate;
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn is_ended(&self) -> bool {
        self.track
            .as_ref()
            .is_some_and(|track| track.position(self.rate) >= track.duration)
    }
}
