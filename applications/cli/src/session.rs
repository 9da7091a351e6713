//! Terminal session around a PlayerController

use crate::commands::{Command, HELP};
use crate::error::{CliError, Result};
use cassette_playback::{
    AudioEngine, NewTrack, PlayerConfig, PlayerController, PlayerEvent, SourceHandle,
};
use std::path::Path;
use tracing::{debug, info, warn};

/// What the prompt loop should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue(Option<String>),
    Quit,
}

pub struct Session {
    player: PlayerController,
}

impl Session {
    pub fn new(config: PlayerConfig, engine: Box<dyn AudioEngine>) -> Self {
        let mut player = PlayerController::with_engine(config, engine);
        // Local paths need no cleanup; log so handle lifetimes stay visible
        player.set_source_releaser(Box::new(|source: &SourceHandle| {
            debug!("Released {}", source);
        }));
        Self { player }
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    /// Add files, skipping those outside the configured formats
    ///
    /// Returns the number of files handed to the player.
    pub fn add_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<usize> {
        let mut picked = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            if !self.player.config().accepts(&name) {
                warn!("Skipping {}: not a supported audio file", path.display());
                continue;
            }
            picked.push(NewTrack::new(path.display().to_string(), name));
        }

        let count = picked.len();
        self.player.add_tracks(picked)?;
        Ok(count)
    }

    /// Run one command
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        let player = &mut self.player;
        match command {
            Command::Play => player.play()?,
            Command::Pause => player.pause()?,
            Command::Toggle => player.toggle_play_pause()?,
            Command::Next => player.next()?,
            Command::Previous => player.previous()?,
            Command::Seek(position) => player.seek(position)?,
            Command::Forward => player.skip_forward()?,
            Command::Rewind => player.skip_backward()?,
            Command::Rate(rate) => player.set_playback_rate(rate)?,
            Command::Volume(text) => player.set_volume_text(&text)?,
            Command::Mute => player.toggle_mute()?,
            Command::Select(index) => player.select_track(index)?,
            Command::Remove(index) => player.remove_track(index)?,
            Command::Add(path) => {
                if self.add_paths(&[&path])? == 0 {
                    return Err(CliError::Unsupported(path.display().to_string()));
                }
            }
            Command::List => return Ok(Outcome::Continue(Some(self.playlist_text()))),
            Command::Status => return Ok(Outcome::Continue(Some(self.status_text()))),
            Command::Help => return Ok(Outcome::Continue(Some(HELP.to_string()))),
            Command::Quit => return Ok(Outcome::Quit),
        }
        Ok(Outcome::Continue(None))
    }

    /// Reconciliation tick
    pub fn tick(&mut self) {
        self.player.tick();
    }

    /// Log pending events; returns lines worth printing
    pub fn drain_events(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        for event in self.player.drain_events() {
            match &event {
                PlayerEvent::TrackChanged {
                    index,
                    display_name,
                    ..
                } => {
                    info!("Now playing #{} {}", index + 1, display_name);
                    lines.push(format!("♪ {}. {}", index + 1, display_name));
                }
                PlayerEvent::LoadFailed { track_id, reason } => {
                    warn!("Track {} failed to load: {}", track_id, reason);
                    lines.push(format!("✗ could not play track: {}", reason));
                }
                PlayerEvent::StateChanged { status } => info!("Player {:?}", status),
                PlayerEvent::PositionUpdate { .. } => {}
                other => debug!("{:?}", other),
            }
        }
        lines
    }

    pub fn playlist_text(&self) -> String {
        let snapshot = self.player.snapshot();
        if snapshot.tracks.is_empty() {
            return "(playlist empty)".to_string();
        }
        snapshot
            .tracks
            .iter()
            .map(|row| {
                let marker = if row.is_current { '>' } else { ' ' };
                format!("{} {:>3}. {}", marker, row.index + 1, row.display_name)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn status_text(&self) -> String {
        let snapshot = self.player.snapshot();
        let mut text = snapshot.status_line();
        text.push_str(&format!("  vol {}%", (snapshot.volume * 100.0).round()));
        if let Some(error) = &snapshot.last_error {
            text.push_str(&format!("  [{}]", error));
        }
        text
    }
}
