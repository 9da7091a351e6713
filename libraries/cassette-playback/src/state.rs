//! Playlist state and its transitions
//!
//! `PlaylistState::apply` is the only way state changes. It never talks to
//! the engine: it returns a [`Transition`] listing the engine commands and
//! events that follow from the change, and the controller carries them out
//! after the new state is committed.
//!
//! An `Err` from `apply` means nothing was mutated.

use crate::error::{PlaybackError, Result};
use crate::events::PlayerEvent;
use crate::playlist::Playlist;
use crate::types::{PlayMode, PlaybackRate, PlayerConfig, PlayerStatus, SourceHandle, Track};
use crate::volume::Volume;

/// Intent applied to the playlist state
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Append picked tracks (single mode: replace with the first one)
    AddTracks(Vec<Track>),

    /// Jump to a track and play it from the start
    SelectTrack(usize),

    /// Flip between playing and paused
    TogglePlayPause,

    /// Play if not already playing
    Play,

    /// Pause if playing
    Pause,

    /// Advance to the next track, wrapping to the first
    Next,

    /// Go back to the previous track, wrapping to the last
    Previous,

    /// Move to an absolute position in seconds
    Seek(f64),

    /// Move relative to the current position, clamped to the track
    SkipBy(f64),

    /// Change the rate multiplier (must be a selector value)
    SetPlaybackRate(f64),

    /// Change the volume level (0.0-1.0)
    SetVolume(f64),

    /// Flip mute
    ToggleMute,

    /// Engine reported the end of the current track
    TrackEnded,

    /// Engine-reported position and duration
    Reconcile { position: f64, duration: Option<f64> },

    /// Engine could not load the current track
    LoadFailed { reason: String },

    /// Remove a track from the playlist
    RemoveTrack(usize),
}

/// Command for the audio engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    Load(SourceHandle),
    Unload,
    Play,
    Pause,
    Seek(f64),
    SetRate(f64),
    SetVolume(f64),
}

/// Side effects of one committed transition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    /// Engine commands, in issue order
    pub commands: Vec<EngineCommand>,

    /// Events for the host
    pub events: Vec<PlayerEvent>,

    /// Sources no longer referenced by the playlist
    pub released: Vec<SourceHandle>,
}

impl Transition {
    fn none() -> Self {
        Self::default()
    }
}

/// Playback state owned by the controller
#[derive(Debug, Clone)]
pub struct PlaylistState {
    mode: PlayMode,
    playlist: Playlist,
    status: PlayerStatus,
    current_time: f64,
    duration: f64,
    rate: PlaybackRate,
    volume: Volume,
    last_error: Option<String>,
}

impl PlaylistState {
    /// Create empty state
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            mode: config.mode,
            playlist: Playlist::new(),
            status: PlayerStatus::Idle,
            current_time: 0.0,
            duration: 0.0,
            rate: config.initial_rate,
            volume: Volume::new(config.initial_volume),
            last_error: None,
        }
    }

    /// Apply an action
    pub fn apply(&mut self, action: Action) -> Result<Transition> {
        match action {
            Action::AddTracks(tracks) => Ok(self.add_tracks(tracks)),
            Action::SelectTrack(index) => self.select_track(index),
            Action::TogglePlayPause => self.toggle_play_pause(),
            Action::Play => {
                if self.status == PlayerStatus::Playing {
                    Ok(Transition::none())
                } else {
                    self.toggle_play_pause()
                }
            }
            Action::Pause => {
                if self.status == PlayerStatus::Playing {
                    self.toggle_play_pause()
                } else {
                    Ok(Transition::none())
                }
            }
            Action::Next => {
                let index = self
                    .playlist
                    .next_index()
                    .ok_or(PlaybackError::EmptyPlaylist)?;
                self.select_track(index)
            }
            Action::Previous => {
                let index = self
                    .playlist
                    .previous_index()
                    .ok_or(PlaybackError::EmptyPlaylist)?;
                self.select_track(index)
            }
            Action::Seek(target) => self.seek(target),
            Action::SkipBy(delta) => self.skip_by(delta),
            Action::SetPlaybackRate(rate) => self.set_rate(rate),
            Action::SetVolume(level) => self.set_volume(level),
            Action::ToggleMute => Ok(self.toggle_mute()),
            Action::TrackEnded => self.track_ended(),
            Action::Reconcile { position, duration } => Ok(self.reconcile(position, duration)),
            Action::LoadFailed { reason } => self.load_failed(reason),
            Action::RemoveTrack(index) => self.remove_track(index),
        }
    }

    // ===== Transitions =====

    fn add_tracks(&mut self, tracks: Vec<Track>) -> Transition {
        let mut t = Transition::none();
        if tracks.is_empty() {
            return t;
        }

        match self.mode {
            PlayMode::Playlist => {
                let was_empty = self.playlist.is_empty();
                self.playlist.extend(tracks);
                t.events.push(PlayerEvent::PlaylistChanged {
                    length: self.playlist.len(),
                });

                match self.status {
                    _ if was_empty => self.load_current(true, &mut t),
                    // The current track never loaded: try it again
                    PlayerStatus::Idle => self.load_current(true, &mut t),
                    PlayerStatus::Ended => {
                        self.current_time = 0.0;
                        t.commands.push(EngineCommand::Seek(0.0));
                        t.commands.push(EngineCommand::Play);
                        self.set_status(PlayerStatus::Playing, &mut t);
                    }
                    PlayerStatus::Paused => {
                        t.commands.push(EngineCommand::Play);
                        self.set_status(PlayerStatus::Playing, &mut t);
                    }
                    PlayerStatus::Playing => {}
                }
            }
            PlayMode::Single => {
                let mut picked = tracks.into_iter();
                let Some(first) = picked.next() else {
                    return t;
                };
                t.released.extend(picked.map(|track| track.source));
                t.released
                    .extend(self.playlist.replace(first).into_iter().map(|track| track.source));
                t.events.push(PlayerEvent::PlaylistChanged { length: 1 });
                self.load_current(true, &mut t);
            }
        }

        t
    }

    fn select_track(&mut self, index: usize) -> Result<Transition> {
        self.playlist.select(index)?;

        let mut t = Transition::none();
        self.load_current(true, &mut t);
        Ok(t)
    }

    fn toggle_play_pause(&mut self) -> Result<Transition> {
        if self.playlist.is_empty() {
            return Err(PlaybackError::EmptyPlaylist);
        }

        let mut t = Transition::none();
        match self.status {
            PlayerStatus::Playing => {
                t.commands.push(EngineCommand::Pause);
                self.set_status(PlayerStatus::Paused, &mut t);
            }
            PlayerStatus::Paused => {
                t.commands.push(EngineCommand::Play);
                self.set_status(PlayerStatus::Playing, &mut t);
            }
            PlayerStatus::Ended => {
                // Replay from the top
                self.current_time = 0.0;
                t.commands.push(EngineCommand::Seek(0.0));
                t.commands.push(EngineCommand::Play);
                self.set_status(PlayerStatus::Playing, &mut t);
            }
            PlayerStatus::Idle => self.load_current(true, &mut t),
        }
        Ok(t)
    }

    fn seek(&mut self, target: f64) -> Result<Transition> {
        if !target.is_finite() {
            return Err(PlaybackError::InvalidSeekPosition(target));
        }
        self.require_loaded()?;

        // Direct seeks are taken as given; only negatives are floored
        Ok(self.move_to(target.max(0.0)))
    }

    fn skip_by(&mut self, delta: f64) -> Result<Transition> {
        if !delta.is_finite() {
            return Err(PlaybackError::InvalidSeekPosition(delta));
        }
        self.require_loaded()?;

        let target = (self.current_time + delta).clamp(0.0, self.duration.max(0.0));
        Ok(self.move_to(target))
    }

    fn set_rate(&mut self, rate: f64) -> Result<Transition> {
        let rate = PlaybackRate::try_from(rate)?;
        self.rate = rate;

        let mut t = Transition::none();
        t.commands.push(EngineCommand::SetRate(rate.multiplier()));
        t.events.push(PlayerEvent::RateChanged { rate });
        Ok(t)
    }

    fn set_volume(&mut self, level: f64) -> Result<Transition> {
        self.volume.set_level(level)?;

        let mut t = Transition::none();
        if !self.volume.is_muted() {
            t.commands
                .push(EngineCommand::SetVolume(self.volume.effective()));
        }
        t.events.push(self.volume_event());
        Ok(t)
    }

    fn toggle_mute(&mut self) -> Transition {
        self.volume.toggle_mute();

        let mut t = Transition::none();
        t.commands
            .push(EngineCommand::SetVolume(self.volume.effective()));
        t.events.push(self.volume_event());
        t
    }

    fn track_ended(&mut self) -> Result<Transition> {
        // Late notifications for a track we already left are dropped
        if self.status != PlayerStatus::Playing {
            return Ok(Transition::none());
        }
        let Some(track) = self.playlist.current() else {
            return Ok(Transition::none());
        };

        let track_id = track.id;
        let mut t = Transition::none();
        t.events.push(PlayerEvent::TrackEnded { track_id });

        match self.mode {
            PlayMode::Playlist => {
                let next = self
                    .playlist
                    .next_index()
                    .ok_or(PlaybackError::EmptyPlaylist)?;
                self.playlist.select(next)?;
                self.load_current(true, &mut t);
            }
            PlayMode::Single => {
                self.current_time = self.duration;
                self.set_status(PlayerStatus::Ended, &mut t);
            }
        }
        Ok(t)
    }

    fn reconcile(&mut self, position: f64, duration: Option<f64>) -> Transition {
        let mut t = Transition::none();
        if self.playlist.is_empty() || self.status == PlayerStatus::Idle {
            return t;
        }

        if position.is_finite() {
            self.current_time = position.max(0.0);
        }
        // Unknown duration keeps the last known value (0 after a track change)
        if let Some(duration) = duration.filter(|d| d.is_finite() && *d >= 0.0) {
            self.duration = duration;
        }

        t.events.push(self.position_event());
        t
    }

    fn load_failed(&mut self, reason: String) -> Result<Transition> {
        let track_id = self
            .playlist
            .current()
            .map(|track| track.id)
            .ok_or(PlaybackError::NoTrackLoaded)?;

        let mut t = Transition::none();
        self.current_time = 0.0;
        self.duration = 0.0;
        self.last_error = Some(reason.clone());
        t.commands.push(EngineCommand::Unload);
        t.events.push(PlayerEvent::LoadFailed { track_id, reason });
        self.set_status(PlayerStatus::Idle, &mut t);
        Ok(t)
    }

    fn remove_track(&mut self, index: usize) -> Result<Transition> {
        let was_current = self.playlist.current_index() == Some(index);
        let removed = self.playlist.remove(index)?;

        let mut t = Transition::none();
        t.released.push(removed.source);
        t.events.push(PlayerEvent::PlaylistChanged {
            length: self.playlist.len(),
        });

        if self.playlist.is_empty() {
            self.current_time = 0.0;
            self.duration = 0.0;
            t.commands.push(EngineCommand::Unload);
            self.set_status(PlayerStatus::Idle, &mut t);
        } else if was_current {
            let play = self.status == PlayerStatus::Playing;
            self.load_current(play, &mut t);
        }
        Ok(t)
    }

    // ===== Helpers =====

    /// Hand the current track to the engine with the effective settings
    fn load_current(&mut self, play: bool, t: &mut Transition) {
        let Some(track) = self.playlist.current() else {
            return;
        };
        let source = track.source.clone();
        let event = PlayerEvent::TrackChanged {
            index: self.playlist.current_index().unwrap_or_default(),
            track_id: track.id,
            display_name: track.display_name.clone(),
        };

        self.current_time = 0.0;
        self.duration = 0.0;
        self.last_error = None;

        t.commands.push(EngineCommand::Load(source));
        t.commands
            .push(EngineCommand::SetRate(self.rate.multiplier()));
        t.commands
            .push(EngineCommand::SetVolume(self.volume.effective()));
        t.commands.push(if play {
            EngineCommand::Play
        } else {
            EngineCommand::Pause
        });
        t.events.push(event);

        let status = if play {
            PlayerStatus::Playing
        } else {
            PlayerStatus::Paused
        };
        self.set_status(status, t);
    }

    fn move_to(&mut self, position: f64) -> Transition {
        let mut t = Transition::none();
        self.current_time = position;
        t.commands.push(EngineCommand::Seek(position));
        if self.status == PlayerStatus::Ended {
            self.set_status(PlayerStatus::Paused, &mut t);
        }
        t.events.push(self.position_event());
        t
    }

    fn require_loaded(&self) -> Result<()> {
        if self.playlist.is_empty() || self.status == PlayerStatus::Idle {
            Err(PlaybackError::NoTrackLoaded)
        } else {
            Ok(())
        }
    }

    fn set_status(&mut self, status: PlayerStatus, t: &mut Transition) {
        if self.status != status {
            self.status = status;
            t.events.push(PlayerEvent::StateChanged { status });
        }
    }

    fn volume_event(&self) -> PlayerEvent {
        PlayerEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
            effective: self.volume.effective(),
        }
    }

    fn position_event(&self) -> PlayerEvent {
        PlayerEvent::PositionUpdate {
            position: self.current_time,
            duration: self.duration,
        }
    }

    // ===== Queries =====

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn tracks(&self) -> &[Track] {
        self.playlist.tracks()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.playlist.current_index()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.current()
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    /// Play intent; not proof that the engine is producing sound
    pub fn is_playing(&self) -> bool {
        self.status == PlayerStatus::Playing
    }

    /// Last known or last requested position in seconds
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Last known track length in seconds (0 while unknown)
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn rate(&self) -> PlaybackRate {
        self.rate
    }

    pub fn volume(&self) -> f64 {
        self.volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    /// Volume the engine receives: 0 when muted, the level otherwise
    pub fn effective_volume(&self) -> f64 {
        self.volume.effective()
    }

    /// Reason the current track failed to load, if it did
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl Default for PlaylistState {
    fn default() -> Self {
        Self::new(&PlayerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrackId;

    fn track(id: u64) -> Track {
        Track {
            id: TrackId(id),
            source: SourceHandle::new(format!("blob:{id}")),
            display_name: format!("{id}.mp3"),
        }
    }

    fn loaded(n: u64) -> PlaylistState {
        let mut state = PlaylistState::default();
        state
            .apply(Action::AddTracks((0..n).map(track).collect()))
            .unwrap();
        state
    }

    #[test]
    fn empty_add_is_a_no_op() {
        let mut state = PlaylistState::default();
        let t = state.apply(Action::AddTracks(Vec::new())).unwrap();

        assert_eq!(t, Transition::default());
        assert_eq!(state.status(), PlayerStatus::Idle);
        assert!(!state.is_playing());
    }

    #[test]
    fn first_add_loads_and_plays() {
        let mut state = PlaylistState::default();
        let t = state
            .apply(Action::AddTracks(vec![track(0), track(1)]))
            .unwrap();

        assert_eq!(state.current_index(), Some(0));
        assert!(state.is_playing());
        assert_eq!(
            t.commands,
            vec![
                EngineCommand::Load(SourceHandle::new("blob:0")),
                EngineCommand::SetRate(1.0),
                EngineCommand::SetVolume(1.0),
                EngineCommand::Play,
            ]
        );
        assert!(t.events.contains(&PlayerEvent::PlaylistChanged { length: 2 }));
    }

    #[test]
    fn later_add_keeps_current_track() {
        let mut state = loaded(2);
        state.apply(Action::SelectTrack(1)).unwrap();
        state.apply(Action::Pause).unwrap();

        let t = state.apply(Action::AddTracks(vec![track(5)])).unwrap();

        assert_eq!(state.current_index(), Some(1));
        assert!(state.is_playing());
        assert_eq!(t.commands, vec![EngineCommand::Play]);
    }

    #[test]
    fn single_mode_replaces_and_releases() {
        let config = PlayerConfig {
            mode: PlayMode::Single,
            ..Default::default()
        };
        let mut state = PlaylistState::new(&config);
        state.apply(Action::AddTracks(vec![track(0)])).unwrap();

        let t = state
            .apply(Action::AddTracks(vec![track(1), track(2)]))
            .unwrap();

        assert_eq!(state.tracks().len(), 1);
        assert_eq!(state.current_track().unwrap().id, TrackId(1));
        assert_eq!(
            t.released,
            vec![SourceHandle::new("blob:2"), SourceHandle::new("blob:0")]
        );
    }

    #[test]
    fn toggle_on_empty_playlist_is_rejected() {
        let mut state = PlaylistState::default();
        assert_eq!(
            state.apply(Action::TogglePlayPause).unwrap_err(),
            PlaybackError::EmptyPlaylist
        );
        assert!(!state.is_playing());
    }

    #[test]
    fn toggle_flips_intent() {
        let mut state = loaded(1);

        let t = state.apply(Action::TogglePlayPause).unwrap();
        assert!(!state.is_playing());
        assert_eq!(t.commands, vec![EngineCommand::Pause]);

        let t = state.apply(Action::TogglePlayPause).unwrap();
        assert!(state.is_playing());
        assert_eq!(t.commands, vec![EngineCommand::Play]);
    }

    #[test]
    fn seek_is_not_clamped_to_duration() {
        let mut state = loaded(1);
        state
            .apply(Action::Reconcile {
                position: 5.0,
                duration: Some(30.0),
            })
            .unwrap();

        let t = state.apply(Action::Seek(45.0)).unwrap();
        assert_eq!(state.current_time(), 45.0);
        assert_eq!(t.commands, vec![EngineCommand::Seek(45.0)]);

        state.apply(Action::Seek(-3.0)).unwrap();
        assert_eq!(state.current_time(), 0.0);

        assert!(state.apply(Action::Seek(f64::NAN)).is_err());
        assert_eq!(state.current_time(), 0.0);
    }

    #[test]
    fn seek_without_track_changes_nothing() {
        let mut state = PlaylistState::default();
        assert_eq!(
            state.apply(Action::Seek(10.0)).unwrap_err(),
            PlaybackError::NoTrackLoaded
        );
        assert_eq!(
            state.apply(Action::SkipBy(10.0)).unwrap_err(),
            PlaybackError::NoTrackLoaded
        );
        assert_eq!(state.current_time(), 0.0);
    }

    #[test]
    fn skip_with_unknown_duration_stays_at_zero() {
        let mut state = loaded(1);
        state.apply(Action::SkipBy(10.0)).unwrap();
        assert_eq!(state.current_time(), 0.0);
    }

    #[test]
    fn rate_outside_selector_is_rejected() {
        let mut state = loaded(1);
        state.apply(Action::SetPlaybackRate(1.5)).unwrap();

        assert_eq!(
            state.apply(Action::SetPlaybackRate(3.0)).unwrap_err(),
            PlaybackError::UnsupportedRate(3.0)
        );
        assert_eq!(state.rate(), PlaybackRate::OneAndHalf);
        assert!(state.is_playing());
    }

    #[test]
    fn volume_while_muted_does_not_reach_engine() {
        let mut state = loaded(1);
        state.apply(Action::ToggleMute).unwrap();

        let t = state.apply(Action::SetVolume(0.3)).unwrap();
        assert!(t.commands.is_empty());
        assert_eq!(state.volume(), 0.3);
        assert_eq!(state.effective_volume(), 0.0);

        let t = state.apply(Action::ToggleMute).unwrap();
        assert_eq!(t.commands, vec![EngineCommand::SetVolume(0.3)]);
    }

    #[test]
    fn track_end_advances_in_playlist_mode() {
        let mut state = loaded(2);
        let t = state.apply(Action::TrackEnded).unwrap();

        assert_eq!(state.current_index(), Some(1));
        assert!(state.is_playing());
        assert_eq!(
            t.events.first(),
            Some(&PlayerEvent::TrackEnded {
                track_id: TrackId(0)
            })
        );
    }

    #[test]
    fn track_end_stops_in_single_mode() {
        let config = PlayerConfig {
            mode: PlayMode::Single,
            ..Default::default()
        };
        let mut state = PlaylistState::new(&config);
        state.apply(Action::AddTracks(vec![track(0)])).unwrap();
        state
            .apply(Action::Reconcile {
                position: 179.4,
                duration: Some(180.0),
            })
            .unwrap();

        state.apply(Action::TrackEnded).unwrap();
        assert_eq!(state.status(), PlayerStatus::Ended);
        assert!(!state.is_playing());
        assert_eq!(state.current_time(), 180.0);

        // Play again restarts from the top
        let t = state.apply(Action::TogglePlayPause).unwrap();
        assert!(state.is_playing());
        assert_eq!(state.current_time(), 0.0);
        assert_eq!(t.commands, vec![EngineCommand::Seek(0.0), EngineCommand::Play]);
    }

    #[test]
    fn stale_track_end_is_ignored() {
        let mut state = loaded(2);
        state.apply(Action::Pause).unwrap();

        let t = state.apply(Action::TrackEnded).unwrap();
        assert_eq!(t, Transition::default());
        assert_eq!(state.current_index(), Some(0));
    }

    #[test]
    fn reconcile_tolerates_unknown_duration() {
        let mut state = loaded(1);
        state
            .apply(Action::Reconcile {
                position: 2.5,
                duration: None,
            })
            .unwrap();
        assert_eq!(state.current_time(), 2.5);
        assert_eq!(state.duration(), 0.0);

        state
            .apply(Action::Reconcile {
                position: 3.5,
                duration: Some(f64::NAN),
            })
            .unwrap();
        assert_eq!(state.duration(), 0.0);

        state
            .apply(Action::Reconcile {
                position: 4.5,
                duration: Some(200.0),
            })
            .unwrap();
        assert_eq!(state.duration(), 200.0);
    }

    #[test]
    fn load_failure_drops_to_idle_keeping_order() {
        let mut state = loaded(3);
        state.apply(Action::SelectTrack(1)).unwrap();

        let t = state
            .apply(Action::LoadFailed {
                reason: "decode error".to_string(),
            })
            .unwrap();

        assert_eq!(state.status(), PlayerStatus::Idle);
        assert_eq!(state.current_index(), Some(1));
        assert_eq!(state.last_error(), Some("decode error"));
        assert_eq!(t.commands, vec![EngineCommand::Unload]);
        let ids: Vec<u64> = state.tracks().iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        // Moving on clears the error
        state.apply(Action::Next).unwrap();
        assert_eq!(state.last_error(), None);
        assert!(state.is_playing());
    }

    #[test]
    fn removing_current_track_loads_its_successor() {
        let mut state = loaded(3);
        state.apply(Action::SelectTrack(1)).unwrap();

        let t = state.apply(Action::RemoveTrack(1)).unwrap();

        assert_eq!(state.current_track().unwrap().id, TrackId(2));
        assert_eq!(t.released, vec![SourceHandle::new("blob:1")]);
        assert_eq!(
            t.commands.first(),
            Some(&EngineCommand::Load(SourceHandle::new("blob:2")))
        );
        assert!(state.is_playing());
    }

    #[test]
    fn removing_other_track_leaves_engine_alone() {
        let mut state = loaded(3);
        state.apply(Action::SelectTrack(2)).unwrap();

        let t = state.apply(Action::RemoveTrack(0)).unwrap();
        assert!(t.commands.is_empty());
        assert_eq!(state.current_index(), Some(1));
        assert_eq!(state.current_track().unwrap().id, TrackId(2));
    }

    #[test]
    fn removing_last_track_goes_idle() {
        let mut state = loaded(1);
        let t = state.apply(Action::RemoveTrack(0)).unwrap();

        assert_eq!(state.status(), PlayerStatus::Idle);
        assert!(state.tracks().is_empty());
        assert!(t.commands.contains(&EngineCommand::Unload));
    }
}
