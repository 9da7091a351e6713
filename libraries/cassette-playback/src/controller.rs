//! Player controller - single authority over playback
//!
//! Turns user intents into state transitions, then drives the audio engine
//! with the commands each committed transition produced. The engine's own
//! view of the world only flows back in through [`PlayerController::tick`].

use crate::{
    engine::{AudioEngine, NullEngine},
    error::{PlaybackError, Result},
    events::PlayerEvent,
    resources::{SourceRegistry, SourceReleaser},
    state::{Action, EngineCommand, PlaylistState},
    types::{NewTrack, PlayerConfig, PlayerStatus, Track, TrackId},
    view::PlayerSnapshot,
    volume,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Identifies one `load` issued to the engine
///
/// Loads are last-write-wins: a failure reported for anything but the most
/// recent ticket belongs to a superseded load and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(pub u64);

/// Central playback control
///
/// Owns:
/// - Playlist state (tracks, cursor, transport, volume, rate)
/// - The audio engine (no one else issues transport commands to it)
/// - Source handles for every track it accepted
/// - Pending events for the host
pub struct PlayerController {
    config: PlayerConfig,
    state: PlaylistState,
    engine: Box<dyn AudioEngine>,
    sources: SourceRegistry,

    next_track_id: u64,
    load_ticket: LoadTicket,

    // Event queue for UI synchronization
    pending_events: Vec<PlayerEvent>,
}

impl PlayerController {
    /// Create a controller with no engine attached
    pub fn new(config: PlayerConfig) -> Self {
        Self::with_engine(config, Box::new(NullEngine::default()))
    }

    /// Create a controller driving `engine`
    pub fn with_engine(config: PlayerConfig, engine: Box<dyn AudioEngine>) -> Self {
        let mut controller = Self {
            state: PlaylistState::new(&config),
            config,
            engine,
            sources: SourceRegistry::new(),
            next_track_id: 0,
            load_ticket: LoadTicket(0),
            pending_events: Vec::new(),
        };
        controller.sync_engine_settings();
        controller
    }

    /// Replace the audio engine
    ///
    /// The new engine receives the current rate and effective volume, and
    /// the current track if one is loaded.
    pub fn set_engine(&mut self, engine: Box<dyn AudioEngine>) {
        self.engine.unload();
        self.engine = engine;
        self.sync_engine_settings();

        if let Some(source) = self
            .state
            .current_track()
            .filter(|_| self.state.status() != PlayerStatus::Idle)
            .map(|track| track.source.clone())
        {
            let mut commands = vec![
                EngineCommand::Load(source),
                EngineCommand::SetRate(self.state.rate().multiplier()),
                EngineCommand::SetVolume(self.state.effective_volume()),
            ];
            if self.state.is_playing() {
                commands.push(EngineCommand::Play);
            }
            self.run_commands(commands);
        }
    }

    /// Set where released source handles go (e.g. object URL revocation)
    pub fn set_source_releaser(&mut self, releaser: Box<dyn SourceReleaser>) {
        self.sources.set_releaser(releaser);
    }

    // ===== Playlist =====

    /// Add picked files to the playlist
    ///
    /// Tracks are appended in order and playback intent becomes "playing".
    /// An empty pick changes nothing.
    pub fn add_tracks(&mut self, files: impl IntoIterator<Item = NewTrack>) -> Result<()> {
        let tracks: Vec<Track> = files
            .into_iter()
            .map(|file| {
                self.next_track_id += 1;
                Track {
                    id: TrackId(self.next_track_id),
                    source: file.source,
                    display_name: file.display_name,
                }
            })
            .collect();

        if tracks.is_empty() {
            return Ok(());
        }

        for track in &tracks {
            self.sources.acquire(&track.source);
        }
        info!("Adding {} track(s) to playlist", tracks.len());
        self.dispatch(Action::AddTracks(tracks))
    }

    /// Play the track at `index` from the start
    pub fn select_track(&mut self, index: usize) -> Result<()> {
        self.dispatch(Action::SelectTrack(index))
    }

    /// Remove the track at `index`, releasing its source
    pub fn remove_track(&mut self, index: usize) -> Result<()> {
        self.dispatch(Action::RemoveTrack(index))
    }

    // ===== Transport =====

    /// Flip between playing and paused
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        self.dispatch(Action::TogglePlayPause)
    }

    /// Start or resume playback
    pub fn play(&mut self) -> Result<()> {
        self.dispatch(Action::Play)
    }

    /// Pause playback
    pub fn pause(&mut self) -> Result<()> {
        self.dispatch(Action::Pause)
    }

    /// Skip to next track, wrapping to the first
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<()> {
        self.dispatch(Action::Next)
    }

    /// Go to previous track, wrapping to the last
    pub fn previous(&mut self) -> Result<()> {
        self.dispatch(Action::Previous)
    }

    // ===== Seek =====

    /// Seek to an absolute position in seconds
    ///
    /// The local position is provisional until the next reconciliation tick.
    pub fn seek(&mut self, position: f64) -> Result<()> {
        self.dispatch(Action::Seek(position))
    }

    /// Move by `delta` seconds, clamped to `[0, duration]`
    pub fn skip_by(&mut self, delta: f64) -> Result<()> {
        self.dispatch(Action::SkipBy(delta))
    }

    /// Move forward by the configured skip step
    pub fn skip_forward(&mut self) -> Result<()> {
        self.skip_by(self.config.skip_step.as_secs_f64())
    }

    /// Move back by the configured skip step
    pub fn skip_backward(&mut self) -> Result<()> {
        self.skip_by(-self.config.skip_step.as_secs_f64())
    }

    // ===== Rate & Volume =====

    /// Set the playback rate (one of 0.5, 1, 1.25, 1.5, 2)
    pub fn set_playback_rate(&mut self, rate: f64) -> Result<()> {
        self.dispatch(Action::SetPlaybackRate(rate))
    }

    /// Set volume (0.0-1.0)
    pub fn set_volume(&mut self, level: f64) -> Result<()> {
        self.dispatch(Action::SetVolume(level))
    }

    /// Set volume from slider text
    pub fn set_volume_text(&mut self, input: &str) -> Result<()> {
        let level = volume::parse_level(input)?;
        self.set_volume(level)
    }

    /// Toggle mute
    pub fn toggle_mute(&mut self) -> Result<()> {
        self.dispatch(Action::ToggleMute)
    }

    // ===== Engine feedback =====

    /// Engine reported the end of the current track
    pub fn on_track_ended(&mut self) {
        if let Err(e) = self.dispatch(Action::TrackEnded) {
            warn!("Ignoring end of track: {}", e);
        }
    }

    /// Engine reported that the load for `ticket` failed
    ///
    /// Returns false when the ticket was superseded and the report ignored.
    pub fn load_failed(&mut self, ticket: LoadTicket, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        if ticket != self.load_ticket {
            debug!(
                "Ignoring failure of superseded load {:?} (current {:?}): {}",
                ticket, self.load_ticket, reason
            );
            return false;
        }

        warn!("Load {:?} failed: {}", ticket, reason);
        match self.dispatch(Action::LoadFailed { reason }) {
            Ok(()) => true,
            Err(e) => {
                warn!("Ignoring load failure: {}", e);
                false
            }
        }
    }

    /// Overwrite local position/duration with the engine's values
    pub fn reconcile(&mut self) {
        let position = self.engine.position();
        let duration = self.engine.duration();
        if let Err(e) = self.dispatch(Action::Reconcile { position, duration }) {
            warn!("Reconcile failed: {}", e);
        }
    }

    /// Reconciliation tick
    ///
    /// Picks up end-of-track from engines that only expose it as state,
    /// then reconciles position while polling is wanted. A seek issued just
    /// before a tick can be overwritten here if the engine has not applied
    /// it yet; the next tick corrects it.
    pub fn tick(&mut self) {
        if self.state.is_playing() && self.engine.is_ended() {
            self.on_track_ended();
        }
        if self.should_poll() {
            self.reconcile();
        }
    }

    /// Whether the host should be running the reconciliation timer
    ///
    /// Hosts rebuild their timer whenever this flips.
    pub fn should_poll(&self) -> bool {
        match self.state.status() {
            PlayerStatus::Playing => true,
            PlayerStatus::Paused | PlayerStatus::Ended => self.config.reconcile_while_paused,
            PlayerStatus::Idle => false,
        }
    }

    /// Interval between reconciliation ticks
    pub fn poll_interval(&self) -> Duration {
        self.config.poll_interval
    }

    // ===== State Queries =====

    pub fn state(&self) -> &PlaylistState {
        &self.state
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Serializable view of the current state
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot::from_state(&self.state)
    }

    /// Ticket of the most recent load
    pub fn current_load_ticket(&self) -> LoadTicket {
        self.load_ticket
    }

    /// Number of source handles the controller still owns
    pub fn live_sources(&self) -> usize {
        self.sources.len()
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns all events emitted since the last drain, in order.
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    /// Commit a transition, then carry out its side effects
    fn dispatch(&mut self, action: Action) -> Result<()> {
        debug!("Applying {:?}", action);
        let transition = self.state.apply(action).map_err(|e| {
            debug!("Transition rejected: {}", e);
            e
        })?;

        for source in &transition.released {
            self.sources.release(source);
        }
        self.pending_events.extend(transition.events);
        self.run_commands(transition.commands);
        Ok(())
    }

    fn run_commands(&mut self, commands: Vec<EngineCommand>) {
        for command in commands {
            match command {
                EngineCommand::Load(source) => {
                    self.load_ticket = LoadTicket(self.load_ticket.0 + 1);
                    debug!("Loading {} ({:?})", source, self.load_ticket);

                    if let Err(e) = self.engine.load(&source) {
                        let reason = match e {
                            PlaybackError::LoadFailed { reason, .. } => reason,
                            other => other.to_string(),
                        };
                        // Remaining commands were meant for the failed source
                        self.load_failed(self.load_ticket, reason);
                        return;
                    }
                }
                EngineCommand::Unload => self.engine.unload(),
                EngineCommand::Play => self.engine.play(),
                EngineCommand::Pause => self.engine.pause(),
                EngineCommand::Seek(position) => {
                    let landed = self.engine.seek(position);
                    if (landed - position).abs() > f64::EPSILON {
                        debug!("Seek to {:.2}s landed at {:.2}s", position, landed);
                    }
                }
                EngineCommand::SetRate(rate) => self.engine.set_rate(rate),
                EngineCommand::SetVolume(level) => self.engine.set_volume(level),
            }
        }
    }

    fn sync_engine_settings(&mut self) {
        self.engine.set_rate(self.state.rate().multiplier());
        self.engine.set_volume(self.state.effective_volume());
    }
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

impl Drop for PlayerController {
    fn drop(&mut self) {
        self.engine.unload();
        self.sources.release_all();
    }
}
