//! Render-ready view of player state

use crate::state::PlaylistState;
use crate::types::{PlaybackRate, PlayerStatus, TrackId};
use serde::{Deserialize, Serialize};

/// Format seconds as `m:ss`
///
/// Anything that is not a finite, non-negative number renders as `0:00`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Fraction of the track played, in [0, 1]
///
/// Returns 0 while the duration is unknown.
pub fn progress_ratio(current_time: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 || !current_time.is_finite() {
        return 0.0;
    }
    (current_time / duration).clamp(0.0, 1.0)
}

/// One playlist row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRow {
    pub index: usize,
    pub id: TrackId,
    pub display_name: String,
    pub is_current: bool,
}

/// Everything a front end needs to draw the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub tracks: Vec<TrackRow>,
    pub current_index: Option<usize>,
    pub status: PlayerStatus,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub elapsed: String,
    pub total: String,
    pub progress: f64,
    pub rate: PlaybackRate,
    pub volume: f64,
    pub is_muted: bool,
    pub effective_volume: f64,
    pub last_error: Option<String>,
}

impl PlayerSnapshot {
    pub fn from_state(state: &PlaylistState) -> Self {
        let current_index = state.current_index();
        let tracks = state
            .tracks()
            .iter()
            .enumerate()
            .map(|(index, track)| TrackRow {
                index,
                id: track.id,
                display_name: track.display_name.clone(),
                is_current: current_index == Some(index),
            })
            .collect();

        Self {
            tracks,
            current_index,
            status: state.status(),
            is_playing: state.is_playing(),
            current_time: state.current_time(),
            duration: state.duration(),
            elapsed: format_time(state.current_time()),
            total: format_time(state.duration()),
            progress: progress_ratio(state.current_time(), state.duration()),
            rate: state.rate(),
            volume: state.volume(),
            is_muted: state.is_muted(),
            effective_volume: state.effective_volume(),
            last_error: state.last_error().map(str::to_string),
        }
    }

    /// One-line transport summary, e.g. `▶ b.mp3 1:05 / 3:20 (1.5x)`
    pub fn status_line(&self) -> String {
        let symbol = match self.status {
            PlayerStatus::Playing => "▶",
            PlayerStatus::Paused => "⏸",
            PlayerStatus::Ended => "■",
            PlayerStatus::Idle => "·",
        };
        let name = self
            .current_index
            .and_then(|index| self.tracks.get(index))
            .map_or("(no track)", |row| row.display_name.as_str());
        let mute = if self.is_muted { " [muted]" } else { "" };

        format!(
            "{} {} {} / {} ({}){}",
            symbol, name, self.elapsed, self.total, self.rate, mute
        )
    }
}
