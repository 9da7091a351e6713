//! Player events
//!
//! Events are queued by the controller after each committed transition and
//! drained by the host to refresh whatever it renders.

use crate::types::{PlaybackRate, PlayerStatus, TrackId};
use serde::{Deserialize, Serialize};

/// Events emitted by the player controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerEvent {
    /// Player status changed (idle, paused, playing, ended)
    StateChanged {
        /// The new status
        status: PlayerStatus,
    },

    /// A different track became current
    TrackChanged {
        /// Position in the playlist
        index: usize,
        /// ID of the new track
        track_id: TrackId,
        /// Name shown in the playlist
        display_name: String,
    },

    /// Tracks were added or removed
    PlaylistChanged {
        /// New playlist length
        length: usize,
    },

    /// Position/duration after a reconciliation tick or a seek
    PositionUpdate {
        /// Current position in seconds
        position: f64,
        /// Track length in seconds (0 while unknown)
        duration: f64,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Slider level (0.0-1.0)
        level: f64,
        /// Whether audio is muted
        is_muted: bool,
        /// Level the engine received
        effective: f64,
    },

    /// Playback rate changed
    RateChanged {
        /// New rate
        rate: PlaybackRate,
    },

    /// Track played through to the end
    TrackEnded {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// Engine could not load the current track
    LoadFailed {
        /// ID of the track that failed
        track_id: TrackId,
        /// Reason reported by the engine
        reason: String,
    },
}
