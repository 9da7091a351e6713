//! Error types for playback control

use thiserror::Error;

/// Playback errors
///
/// A transition that returns one of these has not touched controller state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// Playlist has no tracks
    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Rate outside the selectable set
    #[error("Unsupported playback rate: {0}")]
    UnsupportedRate(f64),

    /// Volume input that is not a usable number
    #[error("Invalid volume: {0}")]
    InvalidVolume(String),

    /// Seek target that is not a finite number
    #[error("Invalid seek position: {0}")]
    InvalidSeekPosition(f64),

    /// Engine could not load a source
    #[error("Failed to load '{track}': {reason}")]
    LoadFailed { track: String, reason: String },

    /// Audio engine error
    #[error("Audio engine error: {0}")]
    Engine(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
