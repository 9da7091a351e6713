//! Core types for playback control

use crate::error::PlaybackError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Stable identifier for a track within one controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque reference to playable media
///
/// On the web this is an object URL, on desktop a file path. The controller
/// never looks inside; it only hands it to the engine and releases it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceHandle(String);

impl SourceHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn uri(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Track derived from a picked file, before the controller assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrack {
    /// Media reference for the engine
    pub source: SourceHandle,

    /// Name shown in the playlist (usually the file name)
    pub display_name: String,
}

impl NewTrack {
    pub fn new(source: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            source: SourceHandle::new(source),
            display_name: display_name.into(),
        }
    }
}

/// Track in the playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub source: SourceHandle,
    pub display_name: String,
}

/// Selectable playback rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackRate {
    #[serde(rename = "0.5")]
    Half,
    #[default]
    #[serde(rename = "1")]
    Normal,
    #[serde(rename = "1.25")]
    OneAndQuarter,
    #[serde(rename = "1.5")]
    OneAndHalf,
    #[serde(rename = "2")]
    Double,
}

impl PlaybackRate {
    /// Options in selector order
    pub const ALL: [PlaybackRate; 5] = [
        PlaybackRate::Half,
        PlaybackRate::Normal,
        PlaybackRate::OneAndQuarter,
        PlaybackRate::OneAndHalf,
        PlaybackRate::Double,
    ];

    /// Multiplier sent to the engine
    pub fn multiplier(self) -> f64 {
        match self {
            PlaybackRate::Half => 0.5,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndQuarter => 1.25,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::Double => 2.0,
        }
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = PlaybackError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|rate| rate.multiplier() == value)
            .ok_or(PlaybackError::UnsupportedRate(value))
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}

/// How the picker and end-of-track behave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    /// Picked files are appended; end of track advances to the next one
    #[default]
    Playlist,

    /// Picking a file replaces the only track; end of track stops
    Single,
}

/// Player status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    /// No source loaded
    Idle,

    /// Source loaded, not playing
    Paused,

    /// Currently playing
    Playing,

    /// Reached end of track and stopped there
    Ended,
}

/// Formats declared to the engine
///
/// Advisory only: the engine does its own format negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Aac,
    Flac,
    Ogg,
    Wav,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Wav => "wav",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Aac => "audio/aac",
            AudioFormat::Flac => "audio/flac",
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Wav => "audio/wav",
        }
    }

    /// Look up a format by file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "aac" => Some(AudioFormat::Aac),
            "flac" => Some(AudioFormat::Flac),
            "ogg" => Some(AudioFormat::Ogg),
            "wav" => Some(AudioFormat::Wav),
            _ => None,
        }
    }
}

/// Configuration for the player controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Picker/end-of-track behavior (default: Playlist)
    pub mode: PlayMode,

    /// Initial volume in [0, 1] (default: 1.0)
    pub initial_volume: f64,

    /// Initial playback rate (default: 1x)
    pub initial_rate: PlaybackRate,

    /// Reconciliation tick interval (default: 1s)
    #[serde(with = "duration_millis")]
    pub poll_interval: Duration,

    /// Keep reconciling while paused (default: false)
    pub reconcile_while_paused: bool,

    /// Step used by the skip buttons (default: 10s)
    #[serde(with = "duration_millis")]
    pub skip_step: Duration,

    /// Formats declared to the engine (default: mp3, aac)
    pub formats: Vec<AudioFormat>,
}

impl PlayerConfig {
    /// Whether a file name carries one of the declared extensions
    pub fn accepts(&self, file_name: &str) -> bool {
        file_name
            .rsplit_once('.')
            .and_then(|(_, ext)| AudioFormat::from_extension(ext))
            .is_some_and(|format| self.formats.contains(&format))
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            mode: PlayMode::Playlist,
            initial_volume: 1.0,
            initial_rate: PlaybackRate::Normal,
            poll_interval: Duration::from_secs(1),
            reconcile_while_paused: false,
            skip_step: Duration::from_secs(10),
            formats: vec![AudioFormat::Mp3, AudioFormat::Aac],
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
