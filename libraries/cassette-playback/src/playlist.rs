//! Ordered playlist with a cursor
//!
//! Tracks keep insertion order. The cursor wraps in both directions:
//! ```text
//!   previous from 0 ──► len-1
//!   next from len-1 ──► 0
//! ```

use crate::error::{PlaybackError, Result};
use crate::types::Track;

/// Playlist and current position
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    /// Tracks in insertion order
    tracks: Vec<Track>,

    /// Index of the current track (meaningless while empty)
    current: usize,
}

impl Playlist {
    /// Create new empty playlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Append tracks, preserving their order
    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Track>) {
        self.tracks.extend(tracks);
    }

    /// Replace every track with `track` and point at it
    ///
    /// Returns the tracks that were dropped
    pub fn replace(&mut self, track: Track) -> Vec<Track> {
        self.current = 0;
        std::mem::replace(&mut self.tracks, vec![track])
    }

    /// Move the cursor to `index`
    pub fn select(&mut self, index: usize) -> Result<&Track> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }
        self.current = index;
        Ok(&self.tracks[index])
    }

    /// Index that follows the cursor, wrapping to 0
    pub fn next_index(&self) -> Option<usize> {
        if self.tracks.is_empty() {
            None
        } else {
            Some((self.current + 1) % self.tracks.len())
        }
    }

    /// Index that precedes the cursor, wrapping to the last track
    pub fn previous_index(&self) -> Option<usize> {
        if self.tracks.is_empty() {
            None
        } else if self.current == 0 {
            Some(self.tracks.len() - 1)
        } else {
            Some(self.current - 1)
        }
    }

    /// Remove track by index
    ///
    /// The cursor keeps pointing at the same track when that track survives.
    /// When the current track itself is removed, the cursor stays on the
    /// slot it occupied, wrapping to 0 if that slot no longer exists.
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }

        let track = self.tracks.remove(index);

        if index < self.current {
            self.current -= 1;
        } else if self.current >= self.tracks.len() {
            self.current = 0;
        }

        Ok(track)
    }

    /// Current track, if any
    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.current)
    }

    /// Current index, if any track exists
    pub fn current_index(&self) -> Option<usize> {
        if self.tracks.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }

    /// Get track at index
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// All tracks in order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Total number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if playlist is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
