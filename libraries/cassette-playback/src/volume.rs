//! Volume control with independent mute
//!
//! Volume is linear in [0, 1], the range of the slider and of the engine's
//! volume input. Muting never changes the level; it only zeroes what the
//! engine receives.

use crate::error::{PlaybackError, Result};

/// Volume controller
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f64,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume controller
    ///
    /// Out-of-range levels are clamped; a non-finite level falls back to 1.0.
    pub fn new(level: f64) -> Self {
        Self {
            level: if level.is_finite() {
                level.clamp(0.0, 1.0)
            } else {
                1.0
            },
            muted: false,
        }
    }

    /// Set volume level (0.0-1.0)
    ///
    /// Finite values outside the range are clamped. NaN and infinities are
    /// rejected and leave the level untouched.
    pub fn set_level(&mut self, level: f64) -> Result<()> {
        if !level.is_finite() {
            return Err(PlaybackError::InvalidVolume(level.to_string()));
        }
        self.level = level.clamp(0.0, 1.0);
        Ok(())
    }

    /// Get current volume level (0.0-1.0)
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Volume the engine should receive
    ///
    /// Returns 0.0 if muted, otherwise the level
    pub fn effective(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Parse slider input into a volume level
///
/// Range inputs deliver their value as text; it has to become a number
/// before it reaches the controller.
pub fn parse_level(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    let level: f64 = trimmed
        .parse()
        .map_err(|_| PlaybackError::InvalidVolume(trimmed.to_string()))?;

    if level.is_finite() {
        Ok(level)
    } else {
        Err(PlaybackError::InvalidVolume(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = Volume::new(0.8);
        assert_eq!(vol.level(), 0.8);
        assert!(!vol.is_muted());

        assert_eq!(Volume::new(4.0).level(), 1.0);
        assert_eq!(Volume::new(f64::NAN).level(), 1.0);
    }

    #[test]
    fn set_volume_level() {
        let mut vol = Volume::new(0.5);

        vol.set_level(0.75).unwrap();
        assert_eq!(vol.level(), 0.75);

        // Clamp to range
        vol.set_level(1.5).unwrap();
        assert_eq!(vol.level(), 1.0);
        vol.set_level(-0.2).unwrap();
        assert_eq!(vol.level(), 0.0);
    }

    #[test]
    fn non_finite_level_is_rejected() {
        let mut vol = Volume::new(0.4);
        assert!(vol.set_level(f64::NAN).is_err());
        assert!(vol.set_level(f64::INFINITY).is_err());
        assert_eq!(vol.level(), 0.4);
    }

    #[test]
    fn toggle_mute_preserves_level() {
        let mut vol = Volume::new(0.8);

        vol.toggle_mute();
        assert!(vol.is_muted());
        assert_eq!(vol.level(), 0.8);
        assert_eq!(vol.effective(), 0.0);

        vol.toggle_mute();
        assert!(!vol.is_muted());
        assert_eq!(vol.effective(), 0.8);
    }

    #[test]
    fn parse_slider_text() {
        assert_eq!(parse_level("0.35").unwrap(), 0.35);
        assert_eq!(parse_level(" 1 ").unwrap(), 1.0);
        assert!(matches!(
            parse_level("loud"),
            Err(PlaybackError::InvalidVolume(_))
        ));
        assert!(parse_level("NaN").is_err());
    }
}
