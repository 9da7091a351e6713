/// CLI configuration
use crate::error::{CliError, Result};
use cassette_playback::{AudioFormat, PlayMode, PlaybackRate, PlayerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file read from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "cassette.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub player: PlayerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerSettings {
    #[serde(default)]
    pub mode: PlayMode,

    #[serde(default = "default_volume")]
    pub volume: f64,

    #[serde(default = "default_rate")]
    pub rate: f64,

    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,

    #[serde(default = "default_skip_secs")]
    pub skip_secs: u64,

    #[serde(default)]
    pub reconcile_while_paused: bool,

    #[serde(default = "default_formats")]
    pub formats: Vec<AudioFormat>,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default `cassette.toml` is
    /// optional. `CASSETTE_PLAYER__VOLUME=0.5` style variables override
    /// both.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Override with environment variables (prefixed with CASSETTE_)
        settings = settings.add_source(
            config::Environment::with_prefix("CASSETTE")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("player.formats")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let player = &self.player;

        if !(0.0..=1.0).contains(&player.volume) {
            return Err(CliError::Config(format!(
                "player.volume must be within 0.0-1.0, got {}",
                player.volume
            )));
        }

        if PlaybackRate::try_from(player.rate).is_err() {
            let options: Vec<String> = PlaybackRate::ALL.iter().map(|r| r.to_string()).collect();
            return Err(CliError::Config(format!(
                "player.rate must be one of {}, got {}",
                options.join(", "),
                player.rate
            )));
        }

        if player.poll_ms == 0 {
            return Err(CliError::Config("player.poll_ms must be positive".to_string()));
        }

        if player.formats.is_empty() {
            return Err(CliError::Config(
                "player.formats must list at least one format".to_string(),
            ));
        }

        Ok(())
    }

    /// Controller settings
    pub fn player_config(&self) -> Result<PlayerConfig> {
        let player = &self.player;
        Ok(PlayerConfig {
            mode: player.mode,
            initial_volume: player.volume,
            initial_rate: PlaybackRate::try_from(player.rate)?,
            poll_interval: Duration::from_millis(player.poll_ms),
            reconcile_while_paused: player.reconcile_while_paused,
            skip_step: Duration::from_secs(player.skip_secs),
            formats: player.formats.clone(),
        })
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            mode: PlayMode::default(),
            volume: default_volume(),
            rate: default_rate(),
            poll_ms: default_poll_ms(),
            skip_secs: default_skip_secs(),
            reconcile_while_paused: false,
            formats: default_formats(),
        }
    }
}

// Default values
fn default_volume() -> f64 {
    1.0
}

fn default_rate() -> f64 {
    1.0
}

fn default_poll_ms() -> u64 {
    1000
}

fn default_skip_secs() -> u64 {
    10
}

fn default_formats() -> Vec<AudioFormat> {
    PlayerConfig::default().formats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_player_defaults() {
        let config = CliConfig::default();
        config.validate().unwrap();
        assert_eq!(config.player_config().unwrap(), PlayerConfig::default());
    }

    #[test]
    fn load_from_file() {
        let file = toml_file(
            r#"
            [player]
            mode = "single"
            volume = 0.5
            rate = 1.5
            poll_ms = 250
            formats = ["mp3", "flac"]
            "#,
        );

        let config = CliConfig::load(Some(file.path())).unwrap();
        let player = config.player_config().unwrap();
        assert_eq!(player.mode, PlayMode::Single);
        assert_eq!(player.initial_volume, 0.5);
        assert_eq!(player.initial_rate, PlaybackRate::OneAndHalf);
        assert_eq!(player.poll_interval, Duration::from_millis(250));
        assert_eq!(player.skip_step, Duration::from_secs(10));
        assert!(player.accepts("song.flac"));
        assert!(!player.accepts("song.wav"));
    }

    #[test]
    fn rate_outside_selector_is_rejected() {
        let file = toml_file("[player]\nrate = 0.75\n");
        let err = CliConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("player.rate")));
    }

    #[test]
    fn volume_out_of_range_is_rejected() {
        let mut config = CliConfig::default();
        config.player.volume = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            CliConfig::load(Some(&missing)),
            Err(CliError::Config(_))
        ));
    }
}
