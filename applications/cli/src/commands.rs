//! Transport commands typed at the prompt

use crate::error::{CliError, Result};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
    /// Absolute position in seconds
    Seek(f64),
    Forward,
    Rewind,
    Rate(f64),
    /// Raw slider text, parsed by the controller
    Volume(String),
    Mute,
    /// Zero-based playlist index
    Select(usize),
    Add(PathBuf),
    /// Zero-based playlist index
    Remove(usize),
    List,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  play | pause | toggle       transport
  next | prev                 change track (wraps)
  seek <secs|m:ss>            jump to position
  ff | rw                     skip forward/back
  rate <0.5|1|1.25|1.5|2>     playback rate
  vol <0.0-1.0> | mute        volume
  select <n> | remove <n>     playlist entry (1-based)
  add <path>                  append a file
  list | status | help | quit";

impl Command {
    /// Parse one input line
    ///
    /// Playlist numbers are typed 1-based, as `list` shows them.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "play" => Command::Play,
            "pause" => Command::Pause,
            "toggle" | "p" => Command::Toggle,
            "next" | "n" => Command::Next,
            "prev" | "previous" => Command::Previous,
            "seek" => Command::Seek(parse_position(required("seek", rest)?)?),
            "ff" | "forward" => Command::Forward,
            "rw" | "rewind" => Command::Rewind,
            "rate" => {
                let arg = required("rate", rest)?.trim_end_matches('x');
                Command::Rate(arg.parse().map_err(|_| CliError::InvalidArgument {
                    command: "rate",
                    reason: format!("'{}' is not a number", arg),
                })?)
            }
            "vol" | "volume" => Command::Volume(required("vol", rest)?.to_string()),
            "mute" | "m" => Command::Mute,
            "select" => Command::Select(parse_entry("select", rest)?),
            "add" => Command::Add(PathBuf::from(required("add", rest)?)),
            "remove" | "rm" => Command::Remove(parse_entry("remove", rest)?),
            "list" | "ls" => Command::List,
            "status" | "s" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => return Err(CliError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

fn required<'a>(command: &'static str, rest: &'a str) -> Result<&'a str> {
    if rest.is_empty() {
        Err(CliError::InvalidArgument {
            command,
            reason: "missing argument".to_string(),
        })
    } else {
        Ok(rest)
    }
}

/// 1-based entry number to index
fn parse_entry(command: &'static str, rest: &str) -> Result<usize> {
    let arg = required(command, rest)?;
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(CliError::InvalidArgument {
            command,
            reason: format!("'{}' is not a playlist entry", arg),
        }),
    }
}

/// Seconds (`95`, `95.5`) or minutes and seconds (`1:35`)
pub fn parse_position(text: &str) -> Result<f64> {
    let invalid = || CliError::InvalidArgument {
        command: "seek",
        reason: format!("'{}' is not a position", text),
    };

    let seconds = match text.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
            let seconds: f64 = seconds.parse().map_err(|_| invalid())?;
            if !(0.0..60.0).contains(&seconds) {
                return Err(invalid());
            }
            minutes as f64 * 60.0 + seconds
        }
        None => text.parse().map_err(|_| invalid())?,
    };

    if seconds.is_finite() {
        Ok(seconds)
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_transport() {
        assert_eq!(Command::parse("play").unwrap(), Command::Play);
        assert_eq!(Command::parse("  PAUSE ").unwrap(), Command::Pause);
        assert_eq!(Command::parse("p").unwrap(), Command::Toggle);
        assert_eq!(Command::parse("prev").unwrap(), Command::Previous);
        assert_eq!(Command::parse("ff").unwrap(), Command::Forward);
        assert_eq!(Command::parse("q").unwrap(), Command::Quit);
    }

    #[test]
    fn parse_seek_forms() {
        assert_eq!(Command::parse("seek 95").unwrap(), Command::Seek(95.0));
        assert_eq!(Command::parse("seek 1:35").unwrap(), Command::Seek(95.0));
        assert_eq!(Command::parse("seek 0:02.5").unwrap(), Command::Seek(2.5));
        assert!(Command::parse("seek").is_err());
        assert!(Command::parse("seek 1:75").is_err());
        assert!(Command::parse("seek soon").is_err());
        assert!(Command::parse("seek inf").is_err());
    }

    #[test]
    fn parse_rate_accepts_suffix() {
        assert_eq!(Command::parse("rate 1.25").unwrap(), Command::Rate(1.25));
        assert_eq!(Command::parse("rate 2x").unwrap(), Command::Rate(2.0));
        // Membership is checked by the controller
        assert_eq!(Command::parse("rate 3").unwrap(), Command::Rate(3.0));
        assert!(Command::parse("rate fast").is_err());
    }

    #[test]
    fn volume_text_is_passed_through() {
        assert_eq!(
            Command::parse("vol 0.3").unwrap(),
            Command::Volume("0.3".to_string())
        );
    }

    #[test]
    fn entries_are_one_based() {
        assert_eq!(Command::parse("select 1").unwrap(), Command::Select(0));
        assert_eq!(Command::parse("rm 3").unwrap(), Command::Remove(2));
        assert!(Command::parse("select 0").is_err());
        assert!(Command::parse("select -1").is_err());
    }

    #[test]
    fn add_keeps_spaces_in_path() {
        assert_eq!(
            Command::parse("add /music/My Song.mp3").unwrap(),
            Command::Add(PathBuf::from("/music/My Song.mp3"))
        );
    }

    #[test]
    fn unknown_command() {
        assert!(matches!(
            Command::parse("dance"),
            Err(CliError::UnknownCommand(word)) if word == "dance"
        ));
    }
}
