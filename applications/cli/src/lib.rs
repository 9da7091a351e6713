//! Cassette CLI Library
//!
//! Terminal front end for the Cassette player: plays a playlist against a
//! virtual-clock engine and reads transport commands from stdin.
//!
//! This library exposes the components for testing purposes.

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod poller;
pub mod session;

pub use commands::Command;
pub use config::CliConfig;
pub use engine::ClockEngine;
pub use error::{CliError, Result};
pub use poller::PollTimer;
pub use session::{Outcome, Session};
