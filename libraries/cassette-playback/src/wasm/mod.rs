//! WASM bindings for cassette-playback
//!
//! This module exposes the PlayerController to web pages, playing through an
//! `<audio>` element and taking tracks straight from a file input.

pub mod engine;
pub mod player;

pub use engine::HtmlAudioEngine;
pub use player::WasmPlayer;
