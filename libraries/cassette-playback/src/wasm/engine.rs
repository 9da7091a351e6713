//! Audio engine backed by an `<audio>` element

use crate::{AudioEngine, PlaybackError, Result, SourceHandle};
use wasm_bindgen::prelude::*;
use web_sys::{console, HtmlAudioElement};

/// Drives an `HtmlAudioElement`
///
/// The element does its own decoding and format negotiation; this type only
/// forwards transport commands and reads position/duration back.
pub struct HtmlAudioEngine {
    element: HtmlAudioElement,
    loaded: bool,
    on_play_rejected: Closure<dyn FnMut(JsValue)>,
}

impl HtmlAudioEngine {
    /// Create an engine with a detached audio element
    pub fn new() -> Result<Self> {
        let element = HtmlAudioElement::new()
            .map_err(|e| PlaybackError::Engine(format!("{:?}", e)))?;
        Ok(Self::from_element(element))
    }

    /// Wrap an existing element
    pub fn from_element(element: HtmlAudioElement) -> Self {
        // Autoplay policies reject play() until the user interacts with the page
        let on_play_rejected = Closure::wrap(Box::new(|err: JsValue| {
            console::warn_2(&"play() rejected:".into(), &err);
        }) as Box<dyn FnMut(JsValue)>);

        Self {
            element,
            loaded: false,
            on_play_rejected,
        }
    }

    /// The underlying element, for attaching listeners
    pub fn element(&self) -> &HtmlAudioElement {
        &self.element
    }
}

impl AudioEngine for HtmlAudioEngine {
    fn load(&mut self, source: &SourceHandle) -> Result<()> {
        self.element.set_src(source.uri());
        self.element.load();
        self.loaded = true;
        Ok(())
    }

    fn unload(&mut self) {
        if let Err(e) = self.element.pause() {
            console::warn_1(&e);
        }
        if let Err(e) = self.element.remove_attribute("src") {
            console::warn_1(&e);
        }
        self.element.load();
        self.loaded = false;
    }

    fn play(&mut self) {
        if !self.loaded {
            return;
        }
        match self.element.play() {
            Ok(promise) => {
                let _ = promise.catch(&self.on_play_rejected);
            }
            Err(e) => console::warn_1(&e),
        }
    }

    fn pause(&mut self) {
        if let Err(e) = self.element.pause() {
            console::warn_1(&e);
        }
    }

    fn seek(&mut self, position: f64) -> f64 {
        if self.loaded {
            self.element.set_current_time(position);
        }
        self.element.current_time()
    }

    fn position(&self) -> f64 {
        self.element.current_time()
    }

    fn duration(&self) -> Option<f64> {
        // NaN before metadata arrives, +Infinity for unbounded streams
        let duration = self.element.duration();
        duration.is_finite().then_some(duration)
    }

    fn set_rate(&mut self, rate: f64) {
        self.element.set_default_playback_rate(rate);
        self.element.set_playback_rate(rate);
    }

    fn set_volume(&mut self, volume: f64) {
        self.element.set_volume(volume);
    }

    fn is_ended(&self) -> bool {
        self.loaded && self.element.ended()
    }
}
