//! WASM-compatible PlayerController wrapper

use super::engine::HtmlAudioEngine;
use crate::{NewTrack, PlaybackRate, PlayerConfig, PlayerController, Result, SourceHandle};
use gloo_timers::callback::Interval;
use js_sys::Function;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use web_sys::{console, Event, FileList, HtmlAudioElement, Url};

/// State shared with timer and element callbacks
struct Shared {
    controller: RefCell<PlayerController>,
    element: HtmlAudioElement,
    poll_timer: RefCell<Option<Interval>>,
    on_change: RefCell<Option<Function>>,
}

/// Browser player
///
/// Every method that changes state re-checks whether the reconciliation
/// timer should run and rebuilds or drops it accordingly, then forwards the
/// resulting events to the `onChange` callback.
#[wasm_bindgen]
pub struct WasmPlayer {
    shared: Rc<Shared>,
    on_ended: Closure<dyn FnMut(Event)>,
    on_error: Closure<dyn FnMut(Event)>,
}

#[wasm_bindgen]
impl WasmPlayer {
    /// Create a player with default settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> std::result::Result<WasmPlayer, JsValue> {
        Self::build(PlayerConfig::default())
    }

    /// Create a player from a config object (`PlayerConfig` fields)
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> std::result::Result<WasmPlayer, JsValue> {
        let config: PlayerConfig = serde_wasm_bindgen::from_value(config)?;
        Self::build(config)
    }

    fn build(config: PlayerConfig) -> std::result::Result<WasmPlayer, JsValue> {
        // Enable panic hooks for better error messages in console
        console_error_panic_hook::set_once();

        let engine = HtmlAudioEngine::new().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let element = engine.element().clone();

        let mut controller = PlayerController::with_engine(config, Box::new(engine));
        controller.set_source_releaser(Box::new(|source: &SourceHandle| {
            if let Err(e) = Url::revoke_object_url(source.uri()) {
                console::warn_1(&e);
            }
        }));

        let shared = Rc::new(Shared {
            controller: RefCell::new(controller),
            element,
            poll_timer: RefCell::new(None),
            on_change: RefCell::new(None),
        });

        let on_ended = {
            let weak = Rc::downgrade(&shared);
            Closure::wrap(Box::new(move |_: Event| {
                with_shared(&weak, |shared| {
                    // The reconciliation tick may have handled this end already
                    if shared.element.ended() {
                        shared.controller.borrow_mut().on_track_ended();
                        after_change(shared);
                    }
                });
            }) as Box<dyn FnMut(Event)>)
        };

        let on_error = {
            let weak = Rc::downgrade(&shared);
            Closure::wrap(Box::new(move |_: Event| {
                with_shared(&weak, |shared| {
                    let reason = shared
                        .element
                        .error()
                        .map(|e| format!("media error {}: {}", e.code(), e.message()))
                        .unwrap_or_else(|| "unknown media error".to_string());

                    {
                        let mut controller = shared.controller.borrow_mut();
                        let current_src = controller
                            .state()
                            .current_track()
                            .map(|track| track.source.uri().to_string());
                        if current_src.as_deref() == Some(shared.element.src().as_str()) {
                            let ticket = controller.current_load_ticket();
                            controller.load_failed(ticket, reason);
                        }
                    }
                    after_change(shared);
                });
            }) as Box<dyn FnMut(Event)>)
        };

        shared
            .element
            .add_event_listener_with_callback("ended", on_ended.as_ref().unchecked_ref())?;
        shared
            .element
            .add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())?;

        Ok(Self {
            shared,
            on_ended,
            on_error,
        })
    }

    // ===== Callbacks =====

    /// Register a callback receiving every player event
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: Function) {
        *self.shared.on_change.borrow_mut() = Some(callback);
    }

    // ===== Playlist =====

    /// Add the files chosen in an `<input type="file">`
    #[wasm_bindgen(js_name = addFiles)]
    pub fn add_files(&self, files: &FileList) -> std::result::Result<bool, JsValue> {
        let mut picked = Vec::new();
        for index in 0..files.length() {
            let Some(file) = files.get(index) else {
                continue;
            };
            let url = Url::create_object_url_with_blob(&file)?;
            picked.push(NewTrack::new(url, file.name()));
        }

        Ok(self.run(|controller| controller.add_tracks(picked)))
    }

    /// Play the track at `index`
    #[wasm_bindgen(js_name = selectTrack)]
    pub fn select_track(&self, index: usize) -> bool {
        self.run(|controller| controller.select_track(index))
    }

    /// Remove the track at `index`
    #[wasm_bindgen(js_name = removeTrack)]
    pub fn remove_track(&self, index: usize) -> bool {
        self.run(|controller| controller.remove_track(index))
    }

    // ===== Transport =====

    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&self) -> bool {
        self.run(|controller| controller.toggle_play_pause())
    }

    pub fn play(&self) -> bool {
        self.run(|controller| controller.play())
    }

    pub fn pause(&self) -> bool {
        self.run(|controller| controller.pause())
    }

    pub fn next(&self) -> bool {
        self.run(|controller| controller.next())
    }

    pub fn previous(&self) -> bool {
        self.run(|controller| controller.previous())
    }

    // ===== Seeking =====

    /// Seek to position in seconds (seek slider)
    pub fn seek(&self, position: f64) -> bool {
        self.run(|controller| controller.seek(position))
    }

    #[wasm_bindgen(js_name = skipForward)]
    pub fn skip_forward(&self) -> bool {
        self.run(|controller| controller.skip_forward())
    }

    #[wasm_bindgen(js_name = skipBackward)]
    pub fn skip_backward(&self) -> bool {
        self.run(|controller| controller.skip_backward())
    }

    // ===== Rate & Volume =====

    #[wasm_bindgen(js_name = setPlaybackRate)]
    pub fn set_playback_rate(&self, rate: f64) -> bool {
        self.run(|controller| controller.set_playback_rate(rate))
    }

    /// Set volume (0.0-1.0)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, level: f64) -> bool {
        self.run(|controller| controller.set_volume(level))
    }

    /// Set volume from a range input's `value`
    #[wasm_bindgen(js_name = setVolumeText)]
    pub fn set_volume_text(&self, input: &str) -> bool {
        self.run(|controller| controller.set_volume_text(input))
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) -> bool {
        self.run(|controller| controller.toggle_mute())
    }

    // ===== State Queries =====

    /// Render-ready snapshot (see `PlayerSnapshot`)
    pub fn snapshot(&self) -> std::result::Result<JsValue, JsValue> {
        let snapshot = self.shared.controller.borrow().snapshot();
        Ok(serde_wasm_bindgen::to_value(&snapshot)?)
    }

    /// Values for the rate selector
    #[wasm_bindgen(js_name = rateOptions)]
    pub fn rate_options() -> Vec<f64> {
        PlaybackRate::ALL.iter().map(|rate| rate.multiplier()).collect()
    }

    /// Value for the file input's `accept` attribute
    #[wasm_bindgen(js_name = acceptAttribute)]
    pub fn accept_attribute(&self) -> String {
        let controller = self.shared.controller.borrow();
        controller
            .config()
            .formats
            .iter()
            .flat_map(|format| [format.mime_type().to_string(), format!(".{}", format.extension())])
            .collect::<Vec<_>>()
            .join(",")
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.shared.controller.borrow().state().is_playing()
    }

    #[wasm_bindgen(js_name = currentTime)]
    pub fn current_time(&self) -> f64 {
        self.shared.controller.borrow().state().current_time()
    }

    pub fn duration(&self) -> f64 {
        self.shared.controller.borrow().state().duration()
    }

    fn run(&self, op: impl FnOnce(&mut PlayerController) -> Result<()>) -> bool {
        let outcome = op(&mut self.shared.controller.borrow_mut());
        after_change(&self.shared);

        match outcome {
            Ok(()) => true,
            Err(e) => {
                console::warn_1(&JsValue::from_str(&e.to_string()));
                false
            }
        }
    }
}

impl Drop for WasmPlayer {
    fn drop(&mut self) {
        let element = &self.shared.element;
        let _ = element
            .remove_event_listener_with_callback("ended", self.on_ended.as_ref().unchecked_ref());
        let _ = element
            .remove_event_listener_with_callback("error", self.on_error.as_ref().unchecked_ref());
        self.shared.poll_timer.borrow_mut().take();
    }
}

fn with_shared(weak: &Weak<Shared>, f: impl FnOnce(&Rc<Shared>)) {
    if let Some(shared) = weak.upgrade() {
        f(&shared);
    }
}

/// Rebuild or drop the timer to match play intent, then publish events
fn after_change(shared: &Rc<Shared>) {
    sync_poll_timer(shared);
    publish_events(shared);
}

fn sync_poll_timer(shared: &Rc<Shared>) {
    let (wanted, interval) = {
        let controller = shared.controller.borrow();
        (controller.should_poll(), controller.poll_interval())
    };

    let mut timer = shared.poll_timer.borrow_mut();
    if wanted && timer.is_none() {
        let weak = Rc::downgrade(shared);
        let millis = u32::try_from(interval.as_millis()).unwrap_or(u32::MAX);
        *timer = Some(Interval::new(millis, move || {
            // Never drops the timer from inside its own callback; a timer left
            // idle here is dropped by the next state change
            with_shared(&weak, |shared| {
                shared.controller.borrow_mut().tick();
                publish_events(shared);
            });
        }));
    } else if !wanted {
        timer.take();
    }
}

fn publish_events(shared: &Rc<Shared>) {
    let events = shared.controller.borrow_mut().drain_events();
    let Some(callback) = shared.on_change.borrow().clone() else {
        return;
    };

    for event in events {
        match serde_wasm_bindgen::to_value(&event) {
            Ok(value) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    console::warn_1(&e);
                }
            }
            Err(e) => console::warn_1(&e.into()),
        }
    }
}
