//! EnvelopeEngine - Main WASM interface for the envelope editor

use super::error::EnvelopeError;
use crate::model::evaluate;
use crate::observer::EventBuffer;
use crate::params::EnvelopeParams;
use crate::playback::{EnvelopePlayer, PlaybackConfig, PlaybackStatus};
use crate::presets::PresetLibrary;
use crate::scheduler::ManualScheduler;
use crate::visual::{EnvelopePath, Viewport};
use wasm_bindgen::prelude::*;

/// Main WASM interface: parameters, preview geometry and live playback
#[wasm_bindgen]
pub struct EnvelopeEngine {
    params: EnvelopeParams,
    player: EnvelopePlayer<ManualScheduler, EventBuffer>,
    presets: PresetLibrary,
}

impl Default for EnvelopeEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl EnvelopeEngine {
    /// Create an engine with default parameters
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        // Initialize panic hook for better error messages
        console_error_panic_hook::set_once();

        Self {
            params: EnvelopeParams::default(),
            player: EnvelopePlayer::new(ManualScheduler::new(), EventBuffer::new()),
            presets: PresetLibrary::new(),
        }
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Current parameters as a JS object
    pub fn get_params(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.params)
            .map_err(|e| EnvelopeError::from(e).into_js())
    }

    /// Replace the parameters; rejected if any field is out of range
    pub fn set_params(&mut self, params: JsValue) -> Result<(), JsValue> {
        let params: EnvelopeParams = serde_wasm_bindgen::from_value(params)
            .map_err(|e| EnvelopeError::from(e).into_js())?;
        params
            .validate()
            .map_err(|e| EnvelopeError::from(e).into_js())?;
        self.params = params;
        Ok(())
    }

    /// Load a built-in preset by name
    pub fn load_preset(&mut self, name: &str) -> Result<(), JsValue> {
        self.params = self
            .presets
            .params(name)
            .ok_or_else(|| EnvelopeError::unknown_preset(name).into_js())?;
        Ok(())
    }

    /// Names of the built-in presets
    pub fn get_presets(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.presets.names())
            .map_err(|e| EnvelopeError::from(e).into_js())
    }

    #[wasm_bindgen(getter)]
    pub fn sustain_hold_ms(&self) -> f64 {
        self.player.config().sustain_hold_ms
    }

    #[wasm_bindgen(setter)]
    pub fn set_sustain_hold_ms(&mut self, ms: f64) {
        let config = self.player.config().with_sustain_hold(ms);
        self.player.set_config(config);
    }

    // =========================================================================
    // Evaluation and Geometry
    // =========================================================================

    /// Unreleased envelope value at `elapsed_ms`
    pub fn evaluate(&self, elapsed_ms: f64) -> f64 {
        evaluate(elapsed_ms, &self.params, None)
    }

    /// Static preview outline for a canvas of the given size
    pub fn compute_path(&self, width: f64, height: f64) -> Result<JsValue, JsValue> {
        let path = EnvelopePath::compute(
            &self.params,
            Viewport::new(width, height),
            self.player.config().sustain_hold_ms,
        );
        serde_wasm_bindgen::to_value(&path).map_err(|e| EnvelopeError::from(e).into_js())
    }

    // =========================================================================
    // Playback
    // =========================================================================

    /// Trigger a note at the host timestamp `now_ms`
    pub fn start(&mut self, now_ms: f64) {
        self.player.start(now_ms);
    }

    /// Stop playback immediately
    pub fn stop(&mut self) {
        self.player.stop();
    }

    /// Note-off at `now_ms`; returns whether a release happened
    pub fn release(&mut self, now_ms: f64) -> bool {
        self.player.release(now_ms, &self.params)
    }

    /// Deliver an animation frame. Returns whether another frame is wanted.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        self.player.advance_frame(now_ms, &self.params);
        self.wants_frame()
    }

    /// Whether the player is waiting for a frame
    pub fn wants_frame(&self) -> bool {
        self.player.scheduler().has_pending()
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    pub fn is_releasing(&self) -> bool {
        self.player.status() == PlaybackStatus::Releasing
    }

    /// Most recent emitted value
    pub fn current_value(&self) -> f64 {
        self.player.observer().last_value()
    }

    /// Drain queued playback events (started, samples, stopped)
    pub fn drain_events(&mut self) -> Result<JsValue, JsValue> {
        let events = self.player.observer_mut().drain_events();
        serde_wasm_bindgen::to_value(&events).map_err(|e| EnvelopeError::from(e).into_js())
    }

    /// Drain queued samples as interleaved `[time, value, time, value, ...]`,
    /// discarding lifecycle events
    pub fn drain_samples(&mut self) -> js_sys::Float64Array {
        let samples = self.player.observer_mut().drain_samples();
        let output = js_sys::Float64Array::new_with_length((samples.len() * 2) as u32);
        for (i, sample) in samples.iter().enumerate() {
            output.set_index((i * 2) as u32, sample.time_ms);
            output.set_index((i * 2 + 1) as u32, sample.value);
        }
        output
    }

    /// Reset timing to defaults
    pub fn reset_config(&mut self) {
        self.player.set_config(PlaybackConfig::default());
    }
}
