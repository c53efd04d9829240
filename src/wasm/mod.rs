//! WASM bindings for the envelope editor
//!
//! This module provides the JavaScript-facing API for driving the envelope
//! model and playback loop from a browser. The host forwards its
//! animation-frame timestamps to [`EnvelopeEngine::frame`].

mod engine;
mod error;

pub use engine::EnvelopeEngine;
pub use error::EnvelopeError;

// Re-export wasm_bindgen for convenience
pub use wasm_bindgen::prelude::*;
