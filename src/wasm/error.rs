//! Errors surfaced to JavaScript

use crate::params::{ParamError, ParamField};
use alloc::string::{String, ToString};
use wasm_bindgen::prelude::*;

/// Error returned across the wasm boundary
///
/// Parameter errors carry the offending field so an editor can highlight
/// the matching control.
#[wasm_bindgen]
pub struct EnvelopeError {
    message: String,
    field: Option<ParamField>,
}

#[wasm_bindgen]
impl EnvelopeError {
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }

    /// Name of the rejected parameter, if the error came from validation
    #[wasm_bindgen(getter)]
    pub fn field(&self) -> Option<String> {
        self.field.map(|f| f.name().to_string())
    }
}

impl EnvelopeError {
    pub fn unknown_preset(name: &str) -> Self {
        Self {
            message: alloc::format!("Unknown preset: {}", name),
            field: None,
        }
    }

    /// Convert for `Result<_, JsValue>` returns. JS receives the
    /// `EnvelopeError` object itself, with `message` and `field` getters.
    pub fn into_js(self) -> JsValue {
        JsValue::from(self)
    }
}

impl From<ParamError> for EnvelopeError {
    fn from(e: ParamError) -> Self {
        Self {
            field: Some(e.field()),
            message: e.to_string(),
        }
    }
}

impl From<serde_wasm_bindgen::Error> for EnvelopeError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        Self {
            message: e.to_string(),
            field: None,
        }
    }
}
