//! Envelope Parameters
//!
//! The seven user-editable values that fully describe an ADSR shape, plus
//! the validation and sanitizing rules applied to them.
//!
//! Evaluation never fails: the model and the geometry always run on
//! [`EnvelopeParams::sanitized`] values. Callers that prefer to reject bad
//! input up front can call [`EnvelopeParams::validate`].

use crate::curve::{CURVE_MAX, CURVE_MIN};
#[cfg(feature = "alloc")]
use alloc::string::String;
use serde::{Deserialize, Serialize};

/// Time and level parameters of an ADSR envelope
///
/// Durations are in milliseconds. Curve amounts are in [-1, 1] where 0 is
/// linear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "wasm", derive(tsify::Tsify))]
#[cfg_attr(feature = "wasm", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeParams {
    pub attack_ms: f64,
    pub decay_ms: f64,
    pub sustain_level: f64,
    pub release_ms: f64,
    #[serde(default)]
    pub attack_curve: f64,
    #[serde(default)]
    pub decay_curve: f64,
    #[serde(default)]
    pub release_curve: f64,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack_ms: 10.0,
            decay_ms: 120.0,
            sustain_level: 0.75,
            release_ms: 250.0,
            attack_curve: 0.0,
            decay_curve: 0.0,
            release_curve: 0.0,
        }
    }
}

impl EnvelopeParams {
    /// Create linear envelope parameters
    pub fn new(attack_ms: f64, decay_ms: f64, sustain_level: f64, release_ms: f64) -> Self {
        Self {
            attack_ms,
            decay_ms,
            sustain_level,
            release_ms,
            attack_curve: 0.0,
            decay_curve: 0.0,
            release_curve: 0.0,
        }
    }

    pub fn with_attack(mut self, ms: f64) -> Self {
        self.attack_ms = ms;
        self
    }

    pub fn with_decay(mut self, ms: f64) -> Self {
        self.decay_ms = ms;
        self
    }

    pub fn with_sustain(mut self, level: f64) -> Self {
        self.sustain_level = level;
        self
    }

    pub fn with_release(mut self, ms: f64) -> Self {
        self.release_ms = ms;
        self
    }

    /// Set all three curve amounts
    pub fn with_curves(mut self, attack: f64, decay: f64, release: f64) -> Self {
        self.attack_curve = attack;
        self.decay_curve = decay;
        self.release_curve = release;
        self
    }

    /// Time at which the attack peak is reached
    pub fn peak_time_ms(&self) -> f64 {
        sanitize_duration(self.attack_ms)
    }

    /// Time at which the sustain plateau begins
    pub fn sustain_start_ms(&self) -> f64 {
        sanitize_duration(self.attack_ms) + sanitize_duration(self.decay_ms)
    }

    /// Full visualized length: attack, decay, a sustain hold and the release tail
    pub fn total_duration_ms(&self, sustain_hold_ms: f64) -> f64 {
        self.sustain_start_ms()
            + sanitize_duration(sustain_hold_ms)
            + sanitize_duration(self.release_ms)
    }

    /// Check every field against its documented range
    pub fn validate(&self) -> Result<(), ParamError> {
        for (field, value) in [
            (ParamField::Attack, self.attack_ms),
            (ParamField::Decay, self.decay_ms),
            (ParamField::Release, self.release_ms),
        ] {
            if !value.is_finite() {
                return Err(ParamError::NonFinite { field });
            }
            if value < 0.0 {
                return Err(ParamError::NegativeDuration { field, value });
            }
        }

        if !self.sustain_level.is_finite() {
            return Err(ParamError::NonFinite {
                field: ParamField::Sustain,
            });
        }
        if !(0.0..=1.0).contains(&self.sustain_level) {
            return Err(ParamError::SustainOutOfRange(self.sustain_level));
        }

        for (field, value) in [
            (ParamField::AttackCurve, self.attack_curve),
            (ParamField::DecayCurve, self.decay_curve),
            (ParamField::ReleaseCurve, self.release_curve),
        ] {
            if !value.is_finite() {
                return Err(ParamError::NonFinite { field });
            }
            if !(CURVE_MIN..=CURVE_MAX).contains(&value) {
                return Err(ParamError::CurveOutOfRange { field, value });
            }
        }

        Ok(())
    }

    /// Whether [`validate`](Self::validate) would succeed
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Clamp every field into range.
    ///
    /// Negative or non-finite durations become 0 (an instantaneous phase),
    /// sustain is clamped to [0, 1] and curves to [-1, 1]. Non-finite levels
    /// and curves fall back to 0.
    pub fn sanitized(&self) -> Self {
        Self {
            attack_ms: sanitize_duration(self.attack_ms),
            decay_ms: sanitize_duration(self.decay_ms),
            sustain_level: sanitize_unit(self.sustain_level),
            release_ms: sanitize_duration(self.release_ms),
            attack_curve: sanitize_curve(self.attack_curve),
            decay_curve: sanitize_curve(self.decay_curve),
            release_curve: sanitize_curve(self.release_curve),
        }
    }

    /// Serialize to JSON using the host UI's field names
    #[cfg(feature = "alloc")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON. Missing curve fields default to linear.
    #[cfg(feature = "alloc")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

pub(crate) fn sanitize_duration(ms: f64) -> f64 {
    if ms.is_finite() && ms > 0.0 {
        ms
    } else {
        0.0
    }
}

fn sanitize_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn sanitize_curve(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(CURVE_MIN, CURVE_MAX)
    } else {
        0.0
    }
}

/// Identifies a parameter in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamField {
    Attack,
    Decay,
    Sustain,
    Release,
    AttackCurve,
    DecayCurve,
    ReleaseCurve,
}

impl ParamField {
    pub fn name(&self) -> &'static str {
        match self {
            ParamField::Attack => "attack",
            ParamField::Decay => "decay",
            ParamField::Sustain => "sustain",
            ParamField::Release => "release",
            ParamField::AttackCurve => "attack curve",
            ParamField::DecayCurve => "decay curve",
            ParamField::ReleaseCurve => "release curve",
        }
    }
}

/// Error types for parameter validation
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    NegativeDuration { field: ParamField, value: f64 },
    NonFinite { field: ParamField },
    SustainOutOfRange(f64),
    CurveOutOfRange { field: ParamField, value: f64 },
}

impl ParamError {
    /// The parameter that failed validation
    pub fn field(&self) -> ParamField {
        match self {
            ParamError::NegativeDuration { field, .. }
            | ParamError::NonFinite { field }
            | ParamError::CurveOutOfRange { field, .. } => *field,
            ParamError::SustainOutOfRange(_) => ParamField::Sustain,
        }
    }
}

impl core::fmt::Display for ParamError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParamError::NegativeDuration { field, value } => {
                write!(f, "Invalid parameter: {} time {}ms is negative", field.name(), value)
            }
            ParamError::NonFinite { field } => {
                write!(f, "Invalid parameter: {} is not a finite number", field.name())
            }
            ParamError::SustainOutOfRange(value) => {
                write!(f, "Invalid parameter: sustain level {} outside [0, 1]", value)
            }
            ParamError::CurveOutOfRange { field, value } => {
                write!(f, "Invalid parameter: {} {} outside [-1, 1]", field.name(), value)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParamError {}
