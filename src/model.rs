//! Envelope Model
//!
//! Pure evaluation of an ADSR envelope: given an elapsed time, the
//! parameters and (optionally) the point at which release was triggered,
//! compute the normalized output value.
//!
//! Nothing here holds state, so the live playback loop and the static
//! preview geometry can evaluate the same parameters side by side.

use crate::curve::{ease_in, ease_out};
use crate::params::EnvelopeParams;
use serde::{Deserialize, Serialize};

/// The instant a release (note-off) was triggered
///
/// `start_value` is captured when the release happens and is never
/// recomputed afterwards, so a release from mid-attack decays from wherever
/// the attack had reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "wasm", derive(tsify::Tsify))]
#[cfg_attr(feature = "wasm", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct ReleasePoint {
    pub start_ms: f64,
    pub start_value: f64,
}

impl ReleasePoint {
    pub fn new(start_ms: f64, start_value: f64) -> Self {
        Self {
            start_ms,
            start_value,
        }
    }

    /// Capture a release at `elapsed_ms` from a not-yet-released envelope
    pub fn capture(elapsed_ms: f64, params: &EnvelopeParams) -> Self {
        Self {
            start_ms: elapsed_ms,
            start_value: evaluate(elapsed_ms, params, None),
        }
    }
}

/// Envelope phase at a given time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Attack,
    Decay,
    Sustain,
    Release,
    /// Release tail has fully elapsed
    Finished,
}

/// Evaluate the envelope at `elapsed_ms`.
///
/// Phase precedence, first match wins:
/// 1. released: decay from the captured value to 0 over `release_ms`
/// 2. attack: rise from 0 to 1
/// 3. decay: fall from 1 to the sustain level
/// 4. sustain: hold the sustain level
///
/// Parameters are sanitized first; a zero-length phase is instantaneous.
/// The result is always within [0, 1].
pub fn evaluate(elapsed_ms: f64, params: &EnvelopeParams, release: Option<ReleasePoint>) -> f64 {
    let p = params.sanitized();

    let value = if let Some(release) = release {
        release_value(elapsed_ms, &p, release)
    } else if elapsed_ms < p.attack_ms {
        ease_in(elapsed_ms / p.attack_ms, p.attack_curve)
    } else if elapsed_ms < p.attack_ms + p.decay_ms {
        let progress = (elapsed_ms - p.attack_ms) / p.decay_ms;
        1.0 - (1.0 - p.sustain_level) * ease_out(progress, p.decay_curve)
    } else {
        p.sustain_level
    };

    clamp_unit(value)
}

fn release_value(elapsed_ms: f64, p: &EnvelopeParams, release: ReleasePoint) -> f64 {
    let release_elapsed = elapsed_ms - release.start_ms;
    if release_elapsed >= p.release_ms {
        return 0.0;
    }
    let remaining = 1.0 - release_elapsed / p.release_ms;
    ease_out(remaining, p.release_curve) * clamp_unit(release.start_value)
}

#[inline]
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Which phase the envelope is in at `elapsed_ms`, using the same
/// precedence as [`evaluate`]
pub fn phase_at(elapsed_ms: f64, params: &EnvelopeParams, release: Option<ReleasePoint>) -> Phase {
    let p = params.sanitized();

    if let Some(release) = release {
        if elapsed_ms - release.start_ms >= p.release_ms {
            Phase::Finished
        } else {
            Phase::Release
        }
    } else if elapsed_ms < p.attack_ms {
        Phase::Attack
    } else if elapsed_ms < p.attack_ms + p.decay_ms {
        Phase::Decay
    } else {
        Phase::Sustain
    }
}

/// A single `(time, value)` observation of the envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "wasm", derive(tsify::Tsify))]
#[cfg_attr(feature = "wasm", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct SamplePoint {
    pub time_ms: f64,
    pub value: f64,
}

impl SamplePoint {
    pub fn new(time_ms: f64, value: f64) -> Self {
        Self { time_ms, value }
    }

    /// Evaluate the envelope and package the result
    pub fn at(elapsed_ms: f64, params: &EnvelopeParams, release: Option<ReleasePoint>) -> Self {
        Self {
            time_ms: elapsed_ms,
            value: evaluate(elapsed_ms, params, release),
        }
    }
}
