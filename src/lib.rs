//! # ADSR Editor Core
//!
//! `adsr_editor` is the engine behind an ADSR envelope editor widget: a pure
//! envelope model, a frame-driven playback loop and the geometry a renderer
//! needs to draw the curve, playhead and value dot.
//!
//! ## Architecture
//!
//! - **Model** - [`evaluate`] maps elapsed time, parameters and release state
//!   to a value in [0, 1], with per-segment curve shaping
//! - **Playback** - [`EnvelopePlayer`] samples the model once per frame from an
//!   injected [`Scheduler`] and reports to a [`PlaybackObserver`]
//! - **Visual** - [`EnvelopePath`] samples the model across a viewport for the
//!   static curve; [`RenderObserver`] adapts a [`RenderSink`] to playback
//!
//! ## Quick Start
//!
//! ```rust
//! use adsr_editor::prelude::*;
//!
//! let params = EnvelopeParams::new(10.0, 120.0, 0.75, 250.0);
//!
//! // Pure evaluation
//! assert_eq!(evaluate(130.0, &params, None), 0.75);
//!
//! // Static curve for a 300x100 canvas
//! let path = compute_envelope_path(&params, 300.0, 100.0);
//! assert_eq!(path.outline.len(), 301);
//!
//! // Live playback driven by frame timestamps
//! let mut values = Vec::new();
//! let mut player = EnvelopePlayer::new(ManualScheduler::new(), |s: SamplePoint| values.push(s.value));
//! player.start(0.0);
//! player.advance_frame(5.0, &params);
//! player.stop();
//! drop(player);
//! assert_eq!(values, vec![0.5, 0.0]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod curve;
pub mod model;
pub mod observer;
pub mod params;
pub mod playback;
pub mod presets;
pub mod scheduler;
pub mod visual;

#[cfg(feature = "wasm")]
pub mod wasm;

/// Prelude module for convenient imports
pub mod prelude {
    // Model
    pub use crate::curve::{ease_in, ease_out, CurveFamily, CurveKind};
    pub use crate::model::{evaluate, phase_at, Phase, ReleasePoint, SamplePoint};
    pub use crate::params::{EnvelopeParams, ParamError, ParamField};

    // Playback
    pub use crate::observer::{EventBuffer, Fanout, ObserverConfig, PlaybackEvent, PlaybackObserver};
    pub use crate::playback::{
        render_playback, EnvelopePlayer, PlaybackConfig, PlaybackState, PlaybackStatus, Step,
        DEFAULT_COMPLETION_GUARD_MS, DEFAULT_SUSTAIN_HOLD_MS,
    };
    pub use crate::scheduler::{ManualScheduler, Scheduler, TickHandle};

    // Visual
    pub use crate::visual::{
        compute_envelope_path, EnvelopePath, PhaseBoundaries, Playhead, Point, RenderConfig,
        RenderFrame, RenderObserver, RenderSink, Viewport,
    };

    // Presets
    pub use crate::presets::{EnvelopePreset, PresetCategory, PresetLibrary};
}

// Re-export key types at crate root for convenience
pub use prelude::*;
