//! Preset Library
//!
//! A small collection of named envelope shapes for editors to offer as
//! starting points.
//!
//! # Example
//!
//! ```
//! use adsr_editor::presets::{PresetCategory, PresetLibrary};
//!
//! let library = PresetLibrary::new();
//!
//! for preset in library.list() {
//!     println!("{}: {}", preset.name, preset.description);
//! }
//!
//! let pluck = library.get("pluck").unwrap();
//! assert_eq!(pluck.category, PresetCategory::Percussive);
//! ```

use crate::params::EnvelopeParams;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Preset category for organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetCategory {
    /// Short, fast-decaying shapes
    Percussive,
    /// Held notes with a steady body
    Sustained,
    /// Slow attacks and long tails
    Ambient,
}

/// A named envelope shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePreset {
    pub name: &'static str,
    pub category: PresetCategory,
    pub description: &'static str,
    pub params: EnvelopeParams,
}

const PRESETS: &[EnvelopePreset] = &[
    EnvelopePreset {
        name: "Default",
        category: PresetCategory::Sustained,
        description: "Quick attack, short decay into a high sustain",
        params: EnvelopeParams {
            attack_ms: 10.0,
            decay_ms: 120.0,
            sustain_level: 0.75,
            release_ms: 250.0,
            attack_curve: 0.0,
            decay_curve: 0.0,
            release_curve: 0.0,
        },
    },
    EnvelopePreset {
        name: "Pluck",
        category: PresetCategory::Percussive,
        description: "Instant attack with a bent decay to silence",
        params: EnvelopeParams {
            attack_ms: 2.0,
            decay_ms: 300.0,
            sustain_level: 0.0,
            release_ms: 150.0,
            attack_curve: 0.0,
            decay_curve: 0.8,
            release_curve: 0.6,
        },
    },
    EnvelopePreset {
        name: "Snap",
        category: PresetCategory::Percussive,
        description: "Very short hit for clicks and transients",
        params: EnvelopeParams {
            attack_ms: 1.0,
            decay_ms: 60.0,
            sustain_level: 0.0,
            release_ms: 40.0,
            attack_curve: 0.0,
            decay_curve: 1.0,
            release_curve: 1.0,
        },
    },
    EnvelopePreset {
        name: "Organ",
        category: PresetCategory::Sustained,
        description: "Gate-like: full level while held, quick cut on release",
        params: EnvelopeParams {
            attack_ms: 5.0,
            decay_ms: 10.0,
            sustain_level: 1.0,
            release_ms: 30.0,
            attack_curve: 0.0,
            decay_curve: 0.0,
            release_curve: 0.0,
        },
    },
    EnvelopePreset {
        name: "Pad",
        category: PresetCategory::Ambient,
        description: "Slow swell and a long soft tail",
        params: EnvelopeParams {
            attack_ms: 800.0,
            decay_ms: 600.0,
            sustain_level: 0.7,
            release_ms: 1500.0,
            attack_curve: -0.4,
            decay_curve: 0.3,
            release_curve: 0.5,
        },
    },
    EnvelopePreset {
        name: "Swell",
        category: PresetCategory::Ambient,
        description: "Accelerating rise that holds at the top",
        params: EnvelopeParams {
            attack_ms: 1200.0,
            decay_ms: 200.0,
            sustain_level: 0.9,
            release_ms: 900.0,
            attack_curve: 1.0,
            decay_curve: 0.0,
            release_curve: -0.3,
        },
    },
];

/// Preset library containing all built-in envelope shapes
#[derive(Debug, Clone, Default)]
pub struct PresetLibrary {
    _private: (),
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// All presets in display order
    pub fn list(&self) -> &'static [EnvelopePreset] {
        PRESETS
    }

    /// Look up a preset by name, ignoring ASCII case
    pub fn get(&self, name: &str) -> Option<&'static EnvelopePreset> {
        PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Parameters of a preset by name
    pub fn params(&self, name: &str) -> Option<EnvelopeParams> {
        self.get(name).map(|p| p.params)
    }

    pub fn by_category(&self, category: PresetCategory) -> Vec<&'static EnvelopePreset> {
        PRESETS.iter().filter(|p| p.category == category).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        PRESETS.iter().map(|p| p.name).collect()
    }
}
