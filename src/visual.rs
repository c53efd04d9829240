//! Visual Geometry
//!
//! This module turns envelope parameters into drawable geometry:
//! - the static envelope outline (one point per horizontal pixel)
//! - phase boundary positions for gridlines and labels
//! - the playhead and value dot during live playback
//! - SVG path data export
//!
//! Pixel formats, colors and strokes belong to the [`RenderSink`]; nothing
//! here draws.

use crate::model::{evaluate, ReleasePoint, SamplePoint};
use crate::observer::PlaybackObserver;
use crate::params::{sanitize_duration, EnvelopeParams};
use crate::playback::DEFAULT_SUSTAIN_HOLD_MS;
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;
use serde::{Deserialize, Serialize};

// =============================================================================
// Geometry Types
// =============================================================================

/// A point in viewport pixels, y growing downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "wasm", derive(tsify::Tsify))]
#[cfg_attr(feature = "wasm", tsify(into_wasm_abi, from_wasm_abi))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Upper bound on sampled columns; wider viewports are sampled sparser
pub const MAX_COLUMNS: usize = 16384;

/// Drawing surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Number of horizontal pixel columns sampled, in `1..=MAX_COLUMNS`
    fn columns(&self) -> usize {
        if self.width.is_finite() && self.width >= 1.0 {
            libm::round(self.width.min(MAX_COLUMNS as f64)) as usize
        } else {
            1
        }
    }
}

/// x positions where each phase ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "wasm", derive(tsify::Tsify))]
#[cfg_attr(feature = "wasm", tsify(into_wasm_abi, from_wasm_abi))]
pub struct PhaseBoundaries {
    /// End of attack (the peak)
    pub attack: f64,
    /// End of decay (start of sustain)
    pub decay: f64,
    /// End of sustain (start of release)
    pub sustain: f64,
}

/// Playhead position and the value dot riding on it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "wasm", derive(tsify::Tsify))]
#[cfg_attr(feature = "wasm", tsify(into_wasm_abi, from_wasm_abi))]
pub struct Playhead {
    pub x: f64,
    pub dot: Point,
}

// =============================================================================
// Envelope Path
// =============================================================================

/// Sampled outline of an envelope across a viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "wasm", derive(tsify::Tsify))]
#[cfg_attr(feature = "wasm", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct EnvelopePath {
    pub outline: Vec<Point>,
    #[serde(rename = "phaseBoundaryX")]
    pub boundaries: PhaseBoundaries,
    pub width: f64,
    pub height: f64,
    /// Time spanned by the full width
    pub duration_ms: f64,
    /// Time at which the drawn release begins
    pub release_at_ms: f64,
}

impl EnvelopePath {
    /// Static preview with release assumed at the end of `sustain_hold_ms`
    pub fn compute(params: &EnvelopeParams, viewport: Viewport, sustain_hold_ms: f64) -> Self {
        let release_at_ms = params.sustain_start_ms() + sanitize_duration(sustain_hold_ms);
        Self::with_release_at(params, viewport, release_at_ms)
    }

    /// Outline with the release drawn from `release_at_ms`.
    ///
    /// The part before the release uses the unreleased evaluation; the tail
    /// decays from whatever value the envelope held at `release_at_ms`.
    pub fn with_release_at(params: &EnvelopeParams, viewport: Viewport, release_at_ms: f64) -> Self {
        let release_at_ms = sanitize_duration(release_at_ms);
        let duration_ms = release_at_ms + sanitize_duration(params.release_ms);
        let release = ReleasePoint::capture(release_at_ms, params);

        let mut path = Self {
            outline: Vec::new(),
            boundaries: PhaseBoundaries {
                attack: 0.0,
                decay: 0.0,
                sustain: 0.0,
            },
            width: extent(viewport.width),
            height: extent(viewport.height),
            duration_ms,
            release_at_ms,
        };

        let columns = viewport.columns();
        path.outline.reserve(columns + 1);
        for i in 0..=columns {
            let time_ms = duration_ms * i as f64 / columns as f64;
            let value = if time_ms < release_at_ms {
                evaluate(time_ms, params, None)
            } else {
                evaluate(time_ms, params, Some(release))
            };
            path.outline
                .push(Point::new(path.width * i as f64 / columns as f64, path.value_to_y(value)));
        }

        path.boundaries = PhaseBoundaries {
            attack: path.time_to_x(params.peak_time_ms()),
            decay: path.time_to_x(params.sustain_start_ms()),
            sustain: path.time_to_x(release_at_ms),
        };
        path
    }

    /// Map a time to an x position, clamped to the viewport
    pub fn time_to_x(&self, time_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 || !time_ms.is_finite() {
            return 0.0;
        }
        (time_ms * self.width / self.duration_ms).clamp(0.0, self.width)
    }

    /// Map an envelope value to a y position (1 at the top, 0 at the bottom)
    pub fn value_to_y(&self, value: f64) -> f64 {
        (1.0 - value.clamp(0.0, 1.0)) * self.height
    }

    /// Playhead and value dot for a live sample
    pub fn playhead(&self, sample: SamplePoint) -> Playhead {
        let x = self.time_to_x(sample.time_ms);
        Playhead {
            x,
            dot: Point::new(x, self.value_to_y(sample.value)),
        }
    }

    /// Outline closed along the baseline, for filling.
    ///
    /// Shares its points with the stroked outline.
    pub fn fill_polygon(&self) -> Vec<Point> {
        let mut polygon = Vec::with_capacity(self.outline.len() + 2);
        polygon.extend_from_slice(&self.outline);
        polygon.push(Point::new(self.width, self.height));
        polygon.push(Point::new(0.0, self.height));
        polygon
    }

    /// SVG path data for the outline (`M x,y L x,y ...`)
    pub fn to_svg_path(&self) -> String {
        points_to_svg(&self.outline, false)
    }

    /// SVG path data for the filled area, closed with `Z`
    pub fn to_svg_fill(&self) -> String {
        points_to_svg(&self.fill_polygon(), true)
    }
}

/// Non-finite or negative extents collapse to zero
fn extent(pixels: f64) -> f64 {
    if pixels.is_finite() {
        pixels.max(0.0)
    } else {
        0.0
    }
}

fn points_to_svg(points: &[Point], close: bool) -> String {
    let mut data = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        if i > 0 {
            data.push(' ');
        }
        // Writing into a String cannot fail
        let _ = write!(data, "{}{:.2},{:.2}", cmd, p.x, p.y);
    }
    if close && !points.is_empty() {
        data.push_str(" Z");
    }
    data
}

/// Static preview geometry using the default sustain hold
pub fn compute_envelope_path(params: &EnvelopeParams, width: f64, height: f64) -> EnvelopePath {
    EnvelopePath::compute(params, Viewport::new(width, height), DEFAULT_SUSTAIN_HOLD_MS)
}

// =============================================================================
// Render Sink
// =============================================================================

/// Everything a renderer needs for one redraw
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    /// Static background curve
    pub path: &'a EnvelopePath,
    /// Present while a note is playing
    pub playhead: Option<Playhead>,
    /// Points visited by the current note, oldest first
    pub trace: &'a [Point],
}

/// A drawing surface that receives computed geometry
pub trait RenderSink {
    fn redraw(&mut self, frame: &RenderFrame<'_>);
}

/// Configuration for [`RenderObserver`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Maximum live trace points kept (default: 4096)
    pub max_trace_points: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_trace_points: 4096,
        }
    }
}

/// Adapts a [`RenderSink`] into a playback observer.
///
/// Every sample moves the playhead and extends the trace; stopping clears
/// both.
#[derive(Debug)]
pub struct RenderObserver<R: RenderSink> {
    sink: R,
    path: EnvelopePath,
    trace: VecDeque<Point>,
    config: RenderConfig,
}

impl<R: RenderSink> RenderObserver<R> {
    pub fn new(sink: R, path: EnvelopePath) -> Self {
        Self::with_config(sink, path, RenderConfig::default())
    }

    pub fn with_config(sink: R, path: EnvelopePath, config: RenderConfig) -> Self {
        Self {
            sink,
            path,
            trace: VecDeque::new(),
            config,
        }
    }

    pub fn path(&self) -> &EnvelopePath {
        &self.path
    }

    /// Replace the background curve, e.g. after a parameter edit
    pub fn set_path(&mut self, path: EnvelopePath) {
        self.path = path;
        self.redraw(None);
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut R {
        &mut self.sink
    }

    pub fn into_sink(self) -> R {
        self.sink
    }

    pub fn trace_len(&self) -> usize {
        self.trace.len()
    }

    fn redraw(&mut self, playhead: Option<Playhead>) {
        let frame = RenderFrame {
            path: &self.path,
            playhead,
            trace: self.trace.make_contiguous(),
        };
        self.sink.redraw(&frame);
    }
}

impl<R: RenderSink> PlaybackObserver for RenderObserver<R> {
    fn on_sample(&mut self, sample: SamplePoint) {
        let playhead = self.path.playhead(sample);
        self.trace.push_back(playhead.dot);
        while self.trace.len() > self.config.max_trace_points {
            self.trace.pop_front();
        }
        self.redraw(Some(playhead));
    }

    fn on_playback_start(&mut self) {
        self.trace.clear();
        self.redraw(None);
    }

    fn on_playback_stop(&mut self) {
        self.trace.clear();
        self.redraw(None);
    }
}

// =============================================================================
// Tests
// =============================================================================
