//! Envelope Playback
//!
//! Drives one "note" of the envelope from trigger to the end of the release
//! tail, sampling the model once per delivered frame.
//!
//! ```text
//! Idle ──start──▶ Active ──(hold elapsed | release)──▶ Releasing ──(tail + guard)──▶ Idle
//!   ▲                │                                     │
//!   └──────stop──────┴─────────────────stop────────────────┘
//! ```
//!
//! The state itself ([`PlaybackState`]) only changes through pure
//! transition functions, so the rules can be tested without a scheduler.
//! [`EnvelopePlayer`] wires those transitions to a [`Scheduler`] and a
//! [`PlaybackObserver`].

use crate::model::{evaluate, ReleasePoint, SamplePoint};
use crate::observer::PlaybackObserver;
use crate::params::{sanitize_duration, EnvelopeParams};
use crate::scheduler::{ManualScheduler, Scheduler, TickHandle};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Default time the sustain plateau is shown before releasing automatically
pub const DEFAULT_SUSTAIN_HOLD_MS: f64 = 1000.0;

/// Default extra time after the release tail before playback ends
pub const DEFAULT_COMPLETION_GUARD_MS: f64 = 100.0;

// =============================================================================
// Configuration
// =============================================================================

/// Timing configuration for playback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackConfig {
    /// How long the sustain plateau is held before auto-release
    pub sustain_hold_ms: f64,
    /// Extra time past the release tail before returning to Idle
    pub completion_guard_ms: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sustain_hold_ms: DEFAULT_SUSTAIN_HOLD_MS,
            completion_guard_ms: DEFAULT_COMPLETION_GUARD_MS,
        }
    }
}

impl PlaybackConfig {
    pub fn with_sustain_hold(mut self, ms: f64) -> Self {
        self.sustain_hold_ms = ms;
        self
    }

    pub fn with_completion_guard(mut self, ms: f64) -> Self {
        self.completion_guard_ms = ms;
        self
    }

    /// Elapsed time after which an unreleased note auto-releases
    pub fn auto_release_ms(&self, params: &EnvelopeParams) -> f64 {
        params.sustain_start_ms() + sanitize_duration(self.sustain_hold_ms)
    }
}

// =============================================================================
// Playback State
// =============================================================================

/// Coarse playback status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    Idle,
    /// Attack, decay or sustain
    Active,
    Releasing,
}

/// State of one note in flight
///
/// Idle is represented by the absence of a state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub elapsed_ms: f64,
    pub release: Option<ReleasePoint>,
}

/// Result of advancing a [`PlaybackState`] by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Still playing; emit the sample
    Sample {
        state: PlaybackState,
        sample: SamplePoint,
    },
    /// Auto-release fired on this frame; emit the sample
    Released {
        state: PlaybackState,
        sample: SamplePoint,
    },
    /// Release tail and guard have elapsed; return to Idle
    Completed,
}

impl PlaybackState {
    /// Fresh state at trigger time
    pub fn started() -> Self {
        Self {
            elapsed_ms: 0.0,
            release: None,
        }
    }

    pub fn released(&self) -> bool {
        self.release.is_some()
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.released() {
            PlaybackStatus::Releasing
        } else {
            PlaybackStatus::Active
        }
    }

    /// Trigger release at `elapsed_ms`, capturing the current value.
    /// Already-released states are returned unchanged.
    pub fn release_at(self, elapsed_ms: f64, params: &EnvelopeParams) -> Self {
        if self.released() {
            return self;
        }
        Self {
            elapsed_ms,
            release: Some(ReleasePoint::capture(elapsed_ms, params)),
        }
    }

    /// Advance the clock to `elapsed_ms`.
    ///
    /// The same elapsed time drives the auto-release check, the completion
    /// check and the emitted value.
    pub fn advance(self, elapsed_ms: f64, params: &EnvelopeParams, config: &PlaybackConfig) -> Step {
        let mut state = Self {
            elapsed_ms,
            ..self
        };

        let mut auto_released = false;
        if !state.released() && elapsed_ms > config.auto_release_ms(params) {
            state = state.release_at(elapsed_ms, params);
            auto_released = true;
        }

        if let Some(release) = state.release {
            let end = release.start_ms
                + sanitize_duration(params.release_ms)
                + sanitize_duration(config.completion_guard_ms);
            if elapsed_ms > end {
                return Step::Completed;
            }
        }

        let sample = SamplePoint::new(elapsed_ms, evaluate(elapsed_ms, params, state.release));
        if auto_released {
            Step::Released { state, sample }
        } else {
            Step::Sample { state, sample }
        }
    }
}

// =============================================================================
// Player
// =============================================================================

/// Real-time envelope playback loop
///
/// Owns the playback state, a scheduler and an observer. Parameters are
/// passed on every call so edits take effect on the next frame.
pub struct EnvelopePlayer<S: Scheduler, O: PlaybackObserver> {
    scheduler: S,
    observer: O,
    config: PlaybackConfig,
    state: Option<PlaybackState>,
    start_timestamp_ms: f64,
    pending: Option<TickHandle>,
}

impl<S: Scheduler, O: PlaybackObserver> EnvelopePlayer<S, O> {
    pub fn new(scheduler: S, observer: O) -> Self {
        Self::with_config(scheduler, observer, PlaybackConfig::default())
    }

    pub fn with_config(scheduler: S, observer: O, config: PlaybackConfig) -> Self {
        Self {
            scheduler,
            observer,
            config,
            state: None,
            start_timestamp_ms: 0.0,
            pending: None,
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Replace the timing configuration; applies from the next frame
    pub fn set_config(&mut self, config: PlaybackConfig) {
        self.config = config;
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_parts(self) -> (S, O) {
        (self.scheduler, self.observer)
    }

    pub fn state(&self) -> Option<&PlaybackState> {
        self.state.as_ref()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state
            .map(|s| s.status())
            .unwrap_or(PlaybackStatus::Idle)
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_some()
    }

    /// Elapsed time of the current note, if playing
    pub fn elapsed_ms(&self) -> Option<f64> {
        self.state.map(|s| s.elapsed_ms)
    }

    /// Trigger a note at host time `now_ms`.
    ///
    /// Starting while a note is in flight restarts: the old note is stopped
    /// (observers see the stop) and a fresh one begins.
    pub fn start(&mut self, now_ms: f64) {
        if self.state.is_some() {
            tracing::debug!(now_ms, "envelope playback restarted");
            self.finish();
        } else {
            tracing::debug!(now_ms, "envelope playback started");
        }

        self.state = Some(PlaybackState::started());
        self.start_timestamp_ms = now_ms;
        self.observer.on_playback_start();
        self.pending = Some(self.scheduler.request_tick());
    }

    /// Trigger release (note-off) at host time `now_ms`.
    ///
    /// Returns whether a release happened; no-op when idle or already
    /// releasing.
    pub fn release(&mut self, now_ms: f64, params: &EnvelopeParams) -> bool {
        match self.state {
            Some(state) if !state.released() => {
                let elapsed_ms = self.elapsed_at(now_ms);
                let state = state.release_at(elapsed_ms, params);
                tracing::debug!(
                    elapsed_ms,
                    value = state.release.map(|r| r.start_value).unwrap_or(0.0),
                    "envelope released"
                );
                self.state = Some(state);
                true
            }
            _ => false,
        }
    }

    /// Interrupt playback from any state. Idempotent.
    pub fn stop(&mut self) {
        if self.state.is_none() {
            return;
        }
        tracing::debug!("envelope playback stopped");
        self.finish();
    }

    /// Deliver the frame identified by `handle` at host time `now_ms`.
    ///
    /// Frames for handles that are not the outstanding request are ignored.
    pub fn on_tick(&mut self, handle: TickHandle, now_ms: f64, params: &EnvelopeParams) {
        if self.pending != Some(handle) {
            tracing::trace!(?handle, "ignoring stale frame");
            return;
        }
        self.pending = None;

        let Some(state) = self.state else {
            return;
        };

        let elapsed_ms = self.elapsed_at(now_ms);
        match state.advance(elapsed_ms, params, &self.config) {
            Step::Completed => {
                tracing::debug!(elapsed_ms, "envelope playback completed");
                self.state = Some(PlaybackState { elapsed_ms, ..state });
                self.finish();
            }
            Step::Released { state, sample } => {
                tracing::debug!(elapsed_ms, value = sample.value, "envelope auto-released");
                self.emit(state, sample);
            }
            Step::Sample { state, sample } => {
                self.emit(state, sample);
            }
        }
    }

    fn elapsed_at(&self, now_ms: f64) -> f64 {
        (now_ms - self.start_timestamp_ms).max(0.0)
    }

    fn emit(&mut self, state: PlaybackState, sample: SamplePoint) {
        self.state = Some(state);
        self.observer.on_sample(sample);
        self.pending = Some(self.scheduler.request_tick());
    }

    /// Cancel the outstanding frame, return to Idle and emit the final zero
    fn finish(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_tick(handle);
        }
        if let Some(state) = self.state.take() {
            self.observer
                .on_sample(SamplePoint::new(state.elapsed_ms, 0.0));
            self.observer.on_playback_stop();
        }
    }
}

impl<O: PlaybackObserver> EnvelopePlayer<ManualScheduler, O> {
    /// Deliver the outstanding frame, if any, at `now_ms`.
    ///
    /// Returns whether a frame was delivered.
    pub fn advance_frame(&mut self, now_ms: f64, params: &EnvelopeParams) -> bool {
        match self.scheduler.take_pending() {
            Some(handle) => {
                self.on_tick(handle, now_ms, params);
                true
            }
            None => false,
        }
    }
}

// =============================================================================
// Offline Rendering
// =============================================================================

/// Upper bound on frames rendered by [`render_playback`]
pub const MAX_OFFLINE_FRAMES: usize = 1 << 20;

/// Run a complete note offline and collect every emitted sample.
///
/// Frames arrive every `frame_ms` (clamped to at least 1ms) starting at
/// time 0. With `release_at_ms` the note is released explicitly at the first
/// frame at or after that time; otherwise it auto-releases after the
/// sustain hold. The final sample is always the closing zero.
pub fn render_playback(
    params: &EnvelopeParams,
    config: &PlaybackConfig,
    frame_ms: f64,
    release_at_ms: Option<f64>,
) -> Vec<SamplePoint> {
    let frame_ms = if frame_ms.is_finite() { frame_ms.max(1.0) } else { 1.0 };
    let mut samples = Vec::new();
    let mut player = EnvelopePlayer::with_config(
        ManualScheduler::new(),
        |s: SamplePoint| samples.push(s),
        *config,
    );

    player.start(0.0);
    let mut frames = 0usize;
    while player.is_playing() && frames < MAX_OFFLINE_FRAMES {
        let now_ms = frames as f64 * frame_ms;
        if let Some(at) = release_at_ms {
            if now_ms >= at {
                player.release(now_ms, params);
            }
        }
        if !player.advance_frame(now_ms, params) {
            break;
        }
        frames += 1;
    }
    player.stop();
    drop(player);

    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{EventBuffer, PlaybackEvent};
    use approx::assert_abs_diff_eq;

    fn scenario() -> EnvelopeParams {
        EnvelopeParams::new(10.0, 120.0, 0.75, 250.0)
    }

    fn player() -> EnvelopePlayer<ManualScheduler, EventBuffer> {
        EnvelopePlayer::new(ManualScheduler::new(), EventBuffer::new())
    }

    // State transitions

    #[test]
    fn test_advance_emits_model_value() {
        let config = PlaybackConfig::default();
        match PlaybackState::started().advance(5.0, &scenario(), &config) {
            Step::Sample { state, sample } => {
                assert_eq!(state.elapsed_ms, 5.0);
                assert!(!state.released());
                assert_abs_diff_eq!(sample.value, 0.5, epsilon = 1e-12);
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn test_advance_auto_releases_after_hold() {
        let config = PlaybackConfig::default();
        let params = scenario();

        // Exactly at the boundary is still sustain
        let step = PlaybackState::started().advance(1130.0, &params, &config);
        assert!(matches!(step, Step::Sample { .. }));

        match PlaybackState::started().advance(1131.0, &params, &config) {
            Step::Released { state, sample } => {
                let release = state.release.unwrap();
                assert_eq!(release.start_ms, 1131.0);
                assert_eq!(release.start_value, 0.75);
                assert_eq!(sample.value, 0.75);
                assert_eq!(state.status(), PlaybackStatus::Releasing);
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn test_advance_completes_after_guard() {
        let config = PlaybackConfig::default();
        let params = scenario();
        let state = PlaybackState::started().release_at(200.0, &params);

        // Tail ends at 450; guard extends to 550
        match state.advance(450.0, &params, &config) {
            Step::Sample { sample, .. } => assert_eq!(sample.value, 0.0),
            other => panic!("unexpected step {other:?}"),
        }
        assert!(matches!(state.advance(550.0, &params, &config), Step::Sample { .. }));
        assert_eq!(state.advance(550.5, &params, &config), Step::Completed);
    }

    #[test]
    fn test_release_at_is_idempotent() {
        let params = scenario();
        let once = PlaybackState::started().release_at(5.0, &params);
        let twice = once.release_at(100.0, &params);
        assert_eq!(once, twice);
        assert_abs_diff_eq!(once.release.unwrap().start_value, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_release_value_is_captured_not_recomputed() {
        let config = PlaybackConfig::default();
        let state = PlaybackState::started().release_at(130.0, &scenario());

        // Editing sustain afterwards does not move the captured start value
        let edited = scenario().with_sustain(0.2);
        match state.advance(130.0, &edited, &config) {
            Step::Sample { sample, .. } => assert_eq!(sample.value, 0.75),
            other => panic!("unexpected step {other:?}"),
        }
    }

    // Player lifecycle

    #[test]
    fn test_start_requests_frame() {
        let mut player = player();
        assert_eq!(player.status(), PlaybackStatus::Idle);

        player.start(1000.0);
        assert_eq!(player.status(), PlaybackStatus::Active);
        assert!(player.scheduler().has_pending());
        assert_eq!(player.observer().pending_count(), 1);
    }

    #[test]
    fn test_frames_use_time_since_start() {
        let params = scenario();
        let mut player = player();
        player.start(1000.0);

        assert!(player.advance_frame(1005.0, &params));
        assert!(player.advance_frame(1070.0, &params));
        assert_eq!(player.elapsed_ms(), Some(70.0));

        let samples = player.observer_mut().drain_samples();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].time_ms, 5.0);
        assert_abs_diff_eq!(samples[0].value, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(samples[1].value, 0.875, epsilon = 1e-12);
    }

    #[test]
    fn test_full_cycle_returns_to_idle() {
        let params = scenario();
        let mut player = player();
        player.start(0.0);

        let mut now = 0.0;
        while player.advance_frame(now, &params) {
            now += 16.0;
        }

        assert_eq!(player.status(), PlaybackStatus::Idle);
        assert!(!player.scheduler().has_pending());

        let events = player.observer_mut().drain_events();
        assert_eq!(events.first(), Some(&PlaybackEvent::Started));
        assert_eq!(events.last(), Some(&PlaybackEvent::Stopped));
        let final_sample = events[events.len() - 2].sample().unwrap();
        assert_eq!(final_sample.value, 0.0);

        // 1130 hold boundary + 250 release + 100 guard
        assert!(final_sample.time_ms > 1480.0);
        assert!(final_sample.time_ms <= 1131.0 + 16.0 + 350.0 + 16.0);
    }

    #[test]
    fn test_manual_release() {
        let params = scenario();
        let mut player = player();
        player.start(0.0);
        player.advance_frame(0.0, &params);
        player.advance_frame(5.0, &params);

        assert!(player.release(5.0, &params));
        assert_eq!(player.status(), PlaybackStatus::Releasing);
        assert!(!player.release(50.0, &params));

        player.advance_frame(130.0, &params);
        let last = player.observer_mut().drain_samples().pop().unwrap();
        assert_abs_diff_eq!(last.value, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_release_when_idle_is_noop() {
        let mut player = player();
        assert!(!player.release(10.0, &scenario()));
        assert_eq!(player.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn test_stop_cancels_and_emits_zero() {
        let params = scenario();
        let mut player = player();
        player.start(0.0);
        player.advance_frame(50.0, &params);
        player.stop();

        assert_eq!(player.status(), PlaybackStatus::Idle);
        assert!(!player.scheduler().has_pending());
        assert_eq!(player.scheduler().cancelled_count(), 1);
        assert_eq!(player.observer().last_value(), 0.0);

        let events = player.observer_mut().drain_events();
        assert_eq!(events.last(), Some(&PlaybackEvent::Stopped));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut player = player();
        player.stop();
        assert_eq!(player.observer().pending_count(), 0);

        player.start(0.0);
        player.stop();
        let count = player.observer().pending_count();
        player.stop();
        assert_eq!(player.observer().pending_count(), count);
    }

    #[test]
    fn test_stale_frame_ignored() {
        let params = scenario();
        let mut player = player();
        player.start(0.0);
        let stale = player.scheduler().pending().unwrap();
        player.start(100.0);

        let before = player.observer().pending_count();
        player.on_tick(stale, 150.0, &params);
        assert_eq!(player.observer().pending_count(), before);
        assert!(player.scheduler().has_pending());
    }

    #[test]
    fn test_restart_stops_previous_note() {
        let params = scenario();
        let mut player = player();
        player.start(0.0);
        player.advance_frame(60.0, &params);
        player.release(60.0, &params);
        player.start(200.0);

        assert_eq!(player.status(), PlaybackStatus::Active);
        assert_eq!(player.elapsed_ms(), Some(0.0));

        let events = player.observer_mut().drain_events();
        let kinds: Vec<_> = events
            .iter()
            .map(|e| match e {
                PlaybackEvent::Started => 's',
                PlaybackEvent::Sample { .. } => 'v',
                PlaybackEvent::Stopped => 'x',
            })
            .collect();
        assert_eq!(kinds, ['s', 'v', 'v', 'x', 's']);

        player.advance_frame(205.0, &params);
        let sample = player.observer_mut().drain_samples()[0];
        assert_eq!(sample.time_ms, 5.0);
    }

    #[test]
    fn test_params_read_each_frame() {
        let mut player = player();
        player.start(0.0);
        player.advance_frame(500.0, &scenario());
        player.advance_frame(600.0, &scenario().with_sustain(0.3));

        let samples = player.observer_mut().drain_samples();
        assert_eq!(samples[0].value, 0.75);
        assert_eq!(samples[1].value, 0.3);
    }

    #[test]
    fn test_clock_going_backwards_clamps_to_zero() {
        let mut player = player();
        player.start(100.0);
        player.advance_frame(90.0, &scenario());
        let sample = player.observer_mut().drain_samples()[0];
        assert_eq!(sample.time_ms, 0.0);
        assert_eq!(sample.value, 0.0);
    }

    // Offline rendering

    #[test]
    fn test_render_playback_auto_release() {
        let params = scenario();
        let config = PlaybackConfig::default().with_sustain_hold(200.0);
        let samples = render_playback(&params, &config, 10.0, None);

        assert_eq!(samples[0], SamplePoint::new(0.0, 0.0));
        assert_abs_diff_eq!(samples[1].value, 1.0, epsilon = 1e-12);
        assert_eq!(samples.last().unwrap().value, 0.0);

        // Sustain held until 330, released at the 340 frame
        let sustain = samples.iter().find(|s| s.time_ms == 330.0).unwrap();
        assert_eq!(sustain.value, 0.75);
        let released = samples.iter().find(|s| s.time_ms == 340.0).unwrap();
        assert_eq!(released.value, 0.75);
        let mid = samples.iter().find(|s| s.time_ms == 465.0);
        assert!(mid.is_none());
        let mid = samples.iter().find(|s| s.time_ms == 460.0).unwrap();
        assert_abs_diff_eq!(mid.value, 0.75 * (1.0 - 120.0 / 250.0), epsilon = 1e-12);

        for s in &samples {
            assert!((0.0..=1.0).contains(&s.value));
        }
    }

    #[test]
    fn test_render_playback_early_release() {
        let params = scenario();
        let samples = render_playback(&params, &PlaybackConfig::default(), 5.0, Some(5.0));

        let at_release = samples.iter().find(|s| s.time_ms == 5.0).unwrap();
        assert_abs_diff_eq!(at_release.value, 0.5, epsilon = 1e-12);
        let later = samples.iter().find(|s| s.time_ms == 130.0).unwrap();
        assert_abs_diff_eq!(later.value, 0.25, epsilon = 1e-12);

        // Ends well before the auto-release point
        assert!(samples.last().unwrap().time_ms < 400.0);
    }
}
