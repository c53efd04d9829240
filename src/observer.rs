//! Playback Observation
//!
//! This module provides the callback side of the playback loop: the
//! [`PlaybackObserver`] trait the loop reports to, a [`Fanout`] for feeding
//! two observers at once, and an [`EventBuffer`] that queues events for a
//! host that polls (such as the WASM bindings).

use crate::model::SamplePoint;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

// =============================================================================
// Observer Trait
// =============================================================================

/// Receives samples and lifecycle notifications from the playback loop
pub trait PlaybackObserver {
    /// Called once per delivered frame, and once with value 0 when
    /// playback ends
    fn on_sample(&mut self, sample: SamplePoint);

    /// Playback left Idle
    fn on_playback_start(&mut self) {}

    /// Playback returned to Idle, by completion or by `stop()`
    fn on_playback_stop(&mut self) {}
}

impl<F> PlaybackObserver for F
where
    F: FnMut(SamplePoint),
{
    fn on_sample(&mut self, sample: SamplePoint) {
        self(sample)
    }
}

/// Sends every notification to two observers, first `a` then `b`
#[derive(Debug, Default, Clone)]
pub struct Fanout<A, B> {
    pub a: A,
    pub b: B,
}

impl<A, B> Fanout<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }

    pub fn into_inner(self) -> (A, B) {
        (self.a, self.b)
    }
}

impl<A: PlaybackObserver, B: PlaybackObserver> PlaybackObserver for Fanout<A, B> {
    fn on_sample(&mut self, sample: SamplePoint) {
        self.a.on_sample(sample);
        self.b.on_sample(sample);
    }

    fn on_playback_start(&mut self) {
        self.a.on_playback_start();
        self.b.on_playback_start();
    }

    fn on_playback_stop(&mut self) {
        self.a.on_playback_stop();
        self.b.on_playback_stop();
    }
}

// =============================================================================
// Queued Events
// =============================================================================

/// Events queued for a polling host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "wasm", derive(tsify::Tsify))]
#[cfg_attr(feature = "wasm", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum PlaybackEvent {
    Started,
    Sample {
        #[serde(rename = "timeMs")]
        time_ms: f64,
        value: f64,
    },
    Stopped,
}

impl PlaybackEvent {
    /// The sample carried by this event, if any
    pub fn sample(&self) -> Option<SamplePoint> {
        match self {
            PlaybackEvent::Sample { time_ms, value } => Some(SamplePoint::new(*time_ms, *value)),
            _ => None,
        }
    }
}

/// Configuration for the event buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// Maximum queued events before the oldest are dropped (default: 1000)
    pub max_pending_events: usize,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            max_pending_events: 1000,
        }
    }
}

/// Queues playback events until the host drains them
#[derive(Debug, Default)]
pub struct EventBuffer {
    pending: VecDeque<PlaybackEvent>,
    last_value: f64,
    dropped: usize,
    config: ObserverConfig,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::with_config(ObserverConfig::default())
    }

    pub fn with_config(config: ObserverConfig) -> Self {
        Self {
            pending: VecDeque::new(),
            last_value: 0.0,
            dropped: 0,
            config,
        }
    }

    fn push(&mut self, event: PlaybackEvent) {
        self.pending.push_back(event);
        while self.pending.len() > self.config.max_pending_events {
            self.pending.pop_front();
            self.dropped += 1;
        }
    }

    /// Drain all queued events, oldest first
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.pending.drain(..).collect()
    }

    /// Drain only the samples, discarding lifecycle events
    pub fn drain_samples(&mut self) -> Vec<SamplePoint> {
        self.pending.drain(..).filter_map(|e| e.sample()).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Most recent value seen, 0 before the first sample
    pub fn last_value(&self) -> f64 {
        self.last_value
    }

    /// Events discarded because the queue was full
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl PlaybackObserver for EventBuffer {
    fn on_sample(&mut self, sample: SamplePoint) {
        self.last_value = sample.value;
        self.push(PlaybackEvent::Sample {
            time_ms: sample.time_ms,
            value: sample.value,
        });
    }

    fn on_playback_start(&mut self) {
        self.push(PlaybackEvent::Started);
    }

    fn on_playback_stop(&mut self) {
        self.push(PlaybackEvent::Stopped);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        {
            let mut observer = |s: SamplePoint| seen.push(s.value);
            observer.on_sample(SamplePoint::new(0.0, 0.25));
            observer.on_playback_start();
            observer.on_sample(SamplePoint::new(16.0, 0.5));
        }
        assert_eq!(seen, vec![0.25, 0.5]);
    }

    #[test]
    fn test_fanout_feeds_both() {
        let mut fanout = Fanout::new(EventBuffer::new(), EventBuffer::new());
        fanout.on_playback_start();
        fanout.on_sample(SamplePoint::new(1.0, 0.1));
        fanout.on_playback_stop();

        let (mut a, mut b) = fanout.into_inner();
        assert_eq!(a.drain_events(), b.drain_events());
    }

    #[test]
    fn test_event_buffer_order() {
        let mut buffer = EventBuffer::new();
        buffer.on_playback_start();
        buffer.on_sample(SamplePoint::new(0.0, 0.0));
        buffer.on_sample(SamplePoint::new(16.0, 0.8));
        buffer.on_playback_stop();

        assert_eq!(buffer.pending_count(), 4);
        assert_eq!(buffer.last_value(), 0.8);

        let events = buffer.drain_events();
        assert_eq!(events[0], PlaybackEvent::Started);
        assert_eq!(
            events[2],
            PlaybackEvent::Sample {
                time_ms: 16.0,
                value: 0.8
            }
        );
        assert_eq!(events[3], PlaybackEvent::Stopped);
        assert_eq!(buffer.pending_count(), 0);
    }

    #[test]
    fn test_drain_samples_skips_lifecycle() {
        let mut buffer = EventBuffer::new();
        buffer.on_playback_start();
        buffer.on_sample(SamplePoint::new(4.0, 0.4));
        buffer.on_playback_stop();

        let samples = buffer.drain_samples();
        assert_eq!(samples, vec![SamplePoint::new(4.0, 0.4)]);
        assert_eq!(buffer.pending_count(), 0);
    }

    #[test]
    fn test_event_buffer_drops_oldest() {
        let mut buffer = EventBuffer::with_config(ObserverConfig {
            max_pending_events: 3,
        });
        for i in 0..5 {
            buffer.on_sample(SamplePoint::new(i as f64, 0.0));
        }
        assert_eq!(buffer.pending_count(), 3);
        assert_eq!(buffer.dropped_count(), 2);

        let samples = buffer.drain_samples();
        assert_eq!(samples[0].time_ms, 2.0);
    }

    #[test]
    fn test_event_serialization() {
        let event = PlaybackEvent::Sample {
            time_ms: 16.5,
            value: 0.5,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"sample\""));
        assert!(json.contains("\"timeMs\":16.5"));

        let parsed: PlaybackEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);

        let json = serde_json::to_string(&PlaybackEvent::Started).unwrap();
        assert_eq!(json, "{\"type\":\"started\"}");
    }
}
