//! Frame Scheduling
//!
//! The playback loop never talks to a display clock directly. It asks a
//! [`Scheduler`] for the next frame and gets a [`TickHandle`] back; the host
//! later delivers that frame by calling
//! [`EnvelopePlayer::on_tick`](crate::playback::EnvelopePlayer::on_tick)
//! with the handle and the frame timestamp.
//!
//! In a browser the host maps requests onto its animation-frame callback.
//! Tests and offline rendering use [`ManualScheduler`], which only records
//! what was asked of it.

use serde::{Deserialize, Serialize};

/// Identifies one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TickHandle(pub u64);

/// A continuous-repaint scheduling primitive
pub trait Scheduler {
    /// Ask for one more frame callback
    fn request_tick(&mut self) -> TickHandle;

    /// Withdraw a request. Cancelling an unknown or delivered handle is a no-op.
    fn cancel_tick(&mut self, handle: TickHandle);
}

impl<S: Scheduler + ?Sized> Scheduler for &mut S {
    fn request_tick(&mut self) -> TickHandle {
        (**self).request_tick()
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        (**self).cancel_tick(handle)
    }
}

/// Deterministic scheduler driven by hand
///
/// Keeps at most one outstanding request, mirroring a one-shot
/// animation-frame callback.
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<TickHandle>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The outstanding request, if any
    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    /// Take the outstanding request so it can be delivered
    pub fn take_pending(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }

    /// Whether a frame has been requested and not yet delivered or cancelled
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Total number of requests made
    pub fn requested_count(&self) -> u64 {
        self.requested
    }

    /// Number of requests cancelled before delivery
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }
}

impl Scheduler for ManualScheduler {
    fn request_tick(&mut self) -> TickHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = TickHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}
