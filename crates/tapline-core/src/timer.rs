#![forbid(unsafe_code)]

//! Host-driven cancellable one-shot timer.
//!
//! [`CancellableTimer`] never spawns threads or registers callbacks. The
//! owner schedules a deadline, and the host loop calls
//! [`fire_if_due`](CancellableTimer::fire_if_due) with the current time
//! (typically on every tick). A scheduled timer fires at most once; any
//! [`cancel`](CancellableTimer::cancel) before that makes it inert.
//!
//! Time is supplied by the caller, so tests and trace replay can drive the
//! timer with a synthetic clock.

use std::time::Duration;

use web_time::Instant;

/// A one-shot, revocable deadline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancellableTimer {
    deadline: Option<Instant>,
}

impl CancellableTimer {
    /// Create an idle timer.
    #[must_use]
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arm the timer to fire `delay` after `now`, replacing any pending deadline.
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    /// Disarm the timer. Returns `true` if a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Pending deadline, if any.
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline, saturating at zero.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Fire the timer if its deadline has been reached.
    ///
    /// Returns `true` exactly once per schedule; the timer is idle afterwards.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
