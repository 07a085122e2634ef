#![forbid(unsafe_code)]

//! Pointer session tracking: classifies raw pointer streams into gestures.
//!
//! [`PointerSessionTracker`] owns at most one in-flight pointer session and
//! resolves it into exactly one gesture family. Resolved [`GestureAction`]s
//! are dispatched on the injected [`GestureEventBus`]; resolution of a swipe
//! or drag is also published on the injected [`InteractionArbiter`] so an
//! independent drag/reorder subsystem can yield or follow.
//!
//! # State Machine
//!
//! ```text
//! Idle --down--> Tracking --|dx| > T--> Swipe --up/cancel--> Idle
//!                    |  \---|dy| > T--> Drag  --up/cancel--> Idle
//!                    |
//!                    +--up/cancel--> Idle   (tap / double-tap / nothing)
//! ```
//!
//! Long-press is a side signal: the timer armed on pointer-down fires while
//! the session is still `Tracking` and does not end the session.
//!
//! # Invariants
//!
//! 1. At most one session is tracking at any instant.
//! 2. A session resolves at most once; the horizontal axis is checked first,
//!    so horizontal motion wins ties.
//! 3. A completed session emits at most one terminal action (`SwipeEnd`,
//!    `DragEnd`, `Tap` or `DoubleTap`). Resolved sessions always emit one;
//!    unresolved sessions emit one iff they qualify as a tap.
//! 4. Move and end payloads are raw signed deltas from the session start.
//! 5. The long-press timer is cancelled on every exit path: slop movement,
//!    pointer-up, pointer-cancel and [`teardown`](PointerSessionTracker::teardown).
//! 6. The arbiter is claimed only on resolution and cleared when the session
//!    ends.
//!
//! # Time
//!
//! Timestamps are supplied by the caller. [`process`](PointerSessionTracker::process)
//! fires an overdue long-press before handling the event, so the outcome
//! does not depend on how often the host calls
//! [`check_long_press`](PointerSessionTracker::check_long_press).
//!
//! # Failure Modes
//!
//! Abnormal input is never an error. A second pointer-down while tracking,
//! an up/move without a session, and events from a pointer other than the
//! tracked one are reported as [`TrackerOutcome::Ignored`] and change
//! nothing.

use std::time::Duration;

use tracing::debug;
use web_time::Instant;

use crate::action::{GestureAction, GestureIntent, SwipeDirection};
use crate::arbiter::InteractionArbiter;
use crate::bus::GestureEventBus;
use crate::config::GestureConfig;
use crate::event::{ElementId, PointerEvent, PointerEventKind, PointerId};
use crate::geometry::{Offset, Point};
use crate::registry::ElementRegistry;
use crate::timer::CancellableTimer;

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

/// One pointer-down to pointer-up interaction.
#[derive(Debug, Clone)]
struct PointerSession {
    pointer_id: PointerId,
    start_point: Point,
    current_point: Point,
    start_time: Instant,
    active_element_id: Option<ElementId>,
    resolved: Option<GestureIntent>,
}

/// Last single tap, kept across sessions to pair double-taps.
#[derive(Debug, Clone)]
struct TapMemory {
    time: Instant,
    element_id: Option<ElementId>,
}

// ---------------------------------------------------------------------------
// Dispatch results
// ---------------------------------------------------------------------------

/// Observable phase of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    /// Pointer is down and the session has not resolved yet.
    Tracking,
    Swipe,
    Drag,
}

/// Deterministic reason why an incoming pointer event was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    /// Pointer-down while another session is tracking.
    ActiveSessionInProgress,
    /// Move, up or cancel without a tracking session.
    NoActiveSession,
    /// Event from a pointer other than the one being tracked.
    PointerMismatch,
}

/// Outcome category for one processed pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerOutcome {
    SessionStarted,
    SessionUpdated,
    SessionEnded,
    Ignored(IgnoredReason),
}

/// Result of processing one pointer event.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerDispatch {
    /// Actions dispatched on the bus during this call, in order.
    pub actions: Vec<GestureAction>,
    pub outcome: TrackerOutcome,
}

impl TrackerDispatch {
    fn ignored(reason: IgnoredReason, actions: Vec<GestureAction>) -> Self {
        Self {
            actions,
            outcome: TrackerOutcome::Ignored(reason),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self.outcome, TrackerOutcome::Ignored(_))
    }
}

// ---------------------------------------------------------------------------
// PointerSessionTracker
// ---------------------------------------------------------------------------

/// Single-pointer gesture state machine.
///
/// Call [`process`](Self::process) for each pointer event and
/// [`check_long_press`](Self::check_long_press) on every host tick (use
/// [`next_deadline`](Self::next_deadline) to size the wait).
pub struct PointerSessionTracker {
    config: GestureConfig,
    bus: GestureEventBus,
    arbiter: InteractionArbiter,
    session: Option<PointerSession>,
    long_press: CancellableTimer,
    last_tap: Option<TapMemory>,
}

impl std::fmt::Debug for PointerSessionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerSessionTracker")
            .field("phase", &self.phase())
            .field("long_press_pending", &self.long_press.is_pending())
            .finish()
    }
}

impl PointerSessionTracker {
    /// Create an idle tracker that publishes on `bus` and claims `arbiter`.
    #[must_use]
    pub fn new(config: GestureConfig, bus: GestureEventBus, arbiter: InteractionArbiter) -> Self {
        Self {
            config,
            bus,
            arbiter,
            session: None,
            long_press: CancellableTimer::new(),
            last_tap: None,
        }
    }

    /// Process one pointer event, hit-testing pointer-downs against `registry`.
    pub fn process(
        &mut self,
        event: &PointerEvent,
        registry: &ElementRegistry,
        now: Instant,
    ) -> TrackerDispatch {
        let mut out = Vec::with_capacity(2);

        // An overdue long-press happened before this event.
        if let Some(action) = self.check_long_press(now) {
            out.push(action);
        }

        match event.kind {
            PointerEventKind::Down => self.on_pointer_down(event, registry, now, out),
            PointerEventKind::Move => self.on_pointer_move(event, out),
            PointerEventKind::Up | PointerEventKind::Cancel => {
                self.on_pointer_up(event, now, out)
            }
        }
    }

    /// Fire the long-press if its deadline has passed. Call on every tick.
    ///
    /// Returns the dispatched action. Fires at most once per session, and
    /// only while the session is still unresolved.
    pub fn check_long_press(&mut self, now: Instant) -> Option<GestureAction> {
        if !self.long_press.fire_if_due(now) {
            return None;
        }
        let session = self.session.as_ref()?;
        if session.resolved.is_some() {
            return None;
        }
        let action = GestureAction::LongPress {
            element_id: session.active_element_id.clone(),
            point: session.current_point,
        };
        debug!(element = ?session.active_element_id, "long press");
        self.emit(action.clone());
        Some(action)
    }

    /// Earliest instant at which [`check_long_press`](Self::check_long_press)
    /// can produce an action.
    #[inline]
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.long_press.deadline()
    }

    /// Time left before a pending long-press is due, saturating at zero.
    #[inline]
    #[must_use]
    pub fn long_press_remaining(&self, now: Instant) -> Option<Duration> {
        self.long_press.remaining(now)
    }

    /// Abort the current session without emitting anything.
    ///
    /// Cancels the long-press timer and clears the arbiter. Double-tap memory
    /// is kept. Returns `true` if a session was active.
    pub fn teardown(&mut self) -> bool {
        self.long_press.cancel();
        let had_session = self.session.take().is_some();
        self.arbiter.clear();
        if had_session {
            debug!("session torn down");
        }
        had_session
    }

    /// Reset everything, including double-tap memory.
    pub fn reset(&mut self) {
        self.teardown();
        self.last_tap = None;
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match self.session.as_ref().map(|s| s.resolved) {
            None => SessionPhase::Idle,
            Some(None) => SessionPhase::Tracking,
            Some(Some(GestureIntent::Swipe)) => SessionPhase::Swipe,
            Some(Some(GestureIntent::Drag)) => SessionPhase::Drag,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.session.is_some()
    }

    /// Pointer owned by the current session.
    #[must_use]
    pub fn active_pointer(&self) -> Option<PointerId> {
        self.session.as_ref().map(|s| s.pointer_id)
    }

    /// Element the current session started on.
    #[must_use]
    pub fn active_element(&self) -> Option<&ElementId> {
        self.session
            .as_ref()
            .and_then(|s| s.active_element_id.as_ref())
    }

    #[inline]
    #[must_use]
    pub fn long_press_pending(&self) -> bool {
        self.long_press.is_pending()
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Update the configuration. Takes effect from the next pointer-down.
    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }

    #[must_use]
    pub fn bus(&self) -> &GestureEventBus {
        &self.bus
    }

    #[must_use]
    pub fn arbiter(&self) -> &InteractionArbiter {
        &self.arbiter
    }
}

// ---------------------------------------------------------------------------
// Internal event handlers
// ---------------------------------------------------------------------------

impl PointerSessionTracker {
    fn on_pointer_down(
        &mut self,
        event: &PointerEvent,
        registry: &ElementRegistry,
        now: Instant,
        out: Vec<GestureAction>,
    ) -> TrackerDispatch {
        if let Some(session) = &self.session {
            debug!(
                pointer = event.pointer_id,
                active = session.pointer_id,
                "pointer-down ignored: session in progress"
            );
            return TrackerDispatch::ignored(IgnoredReason::ActiveSessionInProgress, out);
        }

        let element_id = registry.hit_test(event.position);
        debug!(pointer = event.pointer_id, element = ?element_id, "session started");
        self.session = Some(PointerSession {
            pointer_id: event.pointer_id,
            start_point: event.position,
            current_point: event.position,
            start_time: now,
            active_element_id: element_id,
            resolved: None,
        });
        self.long_press.schedule(now, self.config.long_press_delay);

        TrackerDispatch {
            actions: out,
            outcome: TrackerOutcome::SessionStarted,
        }
    }

    fn on_pointer_move(
        &mut self,
        event: &PointerEvent,
        mut out: Vec<GestureAction>,
    ) -> TrackerDispatch {
        let mut emitted = Vec::with_capacity(2);
        let Some(session) = self.session.as_mut() else {
            return TrackerDispatch::ignored(IgnoredReason::NoActiveSession, out);
        };
        if session.pointer_id != event.pointer_id {
            return TrackerDispatch::ignored(IgnoredReason::PointerMismatch, out);
        }

        let point = event.position;
        session.current_point = point;
        let delta = point.offset_from(session.start_point);
        let (abs_x, abs_y) = delta.abs();

        if abs_x >= self.config.tap_slop || abs_y >= self.config.tap_slop {
            self.long_press.cancel();
        }

        if session.resolved.is_none() {
            let threshold = self.config.resolve_threshold;
            let resolution = if abs_x > threshold {
                Some((
                    GestureIntent::Swipe,
                    GestureAction::SwipeStart {
                        element_id: session.active_element_id.clone(),
                        point,
                        direction: SwipeDirection::from_delta(delta.x),
                    },
                ))
            } else if abs_y > threshold {
                Some((
                    GestureIntent::Drag,
                    GestureAction::DragStart {
                        element_id: session.active_element_id.clone(),
                        point,
                    },
                ))
            } else {
                None
            };

            if let Some((intent, start)) = resolution {
                session.resolved = Some(intent);
                debug!(%intent, element = ?session.active_element_id, "session resolved");
                self.long_press.cancel();
                self.arbiter
                    .claim(intent, session.active_element_id.clone());
                emitted.push(start);
            }
        }

        let update = match session.resolved {
            Some(GestureIntent::Swipe) => Some(GestureAction::SwipeMove {
                element_id: session.active_element_id.clone(),
                point,
                distance: delta.x,
            }),
            Some(GestureIntent::Drag) => Some(GestureAction::DragMove {
                element_id: session.active_element_id.clone(),
                point,
                offset: delta,
            }),
            None => None,
        };
        emitted.extend(update);

        for action in &emitted {
            self.bus.dispatch(action);
        }
        out.append(&mut emitted);
        TrackerDispatch {
            actions: out,
            outcome: TrackerOutcome::SessionUpdated,
        }
    }

    fn on_pointer_up(
        &mut self,
        event: &PointerEvent,
        now: Instant,
        mut out: Vec<GestureAction>,
    ) -> TrackerDispatch {
        let session = match self.session.take() {
            None => return TrackerDispatch::ignored(IgnoredReason::NoActiveSession, out),
            Some(session) if session.pointer_id != event.pointer_id => {
                self.session = Some(session);
                return TrackerDispatch::ignored(IgnoredReason::PointerMismatch, out);
            }
            Some(session) => session,
        };
        self.long_press.cancel();

        let point = event.position;
        let delta = point.offset_from(session.start_point);
        let elapsed = now.saturating_duration_since(session.start_time);
        let element_id = session.active_element_id;

        let terminal = match session.resolved {
            Some(GestureIntent::Swipe) => Some(GestureAction::SwipeEnd {
                element_id,
                point,
                distance: delta.x,
                velocity: swipe_velocity(delta, elapsed),
            }),
            Some(GestureIntent::Drag) => Some(GestureAction::DragEnd {
                element_id,
                point,
                offset: delta,
            }),
            None if self.is_tap(delta, elapsed) => Some(self.classify_tap(element_id, point, now)),
            None => None,
        };

        debug!(
            kind = ?terminal.as_ref().map(GestureAction::kind),
            elapsed_ms = elapsed.as_millis() as u64,
            "session ended"
        );

        // Listeners observe an idle tracker and arbiter on the terminal action.
        self.arbiter.clear();

        if let Some(action) = terminal {
            self.emit(action.clone());
            out.push(action);
        }
        TrackerDispatch {
            actions: out,
            outcome: TrackerOutcome::SessionEnded,
        }
    }

    fn is_tap(&self, delta: Offset, elapsed: Duration) -> bool {
        let (abs_x, abs_y) = delta.abs();
        elapsed < self.config.tap_timeout
            && abs_x < self.config.tap_slop
            && abs_y < self.config.tap_slop
    }

    fn classify_tap(
        &mut self,
        element_id: Option<ElementId>,
        point: Point,
        now: Instant,
    ) -> GestureAction {
        let is_double = self.last_tap.as_ref().is_some_and(|last| {
            now.saturating_duration_since(last.time) < self.config.double_tap_delay
                && last.element_id == element_id
        });

        if is_double {
            self.last_tap = None;
            GestureAction::DoubleTap { element_id, point }
        } else {
            self.last_tap = Some(TapMemory {
                time: now,
                element_id: element_id.clone(),
            });
            GestureAction::Tap { element_id, point }
        }
    }

    fn emit(&self, action: GestureAction) {
        self.bus.dispatch(&action);
    }
}

/// `|dx|` per millisecond, with the elapsed time floored at 1 ms.
fn swipe_velocity(delta: Offset, elapsed: Duration) -> f64 {
    let elapsed_ms = (elapsed.as_nanos() as f64 / 1_000_000.0).max(1.0);
    delta.x.abs() / elapsed_ms
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
