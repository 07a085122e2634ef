#![forbid(unsafe_code)]

//! Wiring facade: registry + tracker + shared bus and arbiter.
//!
//! [`GestureEngine`] is what a view layer holds. It is built once at wiring
//! time from an explicitly constructed bus and arbiter, so the same handles
//! can be passed to consumers and to the drag/reorder subsystem.

use std::time::Duration;

use web_time::Instant;

use crate::action::GestureAction;
use crate::arbiter::InteractionArbiter;
use crate::bus::{GestureEventBus, Subscription};
use crate::config::GestureConfig;
use crate::event::{ElementId, PointerEvent};
use crate::gesture::{PointerSessionTracker, SessionPhase, TrackerDispatch};
use crate::registry::{ElementRegistry, Region};

/// Gesture recognition for one container.
#[derive(Debug)]
pub struct GestureEngine {
    registry: ElementRegistry,
    tracker: PointerSessionTracker,
}

impl GestureEngine {
    /// Engine with a fresh bus and arbiter.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self::with_parts(config, GestureEventBus::new(), InteractionArbiter::new())
    }

    /// Engine publishing on an existing bus and arbiter.
    #[must_use]
    pub fn with_parts(
        config: GestureConfig,
        bus: GestureEventBus,
        arbiter: InteractionArbiter,
    ) -> Self {
        Self {
            registry: ElementRegistry::new(),
            tracker: PointerSessionTracker::new(config, bus, arbiter),
        }
    }

    /// Register geometry for `id` on mount; pass `None` on unmount.
    pub fn register_element(&mut self, id: impl Into<ElementId>, region: Option<Region>) {
        self.registry.register(id.into(), region);
    }

    /// Feed one pointer event.
    pub fn handle(&mut self, event: &PointerEvent, now: Instant) -> TrackerDispatch {
        self.tracker.process(event, &self.registry, now)
    }

    /// Fire due timers. Call on every host tick.
    pub fn poll(&mut self, now: Instant) -> Option<GestureAction> {
        self.tracker.check_long_press(now)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tracker.next_deadline()
    }

    /// How long the host may sleep before the next [`poll`](Self::poll).
    ///
    /// `None` when no timer is pending; zero when one is already due.
    #[must_use]
    pub fn poll_timeout(&self, now: Instant) -> Option<Duration> {
        self.tracker.long_press_remaining(now)
    }

    /// Abort any in-flight session silently (unbind/unmount path).
    pub fn teardown(&mut self) -> bool {
        self.tracker.teardown()
    }

    /// Subscribe to resolved gestures.
    pub fn subscribe(&self, listener: impl Fn(&GestureAction) + 'static) -> Subscription {
        self.tracker.bus().subscribe(listener)
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.tracker.phase()
    }

    #[must_use]
    pub fn bus(&self) -> &GestureEventBus {
        self.tracker.bus()
    }

    #[must_use]
    pub fn arbiter(&self) -> &InteractionArbiter {
        self.tracker.arbiter()
    }

    #[must_use]
    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    #[must_use]
    pub fn tracker(&self) -> &PointerSessionTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut PointerSessionTracker {
        &mut self.tracker
    }
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}
