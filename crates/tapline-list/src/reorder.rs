#![forbid(unsafe_code)]

//! Drag-to-reorder sensor that cooperates with the gesture engine.
//!
//! The sensor watches the same pointer stream as the gesture tracker (fed
//! after it) and decides on its own when a press becomes a reorder drag.
//! It reads the shared [`InteractionArbiter`] on every move while a press
//! is pending:
//!
//! - claimed as a swipe: yield for the rest of the session,
//! - claimed as a drag: activate once moved at least the activation distance,
//! - unclaimed within the activation delay: wait; leaving the tolerance
//!   radius during the delay means only a drag claim can activate it,
//! - unclaimed after the delay: activate at the activation distance.
//!
//! An active drag that sees a swipe claim ends immediately with no
//! destination. Presses on empty space never arm the sensor.
//!
//! Item indices are visual: registered elements ordered by their top edge.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tapline_core::{
    ElementId, ElementRegistry, GestureIntent, Instant, InteractionArbiter, Offset, Point,
    PointerEvent, PointerEventKind, PointerId, Subscription,
};
use tracing::{debug, trace};

/// Activation constraint for reorder drags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReorderConfig {
    /// Movement (px, Euclidean) needed to start a drag (default: 3).
    pub activation_distance: f64,
    /// Radius (px) a press may drift during the delay and keep its own
    /// activation path (default: 5).
    pub tolerance: f64,
    /// Hold before an unclaimed press may activate on its own (default: 120ms).
    pub activation_delay: Duration,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            activation_distance: 3.0,
            tolerance: 5.0,
            activation_delay: Duration::from_millis(120),
        }
    }
}

impl ReorderConfig {
    /// Returns a list of problems; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.activation_distance.is_finite() || self.activation_distance < 0.0 {
            errors.push(format!(
                "reorder.activation_distance must be >= 0, got {}",
                self.activation_distance
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            errors.push(format!(
                "reorder.tolerance must be >= 0, got {}",
                self.tolerance
            ));
        }
        errors
    }
}

/// Lifecycle notification for a reorder drag.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum ReorderEvent {
    Start {
        id: ElementId,
        from: usize,
    },
    /// `offset` is the pointer delta from the press.
    Move {
        id: ElementId,
        from: usize,
        offset: Offset,
    },
    /// `to` is `None` when dropped on empty space, on the item itself, or
    /// when the drag was cancelled.
    End {
        id: ElementId,
        from: usize,
        to: Option<usize>,
    },
}

impl ReorderEvent {
    #[must_use]
    pub fn id(&self) -> &ElementId {
        match self {
            Self::Start { id, .. } | Self::Move { id, .. } | Self::End { id, .. } => id,
        }
    }
}

/// Snapshot of the sensor for renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    pub is_dragging: bool,
    pub active_id: Option<ElementId>,
}

#[derive(Debug, Clone)]
struct Press {
    pointer_id: PointerId,
    id: ElementId,
    from: usize,
    origin: Point,
    pressed_at: Instant,
    left_tolerance: bool,
}

#[derive(Debug, Clone)]
enum SensorPhase {
    Idle,
    Pending(Press),
    Active(Press),
    /// Session owned by a swipe; wait for the pointer to lift.
    Yielded(PointerId),
}

type ReorderListener = dyn Fn(&ReorderEvent);

/// Pointer sensor deciding when a press becomes a reorder drag.
pub struct ReorderSensor {
    config: ReorderConfig,
    arbiter: InteractionArbiter,
    phase: SensorPhase,
    listeners: Rc<RefCell<Vec<Weak<ReorderListener>>>>,
}

impl fmt::Debug for ReorderSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReorderSensor")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl ReorderSensor {
    /// `arbiter` must be the same handle the gesture tracker writes.
    #[must_use]
    pub fn new(config: ReorderConfig, arbiter: InteractionArbiter) -> Self {
        Self {
            config,
            arbiter,
            phase: SensorPhase::Idle,
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register a listener for reorder events. Delivery stops when the
    /// returned guard is dropped.
    pub fn subscribe(&self, listener: impl Fn(&ReorderEvent) + 'static) -> Subscription {
        let strong: Rc<ReorderListener> = Rc::new(listener);
        self.listeners.borrow_mut().push(Rc::downgrade(&strong));
        Subscription::from_guard(strong)
    }

    #[must_use]
    pub fn drag_state(&self) -> DragState {
        match &self.phase {
            SensorPhase::Active(press) => DragState {
                is_dragging: true,
                active_id: Some(press.id.clone()),
            },
            _ => DragState::default(),
        }
    }

    #[must_use]
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self.phase, SensorPhase::Pending(_))
    }

    #[must_use]
    #[inline]
    pub fn config(&self) -> &ReorderConfig {
        &self.config
    }

    /// Feed one pointer event. Call after the gesture engine handled it.
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        registry: &ElementRegistry,
        now: Instant,
    ) -> Vec<ReorderEvent> {
        let mut out = Vec::new();
        match event.kind {
            PointerEventKind::Down => self.on_down(event, registry, now),
            PointerEventKind::Move => self.on_move(event, now, &mut out),
            PointerEventKind::Up => self.on_release(event, Some(registry), &mut out),
            PointerEventKind::Cancel => self.on_release(event, None, &mut out),
        }
        for event in &out {
            self.notify(event);
        }
        out
    }

    /// Abort any press or drag. An active drag ends with no destination.
    pub fn cancel(&mut self) -> Option<ReorderEvent> {
        let phase = std::mem::replace(&mut self.phase, SensorPhase::Idle);
        let SensorPhase::Active(press) = phase else {
            return None;
        };
        let end = ReorderEvent::End {
            id: press.id,
            from: press.from,
            to: None,
        };
        self.notify(&end);
        Some(end)
    }

    fn on_down(&mut self, event: &PointerEvent, registry: &ElementRegistry, now: Instant) {
        if !matches!(self.phase, SensorPhase::Idle) {
            return;
        }
        let Some(id) = registry.hit_test(event.position) else {
            return;
        };
        let Some(from) = visual_index(registry, &id) else {
            return;
        };
        trace!(element = %id, from, "reorder press armed");
        self.phase = SensorPhase::Pending(Press {
            pointer_id: event.pointer_id,
            id,
            from,
            origin: event.position,
            pressed_at: now,
            left_tolerance: false,
        });
    }

    fn on_move(&mut self, event: &PointerEvent, now: Instant, out: &mut Vec<ReorderEvent>) {
        let intent = self.arbiter.current_intent();
        match &mut self.phase {
            SensorPhase::Pending(press) if press.pointer_id == event.pointer_id => {
                let distance = event.position.offset_from(press.origin).length();
                let activate = match intent {
                    Some(GestureIntent::Swipe) => {
                        debug!(element = %press.id, "reorder yields to swipe");
                        self.phase = SensorPhase::Yielded(event.pointer_id);
                        return;
                    }
                    Some(GestureIntent::Drag) => distance >= self.config.activation_distance,
                    None => {
                        let held = now.saturating_duration_since(press.pressed_at);
                        if held < self.config.activation_delay {
                            if distance > self.config.tolerance {
                                press.left_tolerance = true;
                            }
                            false
                        } else {
                            !press.left_tolerance && distance >= self.config.activation_distance
                        }
                    }
                };
                if activate {
                    let press = press.clone();
                    debug!(element = %press.id, from = press.from, ?intent, "reorder drag started");
                    out.push(ReorderEvent::Start {
                        id: press.id.clone(),
                        from: press.from,
                    });
                    self.phase = SensorPhase::Active(press);
                }
            }
            SensorPhase::Active(press) if press.pointer_id == event.pointer_id => {
                if intent == Some(GestureIntent::Swipe) {
                    debug!(element = %press.id, "reorder drag aborted by swipe");
                    out.push(ReorderEvent::End {
                        id: press.id.clone(),
                        from: press.from,
                        to: None,
                    });
                    self.phase = SensorPhase::Yielded(event.pointer_id);
                    return;
                }
                out.push(ReorderEvent::Move {
                    id: press.id.clone(),
                    from: press.from,
                    offset: event.position.offset_from(press.origin),
                });
            }
            _ => {}
        }
    }

    /// `registry` is `None` for a cancel, which never has a destination.
    fn on_release(
        &mut self,
        event: &PointerEvent,
        registry: Option<&ElementRegistry>,
        out: &mut Vec<ReorderEvent>,
    ) {
        let owner = match &self.phase {
            SensorPhase::Idle => return,
            SensorPhase::Pending(press) | SensorPhase::Active(press) => press.pointer_id,
            SensorPhase::Yielded(pointer_id) => *pointer_id,
        };
        if owner != event.pointer_id {
            return;
        }

        let phase = std::mem::replace(&mut self.phase, SensorPhase::Idle);
        if let SensorPhase::Active(press) = phase {
            let to = registry
                .and_then(|registry| {
                    registry
                        .hit_test(event.position)
                        .and_then(|over| visual_index(registry, &over))
                })
                .filter(|&to| to != press.from);
            debug!(element = %press.id, from = press.from, ?to, "reorder drag ended");
            out.push(ReorderEvent::End {
                id: press.id,
                from: press.from,
                to,
            });
        }
    }

    fn notify(&self, event: &ReorderEvent) {
        let snapshot: Vec<Rc<ReorderListener>> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|w| w.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in &snapshot {
            listener(event);
        }
    }
}

/// Position of `id` among registered elements ordered top to bottom.
///
/// Elements without current bounds are skipped. Ties keep registration order.
#[must_use]
pub fn visual_index(registry: &ElementRegistry, id: &ElementId) -> Option<usize> {
    visual_order(registry).iter().position(|candidate| candidate == id)
}

/// Registered elements with bounds, ordered by top edge.
#[must_use]
pub fn visual_order(registry: &ElementRegistry) -> Vec<ElementId> {
    let mut placed: Vec<(f64, ElementId)> = registry
        .ids()
        .filter_map(|id| registry.bounds(id).map(|rect| (rect.y, id.clone())))
        .collect();
    placed.sort_by(|a, b| a.0.total_cmp(&b.0));
    placed.into_iter().map(|(_, id)| id).collect()
}
