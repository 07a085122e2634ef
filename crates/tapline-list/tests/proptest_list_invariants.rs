//! Property-based invariant tests for the list policy and reorder sensor.
//!
//! ## Invariants
//!
//! 1. The policy never lets its item count exceed `max_items`, whatever
//!    sequence of gestures arrives.
//! 2. A session the engine resolves as a swipe before the reorder sensor
//!    activates never produces a reorder drag.
//! 3. Every reorder `Start` is followed by exactly one `End` by the time the
//!    pointer lifts.

use std::time::Duration;

use proptest::prelude::*;
use tapline_core::{
    ElementId, GestureAction, GestureEngine, Instant, Offset, Point, PointerEvent, Rect, Region,
    SwipeDirection,
};
use tapline_list::{ListCommand, ListGesturePolicy, ListPolicyConfig, ReorderConfig, ReorderEvent, ReorderSensor};

// ── Helpers ───────────────────────────────────────────────────────────────

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn rig() -> (GestureEngine, ReorderSensor) {
    let mut engine = GestureEngine::default();
    for i in 0..5 {
        engine.register_element(
            format!("row-{i}"),
            Some(Region::Fixed(Rect::new(0.0, f64::from(i) * 60.0, 320.0, 59.0))),
        );
    }
    let sensor = ReorderSensor::new(ReorderConfig::default(), engine.arbiter().clone());
    (engine, sensor)
}

// ── Strategies ────────────────────────────────────────────────────────────

fn arb_target() -> impl Strategy<Value = Option<ElementId>> {
    prop::option::of((0u8..6).prop_map(|i| ElementId::new(format!("row-{i}"))))
}

fn arb_action() -> impl Strategy<Value = GestureAction> {
    let point = Point::new(0.0, 0.0);
    (arb_target(), 0u8..6, -200i32..200).prop_map(move |(element_id, kind, d)| {
        let distance = f64::from(d);
        match kind {
            0 => GestureAction::Tap { element_id, point },
            1 => GestureAction::DoubleTap { element_id, point },
            2 => GestureAction::LongPress { element_id, point },
            3 => GestureAction::SwipeStart {
                element_id,
                point,
                direction: SwipeDirection::from_delta(distance),
            },
            4 => GestureAction::SwipeEnd {
                element_id,
                point,
                distance,
                velocity: 1.0,
            },
            _ => GestureAction::DragEnd {
                element_id,
                point,
                offset: Offset::new(0.0, distance),
            },
        }
    })
}

/// Pointer path as (dx, dy, dt_ms) steps from a press on row 1.
fn arb_path() -> impl Strategy<Value = Vec<(i32, i32, u64)>> {
    prop::collection::vec((-60i32..=60, -60i32..=60, 1u64..80), 1..8)
}

// ── 1. Item limit ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn item_count_never_exceeds_limit(
        start in 0usize..=10,
        actions in prop::collection::vec(arb_action(), 0..40),
    ) {
        let mut policy = ListGesturePolicy::new(ListPolicyConfig::default());
        policy.set_item_count(start);
        for action in &actions {
            for command in policy.handle(action) {
                if let ListCommand::LimitReached { max_items } = command {
                    prop_assert_eq!(max_items, 10);
                    prop_assert_eq!(policy.item_count(), 10);
                }
            }
            prop_assert!(policy.item_count() <= 10);
        }
    }
}

// ── 2 & 3. Sensor cooperation ─────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn sensor_respects_swipe_claims_and_closes_drags(path in arb_path(), cancel in any::<bool>()) {
        let (mut engine, mut sensor) = rig();
        let origin = Point::new(100.0, 90.0);
        let mut t = Instant::now();
        let mut events: Vec<ReorderEvent> = Vec::new();
        let mut feed = |engine: &mut GestureEngine, sensor: &mut ReorderSensor, e: PointerEvent, t: Instant| {
            engine.handle(&e, t);
            events.extend(sensor.handle(&e, engine.registry(), t));
        };

        feed(&mut engine, &mut sensor, PointerEvent::down(1, origin.x, origin.y), t);
        let mut last = origin;
        let mut swipe_before_drag = false;
        let mut started = false;
        for (dx, dy, dt) in path {
            t += ms(dt);
            last = Point::new(origin.x + f64::from(dx), origin.y + f64::from(dy));
            let before = sensor.drag_state().is_dragging;
            feed(&mut engine, &mut sensor, PointerEvent::moved(1, last.x, last.y), t);
            if !before && !started && engine.phase() == tapline_core::SessionPhase::Swipe {
                swipe_before_drag = true;
            }
            started |= sensor.drag_state().is_dragging;
        }
        t += ms(10);
        let end = if cancel {
            PointerEvent::cancel(1, last.x, last.y)
        } else {
            PointerEvent::up(1, last.x, last.y)
        };
        feed(&mut engine, &mut sensor, end, t);

        let starts = events.iter().filter(|e| matches!(e, ReorderEvent::Start { .. })).count();
        let ends = events.iter().filter(|e| matches!(e, ReorderEvent::End { .. })).count();
        if swipe_before_drag {
            prop_assert_eq!(starts, 0, "events={:?}", events);
        }
        prop_assert_eq!(starts, ends, "events={:?}", events);
        prop_assert!(starts <= 1);
        prop_assert!(!sensor.drag_state().is_dragging);
    }
}
