//! End-to-end gesture scenarios against a wired [`GestureEngine`].
//!
//! Each scenario drives the engine with synthetic timestamps and compares the
//! full sequence of bus deliveries.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tapline_core::{
    ElementId, GestureAction, GestureEngine, GestureKind, Instant, Offset, Point, PointerEvent,
    Rect, Region, Subscription, SwipeDirection,
};

const fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn id(s: &str) -> Option<ElementId> {
    Some(ElementId::new(s))
}

/// Items `a`, `b`, `c` stacked in 60px rows starting at y=0.
fn engine() -> (GestureEngine, Rc<RefCell<Vec<GestureAction>>>, Subscription) {
    let mut engine = GestureEngine::default();
    for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
        engine.register_element(
            name,
            Some(Region::Fixed(Rect::new(0.0, i as f64 * 60.0, 320.0, 59.0))),
        );
    }
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let sub = engine.subscribe(move |a| sink.borrow_mut().push(a.clone()));
    (engine, seen, sub)
}

#[test]
fn scenario_tap() {
    let (mut engine, seen, _sub) = engine();
    let t = Instant::now();

    engine.handle(&PointerEvent::down(1, 10.0, 10.0), t);
    engine.handle(&PointerEvent::up(1, 10.0, 10.0), t + ms(50));

    assert_eq!(
        *seen.borrow(),
        vec![GestureAction::Tap {
            element_id: id("a"),
            point: Point::new(10.0, 10.0),
        }]
    );
}

#[test]
fn scenario_double_tap() {
    let (mut engine, seen, _sub) = engine();
    let t = Instant::now();

    engine.handle(&PointerEvent::down(1, 10.0, 10.0), t);
    engine.handle(&PointerEvent::up(1, 10.0, 10.0), t + ms(50));
    engine.handle(&PointerEvent::down(1, 10.0, 10.0), t + ms(120));
    engine.handle(&PointerEvent::up(1, 10.0, 10.0), t + ms(170));

    let kinds: Vec<_> = seen.borrow().iter().map(GestureAction::kind).collect();
    assert_eq!(kinds, vec![GestureKind::Tap, GestureKind::DoubleTap]);
    assert_eq!(seen.borrow()[1].element_id(), id("a").as_ref());
}

#[test]
fn scenario_swipe_right() {
    let (mut engine, seen, _sub) = engine();
    let t = Instant::now();

    engine.handle(&PointerEvent::down(1, 10.0, 70.0), t);
    engine.handle(&PointerEvent::moved(1, 40.0, 70.0), t + ms(60));
    engine.handle(&PointerEvent::moved(1, 100.0, 70.0), t + ms(150));
    engine.handle(&PointerEvent::up(1, 100.0, 70.0), t + ms(200));

    let seen = seen.borrow();
    assert_eq!(
        seen.first(),
        Some(&GestureAction::SwipeStart {
            element_id: id("b"),
            point: Point::new(40.0, 70.0),
            direction: SwipeDirection::Right,
        })
    );
    assert_eq!(
        seen.last(),
        Some(&GestureAction::SwipeEnd {
            element_id: id("b"),
            point: Point::new(100.0, 70.0),
            distance: 90.0,
            velocity: 0.45,
        })
    );
    let moves: Vec<f64> = seen
        .iter()
        .filter_map(|a| match a {
            GestureAction::SwipeMove { distance, .. } => Some(*distance),
            _ => None,
        })
        .collect();
    assert_eq!(moves, vec![30.0, 90.0]);
}

#[test]
fn scenario_long_press_on_empty_space() {
    let (mut engine, seen, _sub) = engine();
    let t = Instant::now();

    engine.handle(&PointerEvent::down(1, 10.0, 400.0), t);
    for tick in (16..=650).step_by(16) {
        engine.poll(t + ms(tick));
    }

    assert_eq!(
        *seen.borrow(),
        vec![GestureAction::LongPress {
            element_id: None,
            point: Point::new(10.0, 400.0),
        }]
    );
}

#[test]
fn scenario_vertical_drag() {
    let (mut engine, seen, _sub) = engine();
    let t = Instant::now();

    engine.handle(&PointerEvent::down(1, 10.0, 130.0), t);
    engine.handle(&PointerEvent::moved(1, 10.0, 150.0), t + ms(40));
    engine.handle(&PointerEvent::moved(1, 10.0, 170.0), t + ms(80));
    engine.handle(&PointerEvent::up(1, 10.0, 170.0), t + ms(120));

    let c = id("c");
    assert_eq!(
        *seen.borrow(),
        vec![
            GestureAction::DragStart {
                element_id: c.clone(),
                point: Point::new(10.0, 150.0),
            },
            GestureAction::DragMove {
                element_id: c.clone(),
                point: Point::new(10.0, 150.0),
                offset: Offset::new(0.0, 20.0),
            },
            GestureAction::DragMove {
                element_id: c.clone(),
                point: Point::new(10.0, 170.0),
                offset: Offset::new(0.0, 40.0),
            },
            GestureAction::DragEnd {
                element_id: c,
                point: Point::new(10.0, 170.0),
                offset: Offset::new(0.0, 40.0),
            },
        ]
    );
}

#[test]
fn arbiter_tracks_session_lifecycle() {
    let (mut engine, _seen, _sub) = engine();
    let reader = engine.arbiter().clone();
    let t = Instant::now();

    engine.handle(&PointerEvent::down(1, 10.0, 10.0), t);
    assert_eq!(reader.current_intent(), None);
    engine.handle(&PointerEvent::moved(1, 60.0, 12.0), t + ms(30));
    assert_eq!(reader.target_id(), id("a"));
    engine.handle(&PointerEvent::cancel(1, 60.0, 12.0), t + ms(60));
    assert_eq!(reader.current_intent(), None);
    assert_eq!(reader.target_id(), None);
}
