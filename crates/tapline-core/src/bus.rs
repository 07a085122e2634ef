#![forbid(unsafe_code)]

//! Ordered publish/subscribe channel for resolved gesture actions.
//!
//! # Design
//!
//! [`GestureEventBus`] is a cloneable handle over shared listener storage
//! (`Rc<RefCell<..>>`). It is constructed once when the application is wired
//! together and handed to the tracker and to every consumer that needs it.
//!
//! Listeners are stored as `Weak` references; the strong `Rc` lives inside
//! the [`Subscription`] guard returned by [`subscribe`](GestureEventBus::subscribe).
//! Dropping the guard (or calling [`Subscription::unsubscribe`]) stops
//! delivery. Dead entries are pruned lazily on the next dispatch.
//!
//! # Delivery
//!
//! 1. Synchronous: `dispatch` returns after every listener ran.
//! 2. Registration order.
//! 3. Snapshot semantics: the listener set is captured when a dispatch
//!    begins. Listeners subscribed from inside a callback first see the
//!    next action; listeners unsubscribed from inside a callback still
//!    receive the in-flight action.
//! 4. No buffering or replay. A late subscriber never sees earlier actions.
//!
//! Dispatching from inside a listener is allowed; the nested dispatch is
//! delivered completely before the outer one continues.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{info_span, trace};

use crate::action::GestureAction;

type ListenerRc = Rc<dyn Fn(&GestureAction)>;
type ListenerWeak = Weak<dyn Fn(&GestureAction)>;

/// Shared, ordered gesture channel.
///
/// Cloning creates a new handle to the **same** listener list.
#[derive(Clone, Default)]
pub struct GestureEventBus {
    listeners: Rc<RefCell<Vec<ListenerWeak>>>,
}

impl fmt::Debug for GestureEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureEventBus")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

impl GestureEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Delivery stops when the returned guard is dropped.
    pub fn subscribe(&self, listener: impl Fn(&GestureAction) + 'static) -> Subscription {
        let strong: ListenerRc = Rc::new(listener);
        self.listeners.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Deliver `action` to every listener subscribed at call time.
    pub fn dispatch(&self, action: &GestureAction) {
        let snapshot: Vec<ListenerRc> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|w| w.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };

        let _span = info_span!(
            "gesture.dispatch",
            kind = %action.kind(),
            listeners = snapshot.len()
        )
        .entered();
        trace!(element = ?action.element_id(), "dispatching gesture action");

        for listener in &snapshot {
            listener(action);
        }
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

/// RAII guard for one bus listener.
///
/// Holds the only strong reference to the listener closure.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl Subscription {
    /// Wrap any value whose drop ends a registration.
    ///
    /// Lets other listener lists hand out the same guard type as the bus.
    pub fn from_guard(guard: impl std::any::Any) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }

    /// Stop delivery to this listener. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription(..)")
    }
}
