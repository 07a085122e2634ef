#![forbid(unsafe_code)]

//! Advisory ownership signal shared with an external drag/reorder subsystem.
//!
//! The gesture tracker is the only writer: it claims the session when a
//! swipe or drag resolves and clears the claim when the session ends. Other
//! subsystems hold a clone of the same [`InteractionArbiter`] and read it
//! inside their own activation policy (yield on swipe, follow on drag).
//!
//! The arbiter is advisory, not a lock. Readers must tolerate observing
//! `None` at any point.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::action::GestureIntent;
use crate::event::ElementId;

#[derive(Debug, Default)]
struct ArbiterState {
    current_intent: Option<GestureIntent>,
    target_id: Option<ElementId>,
}

/// Shared handle to the current interaction claim.
///
/// Cloning creates a new handle to the **same** state.
#[derive(Debug, Clone, Default)]
pub struct InteractionArbiter {
    state: Rc<RefCell<ArbiterState>>,
}

impl InteractionArbiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gesture family currently owning the pointer, if any.
    #[must_use]
    pub fn current_intent(&self) -> Option<GestureIntent> {
        self.state.borrow().current_intent
    }

    /// Element the owning gesture started on. `None` also when the gesture
    /// started on empty space.
    #[must_use]
    pub fn target_id(&self) -> Option<ElementId> {
        self.state.borrow().target_id.clone()
    }

    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.state.borrow().current_intent.is_some()
    }

    /// Whether both handles share the same state.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    pub(crate) fn claim(&self, intent: GestureIntent, target_id: Option<ElementId>) {
        debug!(%intent, target = ?target_id, "arbiter claimed");
        let mut state = self.state.borrow_mut();
        state.current_intent = Some(intent);
        state.target_id = target_id;
    }

    pub(crate) fn clear(&self) {
        let mut state = self.state.borrow_mut();
        if state.current_intent.is_some() {
            debug!("arbiter cleared");
        }
        state.current_intent = None;
        state.target_id = None;
    }
}
