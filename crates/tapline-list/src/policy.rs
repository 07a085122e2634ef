#![forbid(unsafe_code)]

//! Gesture-to-list-edit policy.
//!
//! [`ListGesturePolicy`] consumes resolved [`GestureAction`]s and turns them
//! into [`ListCommand`]s for the list owner, while tracking the transient
//! view state a list renders from (which item is being edited, which item is
//! being swiped and by how far).
//!
//! | Gesture              | Command                                       |
//! |----------------------|-----------------------------------------------|
//! | tap on item          | `BeginEdit` (after `CommitEdit` of the other)  |
//! | tap on empty space   | `CommitEdit` when editing                     |
//! | double-tap on item   | `InsertBefore`                                |
//! | double-tap elsewhere | `Append`                                      |
//! | long-press on item   | `OpenChildren`                                |
//! | swipe end past -80px | `Remove`                                      |
//!
//! Inserts are refused with `LimitReached` once the list holds `max_items`.
//! Drag actions are ignored here; reordering belongs to the reorder sensor.

use std::cell::RefCell;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tapline_core::{ElementId, GestureAction, GestureEventBus, Subscription};
use tracing::debug;

/// Thresholds for list editing gestures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListPolicyConfig {
    /// Leftward swipe distance (px) past which the item is removed (default: 80).
    pub swipe_delete_threshold: f64,
    /// Maximum number of items the list may hold (default: 10).
    pub max_items: usize,
}

impl Default for ListPolicyConfig {
    fn default() -> Self {
        Self {
            swipe_delete_threshold: 80.0,
            max_items: 10,
        }
    }
}

impl ListPolicyConfig {
    /// Returns a list of problems; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.swipe_delete_threshold.is_finite() || self.swipe_delete_threshold <= 0.0 {
            errors.push(format!(
                "list.swipe_delete_threshold must be > 0, got {}",
                self.swipe_delete_threshold
            ));
        }
        if self.max_items == 0 {
            errors.push("list.max_items must be > 0".into());
        }
        errors
    }
}

/// Edit the list owner should apply.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "command", rename_all = "snake_case"))]
pub enum ListCommand {
    /// Enter edit mode on an item.
    BeginEdit { id: ElementId },
    /// Save the pending edit of an item and leave edit mode.
    CommitEdit { id: ElementId },
    /// Insert a new item at the position of `id`, displacing it down.
    InsertBefore { id: ElementId },
    /// Add a new item at the end.
    Append,
    /// Open the children of an item.
    OpenChildren { id: ElementId },
    Remove { id: ElementId },
    /// An insert was refused because the list is full.
    LimitReached { max_items: usize },
}

/// Transient view state derived from gestures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListViewState {
    pub editing: Option<ElementId>,
    /// Item under an active swipe. `None` for no swipe and for a swipe that
    /// started on empty space.
    pub swiping: Option<ElementId>,
    /// Horizontal offset to render the swiping item at.
    pub swipe_offset: f64,
}

/// Maps gestures to list edits.
#[derive(Debug, Clone, Default)]
pub struct ListGesturePolicy {
    config: ListPolicyConfig,
    item_count: usize,
    view: ListViewState,
}

impl ListGesturePolicy {
    #[must_use]
    pub fn new(config: ListPolicyConfig) -> Self {
        Self {
            config,
            item_count: 0,
            view: ListViewState::default(),
        }
    }

    /// Sync the number of items the list currently holds.
    ///
    /// The policy adjusts its count for the inserts and removals it emits;
    /// call this whenever the owner's list changes for other reasons.
    pub fn set_item_count(&mut self, count: usize) {
        self.item_count = count;
    }

    #[must_use]
    #[inline]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    #[must_use]
    #[inline]
    pub fn view(&self) -> &ListViewState {
        &self.view
    }

    #[must_use]
    #[inline]
    pub fn config(&self) -> &ListPolicyConfig {
        &self.config
    }

    /// Translate one gesture into list commands.
    pub fn handle(&mut self, action: &GestureAction) -> Vec<ListCommand> {
        let mut out = Vec::new();
        match action {
            GestureAction::Tap { element_id, .. } => self.on_tap(element_id.as_ref(), &mut out),
            GestureAction::DoubleTap { element_id, .. } => {
                let command = match element_id {
                    Some(id) => ListCommand::InsertBefore { id: id.clone() },
                    None => ListCommand::Append,
                };
                self.insert(command, &mut out);
            }
            GestureAction::LongPress {
                element_id: Some(id),
                ..
            } => out.push(ListCommand::OpenChildren { id: id.clone() }),
            GestureAction::LongPress { element_id: None, .. } => {}
            GestureAction::SwipeStart { element_id, .. } => {
                self.view.swiping = element_id.clone();
                self.view.swipe_offset = 0.0;
            }
            GestureAction::SwipeMove {
                element_id,
                distance,
                ..
            } => {
                if *element_id == self.view.swiping {
                    self.view.swipe_offset = *distance;
                }
            }
            GestureAction::SwipeEnd {
                element_id,
                distance,
                ..
            } => {
                if *element_id == self.view.swiping {
                    match element_id {
                        Some(id) if *distance < -self.config.swipe_delete_threshold => {
                            self.remove(id, &mut out);
                        }
                        _ => {}
                    }
                    self.view.swiping = None;
                    self.view.swipe_offset = 0.0;
                }
            }
            GestureAction::DragStart { .. }
            | GestureAction::DragMove { .. }
            | GestureAction::DragEnd { .. } => {}
        }

        if !out.is_empty() {
            debug!(kind = %action.kind(), commands = ?out, "list commands");
        }
        out
    }

    fn on_tap(&mut self, target: Option<&ElementId>, out: &mut Vec<ListCommand>) {
        match (target, self.view.editing.clone()) {
            (Some(id), Some(editing)) if *id == editing => {}
            (Some(id), editing) => {
                if let Some(previous) = editing {
                    out.push(ListCommand::CommitEdit { id: previous });
                }
                out.push(ListCommand::BeginEdit { id: id.clone() });
                self.view.editing = Some(id.clone());
            }
            (None, Some(editing)) => {
                out.push(ListCommand::CommitEdit { id: editing });
                self.view.editing = None;
            }
            (None, None) => {}
        }
    }

    fn insert(&mut self, command: ListCommand, out: &mut Vec<ListCommand>) {
        if self.item_count >= self.config.max_items {
            out.push(ListCommand::LimitReached {
                max_items: self.config.max_items,
            });
            return;
        }
        self.item_count += 1;
        out.push(command);
    }

    fn remove(&mut self, id: &ElementId, out: &mut Vec<ListCommand>) {
        if self.view.editing.as_ref() == Some(id) {
            self.view.editing = None;
        }
        self.item_count = self.item_count.saturating_sub(1);
        out.push(ListCommand::Remove { id: id.clone() });
    }

    /// Subscribe `policy` to `bus`, forwarding its commands to `sink`.
    ///
    /// The sink runs after the policy borrow is released, so it may read the
    /// policy's view state.
    pub fn attach(
        policy: &Rc<RefCell<Self>>,
        bus: &GestureEventBus,
        sink: impl Fn(ListCommand) + 'static,
    ) -> Subscription {
        let policy = Rc::clone(policy);
        bus.subscribe(move |action| {
            let commands = policy.borrow_mut().handle(action);
            for command in commands {
                sink(command);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tapline_core::{Offset, Point, SwipeDirection};

    fn id(s: &str) -> ElementId {
        ElementId::new(s)
    }

    fn p() -> Point {
        Point::new(0.0, 0.0)
    }

    fn tap(target: Option<&str>) -> GestureAction {
        GestureAction::Tap {
            element_id: target.map(ElementId::new),
            point: p(),
        }
    }

    fn double_tap(target: Option<&str>) -> GestureAction {
        GestureAction::DoubleTap {
            element_id: target.map(ElementId::new),
            point: p(),
        }
    }

    fn swipe(target: &str, distances: &[f64]) -> Vec<GestureAction> {
        let element_id = Some(id(target));
        let mut actions = vec![GestureAction::SwipeStart {
            element_id: element_id.clone(),
            point: p(),
            direction: SwipeDirection::Left,
        }];
        for &distance in distances {
            actions.push(GestureAction::SwipeMove {
                element_id: element_id.clone(),
                point: p(),
                distance,
            });
        }
        actions.push(GestureAction::SwipeEnd {
            element_id,
            point: p(),
            distance: distances.last().copied().unwrap_or(0.0),
            velocity: 1.0,
        });
        actions
    }

    fn policy(items: usize) -> ListGesturePolicy {
        let mut policy = ListGesturePolicy::default();
        policy.set_item_count(items);
        policy
    }

    #[test]
    fn tap_begins_edit() {
        let mut policy = policy(3);
        assert_eq!(
            policy.handle(&tap(Some("a"))),
            vec![ListCommand::BeginEdit { id: id("a") }]
        );
        assert_eq!(policy.view().editing, Some(id("a")));
    }

    #[test]
    fn tap_on_edited_item_is_noop() {
        let mut policy = policy(3);
        policy.handle(&tap(Some("a")));
        assert!(policy.handle(&tap(Some("a"))).is_empty());
        assert_eq!(policy.view().editing, Some(id("a")));
    }

    #[test]
    fn tap_on_other_item_commits_then_switches() {
        let mut policy = policy(3);
        policy.handle(&tap(Some("a")));
        assert_eq!(
            policy.handle(&tap(Some("b"))),
            vec![
                ListCommand::CommitEdit { id: id("a") },
                ListCommand::BeginEdit { id: id("b") },
            ]
        );
    }

    #[test]
    fn tap_on_empty_space_exits_edit() {
        let mut policy = policy(3);
        assert!(policy.handle(&tap(None)).is_empty());
        policy.handle(&tap(Some("a")));
        assert_eq!(
            policy.handle(&tap(None)),
            vec![ListCommand::CommitEdit { id: id("a") }]
        );
        assert_eq!(policy.view().editing, None);
    }

    #[test]
    fn double_tap_inserts_or_appends() {
        let mut policy = policy(3);
        assert_eq!(
            policy.handle(&double_tap(Some("b"))),
            vec![ListCommand::InsertBefore { id: id("b") }]
        );
        assert_eq!(policy.handle(&double_tap(None)), vec![ListCommand::Append]);
        assert_eq!(policy.item_count(), 5);
    }

    #[test]
    fn inserts_refused_at_limit() {
        let mut policy = policy(9);
        assert_eq!(policy.handle(&double_tap(None)), vec![ListCommand::Append]);
        assert_eq!(
            policy.handle(&double_tap(Some("a"))),
            vec![ListCommand::LimitReached { max_items: 10 }]
        );
        assert_eq!(policy.item_count(), 10);
    }

    #[test]
    fn long_press_opens_children_only_on_items() {
        let mut policy = policy(1);
        let press = |target: Option<&str>| GestureAction::LongPress {
            element_id: target.map(ElementId::new),
            point: p(),
        };
        assert_eq!(
            policy.handle(&press(Some("a"))),
            vec![ListCommand::OpenChildren { id: id("a") }]
        );
        assert!(policy.handle(&press(None)).is_empty());
    }

    #[test]
    fn swipe_tracks_offset_and_resets() {
        let mut policy = policy(3);
        let actions = swipe("a", &[-20.0, -50.0]);
        policy.handle(&actions[0]);
        assert_eq!(policy.view().swiping, Some(id("a")));
        policy.handle(&actions[1]);
        policy.handle(&actions[2]);
        assert_eq!(policy.view().swipe_offset, -50.0);
        assert!(policy.handle(&actions[3]).is_empty());
        assert_eq!(policy.view(), &ListViewState::default());
    }

    #[test]
    fn swipe_past_threshold_removes() {
        let mut policy = policy(3);
        let mut commands = Vec::new();
        for action in swipe("b", &[-40.0, -81.0]) {
            commands.extend(policy.handle(&action));
        }
        assert_eq!(commands, vec![ListCommand::Remove { id: id("b") }]);
        assert_eq!(policy.item_count(), 2);
    }

    #[test]
    fn swipe_exactly_at_threshold_keeps_item() {
        let mut policy = policy(3);
        let mut commands = Vec::new();
        for action in swipe("b", &[-80.0]) {
            commands.extend(policy.handle(&action));
        }
        assert!(commands.is_empty());
    }

    #[test]
    fn rightward_swipe_never_removes() {
        let mut policy = policy(3);
        let mut commands = Vec::new();
        for action in swipe("b", &[200.0]) {
            commands.extend(policy.handle(&action));
        }
        assert!(commands.is_empty());
    }

    #[test]
    fn removing_edited_item_clears_edit() {
        let mut policy = policy(3);
        policy.handle(&tap(Some("c")));
        for action in swipe("c", &[-120.0]) {
            policy.handle(&action);
        }
        assert_eq!(policy.view().editing, None);
    }

    #[test]
    fn drag_actions_are_ignored() {
        let mut policy = policy(3);
        let drag = GestureAction::DragEnd {
            element_id: Some(id("a")),
            point: p(),
            offset: Offset::new(0.0, 40.0),
        };
        assert!(policy.handle(&drag).is_empty());
    }

    #[test]
    fn attach_forwards_commands_in_order() {
        let bus = GestureEventBus::new();
        let policy = Rc::new(RefCell::new(policy(2)));
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let _sub = ListGesturePolicy::attach(&policy, &bus, move |c| sink.borrow_mut().push(c));

        bus.dispatch(&tap(Some("a")));
        bus.dispatch(&tap(Some("b")));
        assert_eq!(
            *log.borrow(),
            vec![
                ListCommand::BeginEdit { id: id("a") },
                ListCommand::CommitEdit { id: id("a") },
                ListCommand::BeginEdit { id: id("b") },
            ]
        );
        assert_eq!(policy.borrow().view().editing, Some(id("b")));
    }

    #[test]
    fn config_validation() {
        assert!(ListPolicyConfig::default().validate().is_empty());
        let bad = ListPolicyConfig {
            swipe_delete_threshold: -1.0,
            max_items: 0,
        };
        assert_eq!(bad.validate().len(), 2);
    }
}
