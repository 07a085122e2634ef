#![forbid(unsafe_code)]

//! Resolved gesture actions delivered to consumers.
//!
//! A [`GestureAction`] is an immutable value: once dispatched on the
//! [`GestureEventBus`](crate::bus::GestureEventBus) it is never mutated.
//! Every action carries the element under the pointer at session start
//! (`None` means empty space) and the pointer position at emission time.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::event::ElementId;
use crate::geometry::{Offset, Point};

/// Horizontal direction of a swipe, fixed when the swipe resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    /// Direction for a signed horizontal delta. Zero counts as right.
    #[inline]
    #[must_use]
    pub fn from_delta(dx: f64) -> Self {
        if dx < 0.0 { Self::Left } else { Self::Right }
    }
}

/// Gesture family a session has committed to mid-flight.
///
/// Tap, double-tap and long-press are never "resolved"; they are decided at
/// session end or by the long-press timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GestureIntent {
    Swipe,
    Drag,
}

impl fmt::Display for GestureIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Swipe => "swipe",
            Self::Drag => "drag",
        })
    }
}

/// Discriminant of a [`GestureAction`], useful for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Tap,
    DoubleTap,
    LongPress,
    SwipeStart,
    SwipeMove,
    SwipeEnd,
    DragStart,
    DragMove,
    DragEnd,
}

impl GestureKind {
    /// Stable wire name, e.g. `GESTURE_SWIPE_END`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tap => "GESTURE_TAP",
            Self::DoubleTap => "GESTURE_DOUBLE_TAP",
            Self::LongPress => "GESTURE_LONG_PRESS",
            Self::SwipeStart => "GESTURE_SWIPE_START",
            Self::SwipeMove => "GESTURE_SWIPE_MOVE",
            Self::SwipeEnd => "GESTURE_SWIPE_END",
            Self::DragStart => "GESTURE_DRAG_START",
            Self::DragMove => "GESTURE_DRAG_MOVE",
            Self::DragEnd => "GESTURE_DRAG_END",
        }
    }

    /// Whether this kind completes a session.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Tap | Self::DoubleTap | Self::SwipeEnd | Self::DragEnd
        )
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved gesture.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum GestureAction {
    /// Short, stationary press.
    #[cfg_attr(feature = "serde", serde(rename = "GESTURE_TAP"))]
    Tap {
        element_id: Option<ElementId>,
        point: Point,
    },
    /// Second tap on the same target within the double-tap window.
    #[cfg_attr(feature = "serde", serde(rename = "GESTURE_DOUBLE_TAP"))]
    DoubleTap {
        element_id: Option<ElementId>,
        point: Point,
    },
    /// Stationary hold past the long-press delay. Does not end the session.
    #[cfg_attr(feature = "serde", serde(rename = "GESTURE_LONG_PRESS"))]
    LongPress {
        element_id: Option<ElementId>,
        point: Point,
    },
    #[cfg_attr(feature = "serde", serde(rename = "GESTURE_SWIPE_START"))]
    SwipeStart {
        element_id: Option<ElementId>,
        point: Point,
        direction: SwipeDirection,
    },
    /// `distance` is the signed horizontal delta from the session start.
    #[cfg_attr(feature = "serde", serde(rename = "GESTURE_SWIPE_MOVE"))]
    SwipeMove {
        element_id: Option<ElementId>,
        point: Point,
        distance: f64,
    },
    /// `velocity` is `|distance|` per millisecond of session time.
    #[cfg_attr(feature = "serde", serde(rename = "GESTURE_SWIPE_END"))]
    SwipeEnd {
        element_id: Option<ElementId>,
        point: Point,
        distance: f64,
        velocity: f64,
    },
    #[cfg_attr(feature = "serde", serde(rename = "GESTURE_DRAG_START"))]
    DragStart {
        element_id: Option<ElementId>,
        point: Point,
    },
    /// `offset` is the signed delta from the session start.
    #[cfg_attr(feature = "serde", serde(rename = "GESTURE_DRAG_MOVE"))]
    DragMove {
        element_id: Option<ElementId>,
        point: Point,
        offset: Offset,
    },
    #[cfg_attr(feature = "serde", serde(rename = "GESTURE_DRAG_END"))]
    DragEnd {
        element_id: Option<ElementId>,
        point: Point,
        offset: Offset,
    },
}

impl GestureAction {
    #[must_use]
    pub const fn kind(&self) -> GestureKind {
        match self {
            Self::Tap { .. } => GestureKind::Tap,
            Self::DoubleTap { .. } => GestureKind::DoubleTap,
            Self::LongPress { .. } => GestureKind::LongPress,
            Self::SwipeStart { .. } => GestureKind::SwipeStart,
            Self::SwipeMove { .. } => GestureKind::SwipeMove,
            Self::SwipeEnd { .. } => GestureKind::SwipeEnd,
            Self::DragStart { .. } => GestureKind::DragStart,
            Self::DragMove { .. } => GestureKind::DragMove,
            Self::DragEnd { .. } => GestureKind::DragEnd,
        }
    }

    /// Element under the pointer when the session began.
    #[must_use]
    pub const fn element_id(&self) -> Option<&ElementId> {
        match self {
            Self::Tap { element_id, .. }
            | Self::DoubleTap { element_id, .. }
            | Self::LongPress { element_id, .. }
            | Self::SwipeStart { element_id, .. }
            | Self::SwipeMove { element_id, .. }
            | Self::SwipeEnd { element_id, .. }
            | Self::DragStart { element_id, .. }
            | Self::DragMove { element_id, .. }
            | Self::DragEnd { element_id, .. } => element_id.as_ref(),
        }
    }

    /// Pointer position when the action was emitted.
    #[must_use]
    pub const fn point(&self) -> Point {
        match self {
            Self::Tap { point, .. }
            | Self::DoubleTap { point, .. }
            | Self::LongPress { point, .. }
            | Self::SwipeStart { point, .. }
            | Self::SwipeMove { point, .. }
            | Self::SwipeEnd { point, .. }
            | Self::DragStart { point, .. }
            | Self::DragMove { point, .. }
            | Self::DragEnd { point, .. } => *point,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.kind().is_terminal()
    }
}
