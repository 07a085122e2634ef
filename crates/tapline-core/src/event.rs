#![forbid(unsafe_code)]

//! Canonical pointer input and element identity types.
//!
//! Hosts translate their native pointer callbacks (DOM `pointerdown`,
//! terminal mouse reports, recorded traces) into [`PointerEvent`] values
//! before handing them to the recognizer.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Opaque handle correlating a screen region with a logical list item.
///
/// Identifiers are unique among currently registered elements but carry no
/// meaning of their own. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ElementId(Arc<str>);

impl ElementId {
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

/// Host-assigned identifier of one physical pointer.
pub type PointerId = u32;

/// Pointer lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Cancel,
}

/// A single normalized pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub pointer_id: PointerId,
    pub position: Point,
}

impl PointerEvent {
    #[must_use]
    pub const fn new(kind: PointerEventKind, pointer_id: PointerId, position: Point) -> Self {
        Self {
            kind,
            pointer_id,
            position,
        }
    }

    #[must_use]
    pub const fn down(pointer_id: PointerId, x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Down, pointer_id, Point::new(x, y))
    }

    #[must_use]
    pub const fn moved(pointer_id: PointerId, x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Move, pointer_id, Point::new(x, y))
    }

    #[must_use]
    pub const fn up(pointer_id: PointerId, x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Up, pointer_id, Point::new(x, y))
    }

    #[must_use]
    pub const fn cancel(pointer_id: PointerId, x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Cancel, pointer_id, Point::new(x, y))
    }
}
