#![forbid(unsafe_code)]

//! Element registry: maps element identifiers to hit-testable geometry.
//!
//! View components register a region on mount and pass `None` on unmount.
//! Regions are either fixed rectangles or live providers that are measured
//! at hit-test time, so items that scrolled or re-laid-out since they
//! registered are still found where they currently are.
//!
//! # Ordering
//!
//! [`ElementRegistry::hit_test`] returns the most recently registered region
//! containing the point. Re-registering an existing id moves it to the most
//! recent slot. Overlap between list items is expected to be rare.

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::event::ElementId;
use crate::geometry::{Point, Rect};

/// Live geometry provider. Returning `None` means "currently not laid out".
pub type RegionProvider = Rc<dyn Fn() -> Option<Rect>>;

/// Hit-testable geometry for one element.
#[derive(Clone)]
pub enum Region {
    Fixed(Rect),
    Live(RegionProvider),
}

impl Region {
    /// Wrap a closure that reports the element's current bounds.
    pub fn live(provider: impl Fn() -> Option<Rect> + 'static) -> Self {
        Self::Live(Rc::new(provider))
    }

    /// Current bounds of the region.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Fixed(rect) => Some(*rect),
            Self::Live(provider) => provider(),
        }
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self::Fixed(rect)
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(rect) => f.debug_tuple("Fixed").field(rect).finish(),
            Self::Live(_) => f.write_str("Live(..)"),
        }
    }
}

/// Registry of hit-testable elements, ordered by registration recency.
#[derive(Debug, Default, Clone)]
pub struct ElementRegistry {
    // Oldest first; `hit_test` scans from the back.
    entries: Vec<(ElementId, Region)>,
}

impl ElementRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `region` with `id`, or remove `id` when `region` is `None`.
    ///
    /// Last writer wins. Registering an id that is already present replaces
    /// its region and makes it the most recent registration.
    pub fn register(&mut self, id: ElementId, region: Option<Region>) {
        self.entries.retain(|(existing, _)| *existing != id);
        match region {
            Some(region) => {
                trace!(element = %id, "element registered");
                self.entries.push((id, region));
            }
            None => trace!(element = %id, "element unregistered"),
        }
    }

    /// Identifier of the most recently registered region containing `point`.
    ///
    /// `None` means empty space.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<ElementId> {
        self.entries
            .iter()
            .rev()
            .find(|(_, region)| region.bounds().is_some_and(|rect| rect.contains(point)))
            .map(|(id, _)| id.clone())
    }

    /// Current bounds of a registered element.
    #[must_use]
    pub fn bounds(&self, id: &ElementId) -> Option<Rect> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == id)
            .and_then(|(_, region)| region.bounds())
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.entries.iter().any(|(existing, _)| existing == id)
    }

    /// Registered ids, oldest registration first.
    pub fn ids(&self) -> impl Iterator<Item = &ElementId> {
        self.entries.iter().map(|(id, _)| id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
