#![forbid(unsafe_code)]

//! Core: pointer gesture recognition and cross-subsystem coordination.
//!
//! # Role in tapline
//! `tapline-core` turns a raw, ambiguous pointer stream into discrete,
//! typed gestures for a touch-first list UI, and tells an independently
//! implemented drag/reorder subsystem when a session has already been
//! claimed.
//!
//! # Primary responsibilities
//! - **ElementRegistry**: element id to live hit-testable geometry.
//! - **PointerSessionTracker**: the single-pointer state machine resolving
//!   tap, double-tap, long-press, swipe and drag.
//! - **GestureEventBus**: ordered, synchronous pub/sub for resolved actions.
//! - **InteractionArbiter**: advisory claim read by the drag subsystem.
//! - **CancellableTimer**: host-driven one-shot deadline behind long-press.
//!
//! # How it fits in the system
//! Hosts (`tapline-web`, trace replay) feed [`PointerEvent`]s and ticks into a
//! [`GestureEngine`]. Consumers (`tapline-list`) subscribe to the bus. Nothing
//! here reads a clock: every operation takes `now`.

pub mod action;
pub mod arbiter;
pub mod bus;
pub mod config;
pub mod engine;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod registry;
pub mod timer;

pub use action::{GestureAction, GestureIntent, GestureKind, SwipeDirection};
pub use arbiter::InteractionArbiter;
pub use bus::{GestureEventBus, Subscription};
pub use config::GestureConfig;
pub use engine::GestureEngine;
pub use event::{ElementId, PointerEvent, PointerEventKind, PointerId};
pub use geometry::{Offset, Point, Rect};
pub use gesture::{IgnoredReason, PointerSessionTracker, SessionPhase, TrackerDispatch, TrackerOutcome};
pub use registry::{ElementRegistry, Region};
pub use timer::CancellableTimer;

// Re-export for hosts that build timestamps.
pub use web_time::Instant;
