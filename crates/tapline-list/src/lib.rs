#![forbid(unsafe_code)]

//! List interactions built on `tapline-core`.
//!
//! - [`ListGesturePolicy`] maps resolved gestures to list edits (edit,
//!   insert, open children, swipe-to-delete).
//! - [`ReorderSensor`] is the drag-to-reorder subsystem. It shares the
//!   gesture engine's [`InteractionArbiter`](tapline_core::InteractionArbiter)
//!   and applies its own activation constraint.

pub mod policy;
pub mod reorder;

pub use policy::{ListCommand, ListGesturePolicy, ListPolicyConfig, ListViewState};
pub use reorder::{
    DragState, ReorderConfig, ReorderEvent, ReorderSensor, visual_index, visual_order,
};
