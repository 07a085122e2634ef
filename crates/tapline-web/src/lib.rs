#![forbid(unsafe_code)]

//! `tapline-web` connects a host pointer surface to a tapline gesture engine.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment pushes pointer events and
//!   ticks, and applies the listener/capture commands returned to it.
//! - **Deterministic time**: every call takes `now`; nothing reads a clock.
//! - **Replayable**: sessions can be recorded to JSONL and replayed into an
//!   identical action transcript.
//!
//! This crate does not bind to `wasm-bindgen`. It provides the building
//! blocks a JS shim (or a test) wraps.

pub mod bindings;
pub mod session_record;

pub use bindings::{
    BindingDispatch, BindingIgnoredReason, BindingOutcome, HostCommand, HostEventType,
    HostPointerEvent, ListenerTarget, NodeId, PointerBindings,
};
pub use session_record::{
    ReplayObserver, SCHEMA_VERSION, SessionRecorder, SessionTrace, TraceError, TraceRecord,
    Transcript, TranscriptEntry, replay, replay_with,
};
