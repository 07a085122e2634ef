#![forbid(unsafe_code)]

//! Deterministic pointer session recording and replay.
//!
//! [`SessionRecorder`] wraps [`PointerBindings`] and records every host
//! interaction (element registration, container binding, pointer events and
//! timer ticks) as a [`TraceRecord`]. [`replay`] feeds a recorded
//! [`SessionTrace`] through fresh bindings and returns the resulting
//! [`Transcript`] of gesture actions.
//!
//! # Format
//!
//! JSON Lines, one record per line, schema [`SCHEMA_VERSION`]:
//!
//! ```text
//! {"event":"trace_header","schema_version":"tapline-trace-v1","session_name":"demo"}
//! {"event":"register","t_ms":0,"id":"a","rect":{"x":0.0,"y":0.0,"width":320.0,"height":59.0}}
//! {"event":"bind","t_ms":0,"node":1}
//! {"event":"pointer","t_ms":5,"kind":"down","pointer_id":1,"x":10.0,"y":10.0,"target":1}
//! {"event":"pointer","t_ms":55,"kind":"up","pointer_id":1,"x":10.0,"y":10.0}
//! {"event":"tick","t_ms":700}
//! ```
//!
//! # Determinism contract
//!
//! Replay never reads the wall clock for decisions: every record carries a
//! millisecond offset from session start, and timers only fire on `tick`
//! records or before the next pointer record. Identical traces therefore
//! produce identical transcripts.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tapline_core::{
    ElementId, GestureAction, GestureConfig, GestureKind, Instant, Point, PointerEvent,
    PointerEventKind, PointerId, Rect, Region,
};
use tracing::{debug, warn};

use crate::bindings::{
    BindingDispatch, HostCommand, HostPointerEvent, NodeId, PointerBindings,
};

/// Schema version for pointer session traces.
pub const SCHEMA_VERSION: &str = "tapline-trace-v1";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A single record in a pointer session trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum TraceRecord {
    /// Session header (must be first).
    #[serde(rename = "trace_header")]
    Header {
        schema_version: String,
        session_name: String,
    },
    /// Element mounted (`rect` present) or unmounted (`rect` absent).
    #[serde(rename = "register")]
    Register {
        t_ms: u64,
        id: ElementId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rect: Option<Rect>,
    },
    /// Container bound (`node` present) or unbound.
    #[serde(rename = "bind")]
    Bind {
        t_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node: Option<NodeId>,
    },
    /// Host pointer event. `target` is the listener node for container events.
    #[serde(rename = "pointer")]
    Pointer {
        t_ms: u64,
        kind: PointerEventKind,
        pointer_id: PointerId,
        x: f64,
        y: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<NodeId>,
    },
    /// Explicit time advancement; due timers fire here.
    #[serde(rename = "tick")]
    Tick { t_ms: u64 },
}

impl TraceRecord {
    /// Timestamp of the record, `None` for the header.
    #[must_use]
    pub fn t_ms(&self) -> Option<u64> {
        match self {
            Self::Header { .. } => None,
            Self::Register { t_ms, .. }
            | Self::Bind { t_ms, .. }
            | Self::Pointer { t_ms, .. }
            | Self::Tick { t_ms } => Some(*t_ms),
        }
    }

    fn from_host(t_ms: u64, host: &HostPointerEvent) -> Self {
        Self::Pointer {
            t_ms,
            kind: host.event.kind,
            pointer_id: host.event.pointer_id,
            x: host.event.position.x,
            y: host.event.position.y,
            target: host.target,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when reading, writing or replaying a trace.
#[derive(Debug)]
pub enum TraceError {
    /// I/O error reading or writing a file.
    Io(std::io::Error),
    /// A line failed to parse. `line` is 1-based.
    Json {
        line: usize,
        source: serde_json::Error,
    },
    /// First record is not a header.
    MissingHeader,
    /// Header names an unsupported schema.
    SchemaMismatch { found: String },
    /// A record goes back in time.
    NonMonotonic { line: usize, t_ms: u64, previous: u64 },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json { line, source } => write!(f, "line {line}: JSON error: {source}"),
            Self::MissingHeader => write!(f, "trace does not start with a trace_header record"),
            Self::SchemaMismatch { found } => write!(
                f,
                "unsupported trace schema {found:?} (expected {SCHEMA_VERSION:?})"
            ),
            Self::NonMonotonic {
                line,
                t_ms,
                previous,
            } => write!(
                f,
                "line {line}: timestamp {t_ms}ms is earlier than previous {previous}ms"
            ),
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TraceError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// SessionTrace
// ---------------------------------------------------------------------------

/// A complete recorded session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTrace {
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    /// Empty trace with a header.
    #[must_use]
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            records: vec![TraceRecord::Header {
                schema_version: SCHEMA_VERSION.to_string(),
                session_name: session_name.into(),
            }],
        }
    }

    /// Parse JSONL text. Blank lines are skipped.
    pub fn from_jsonl(text: &str) -> Result<Self, TraceError> {
        let mut records = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: TraceRecord = serde_json::from_str(line).map_err(|source| {
                TraceError::Json {
                    line: index + 1,
                    source,
                }
            })?;
            records.push(record);
        }
        let trace = Self { records };
        trace.validate()?;
        Ok(trace)
    }

    /// Read and parse a JSONL trace file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_jsonl(&text)
    }

    /// Serialize to JSONL (trailing newline included).
    pub fn to_jsonl(&self) -> Result<String, TraceError> {
        let mut out = String::new();
        for (index, record) in self.records.iter().enumerate() {
            let line = serde_json::to_string(record).map_err(|source| TraceError::Json {
                line: index + 1,
                source,
            })?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    /// Write the trace as JSONL to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), TraceError> {
        std::fs::write(path.as_ref(), self.to_jsonl()?)?;
        Ok(())
    }

    /// Check the header and timestamp ordering.
    pub fn validate(&self) -> Result<(), TraceError> {
        match self.records.first() {
            Some(TraceRecord::Header { schema_version, .. }) if schema_version == SCHEMA_VERSION => {}
            Some(TraceRecord::Header { schema_version, .. }) => {
                return Err(TraceError::SchemaMismatch {
                    found: schema_version.clone(),
                });
            }
            _ => return Err(TraceError::MissingHeader),
        }

        let mut previous = 0;
        for (index, record) in self.records.iter().enumerate().skip(1) {
            let Some(t_ms) = record.t_ms() else {
                continue;
            };
            if t_ms < previous {
                return Err(TraceError::NonMonotonic {
                    line: index + 1,
                    t_ms,
                    previous,
                });
            }
            previous = t_ms;
        }
        Ok(())
    }

    /// Session name from the header.
    #[must_use]
    pub fn session_name(&self) -> Option<&str> {
        match self.records.first() {
            Some(TraceRecord::Header { session_name, .. }) => Some(session_name),
            _ => None,
        }
    }

    /// Number of pointer records.
    #[must_use]
    pub fn pointer_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Pointer { .. }))
            .count()
    }

    /// Timestamp of the last record.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.records
            .iter()
            .rev()
            .find_map(TraceRecord::t_ms)
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// SessionRecorder
// ---------------------------------------------------------------------------

/// Records a live session for deterministic replay.
///
/// Every call is forwarded to the wrapped [`PointerBindings`] and appended
/// to the trace with its offset from `base`.
#[derive(Debug)]
pub struct SessionRecorder {
    bindings: PointerBindings,
    base: Instant,
    trace: SessionTrace,
}

impl SessionRecorder {
    #[must_use]
    pub fn new(bindings: PointerBindings, session_name: impl Into<String>, base: Instant) -> Self {
        Self {
            bindings,
            base,
            trace: SessionTrace::new(session_name),
        }
    }

    fn t_ms(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.base).as_millis() as u64
    }

    /// Register a fixed rectangle (or unregister with `None`).
    ///
    /// Live regions cannot be recorded; pass their current bounds instead.
    pub fn register_element(&mut self, now: Instant, id: impl Into<ElementId>, rect: Option<Rect>) {
        let id = id.into();
        self.trace.records.push(TraceRecord::Register {
            t_ms: self.t_ms(now),
            id: id.clone(),
            rect,
        });
        self.bindings.register_element(id, rect.map(Region::Fixed));
    }

    pub fn bind_container(&mut self, now: Instant, node: Option<NodeId>) -> Vec<HostCommand> {
        self.trace.records.push(TraceRecord::Bind {
            t_ms: self.t_ms(now),
            node,
        });
        self.bindings.bind_container(node)
    }

    pub fn dispatch(&mut self, host: &HostPointerEvent, now: Instant) -> BindingDispatch {
        self.trace
            .records
            .push(TraceRecord::from_host(self.t_ms(now), host));
        self.bindings.dispatch(host, now)
    }

    pub fn poll(&mut self, now: Instant) -> Option<GestureAction> {
        self.trace.records.push(TraceRecord::Tick {
            t_ms: self.t_ms(now),
        });
        self.bindings.poll(now)
    }

    #[must_use]
    pub fn bindings(&self) -> &PointerBindings {
        &self.bindings
    }

    /// Stop recording and return the trace.
    #[must_use]
    pub fn finish(self) -> SessionTrace {
        self.trace
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// One gesture action observed during replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub t_ms: u64,
    pub action: GestureAction,
}

/// Ordered gesture actions produced by a replay.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transcript {
    pub entries: Vec<TranscriptEntry>,
    /// Pointer records the bindings or tracker ignored.
    pub ignored: u64,
}

impl Transcript {
    #[must_use]
    pub fn kinds(&self) -> Vec<GestureKind> {
        self.entries.iter().map(|e| e.action.kind()).collect()
    }

    #[must_use]
    pub fn actions(&self) -> Vec<GestureAction> {
        self.entries.iter().map(|e| e.action.clone()).collect()
    }
}

/// Hooks invoked while a trace replays.
///
/// Lets callers drive additional pointer consumers (a reorder sensor, for
/// example) from the same stream, after the gesture engine saw each event.
pub trait ReplayObserver {
    fn on_register(&mut self, _id: &ElementId, _bindings: &PointerBindings, _t_ms: u64) {}

    fn on_pointer(
        &mut self,
        _host: &HostPointerEvent,
        _dispatch: &BindingDispatch,
        _bindings: &PointerBindings,
        _t_ms: u64,
        _now: Instant,
    ) {
    }

    fn on_tick(&mut self, _bindings: &PointerBindings, _t_ms: u64, _now: Instant) {}
}

impl ReplayObserver for () {}

/// Replay `trace` through fresh bindings built from `config`.
pub fn replay(trace: &SessionTrace, config: GestureConfig) -> Result<Transcript, TraceError> {
    let mut bindings = PointerBindings::with_config(config);
    replay_with(trace, &mut bindings, &mut ())
}

/// Replay `trace` through `bindings`, notifying `observer` after each step.
pub fn replay_with(
    trace: &SessionTrace,
    bindings: &mut PointerBindings,
    observer: &mut impl ReplayObserver,
) -> Result<Transcript, TraceError> {
    trace.validate()?;

    let base = Instant::now();
    let clock = Rc::new(Cell::new(0_u64));
    let entries = Rc::new(RefCell::new(Vec::new()));
    let _sub = {
        let clock = Rc::clone(&clock);
        let entries = Rc::clone(&entries);
        bindings.subscribe(move |action| {
            entries.borrow_mut().push(TranscriptEntry {
                t_ms: clock.get(),
                action: action.clone(),
            });
        })
    };

    let mut ignored = 0;
    for record in &trace.records {
        let Some(t_ms) = record.t_ms() else {
            continue;
        };
        clock.set(t_ms);
        let now = base + Duration::from_millis(t_ms);

        match record {
            TraceRecord::Header { .. } => {}
            TraceRecord::Register { id, rect, .. } => {
                bindings.register_element(id.clone(), rect.map(Region::Fixed));
                observer.on_register(id, bindings, t_ms);
            }
            TraceRecord::Bind { node, .. } => {
                bindings.bind_container(*node);
            }
            TraceRecord::Pointer {
                kind,
                pointer_id,
                x,
                y,
                target,
                ..
            } => {
                let host = HostPointerEvent {
                    event: PointerEvent::new(*kind, *pointer_id, Point::new(*x, *y)),
                    target: *target,
                };
                let dispatch = bindings.dispatch(&host, now);
                if dispatch.is_ignored() {
                    ignored += 1;
                    warn!(t_ms, outcome = ?dispatch.outcome, "replayed pointer event ignored");
                }
                observer.on_pointer(&host, &dispatch, bindings, t_ms, now);
            }
            TraceRecord::Tick { .. } => {
                bindings.poll(now);
                observer.on_tick(bindings, t_ms, now);
            }
        }
    }

    let entries = entries.take();
    debug!(
        session = trace.session_name().unwrap_or_default(),
        actions = entries.len(),
        ignored,
        "replay finished"
    );
    Ok(Transcript { entries, ignored })
}
