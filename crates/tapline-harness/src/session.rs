#![forbid(unsafe_code)]

//! Replay of a recorded trace through a fully wired list: gesture engine,
//! list policy on the bus, and reorder sensor on the pointer stream.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use serde::Serialize;
use tapline_core::{ElementId, Instant, Subscription};
use tapline_list::{ListCommand, ListGesturePolicy, ReorderEvent, ReorderSensor};
use tapline_web::{
    BindingDispatch, BindingOutcome, HostPointerEvent, PointerBindings, ReplayObserver,
    SessionTrace, TranscriptEntry, replay_with,
};
use tracing::{debug, info_span};

use crate::config::TaplineConfig;

/// A value observed at a trace timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stamped<T> {
    pub t_ms: u64,
    #[serde(flatten)]
    pub value: T,
}

/// Everything a replayed session produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplayReport {
    pub session: String,
    pub gestures: Vec<TranscriptEntry>,
    pub commands: Vec<Stamped<ListCommand>>,
    pub reorders: Vec<Stamped<ReorderEvent>>,
    /// Pointer records dropped by the bindings or the tracker.
    pub ignored: u64,
}

impl ReplayReport {
    /// Human-readable, one line per observation, ordered by time.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut lines: Vec<(u64, usize, String)> = Vec::new();
        for entry in &self.gestures {
            let target = entry
                .action
                .element_id()
                .map_or_else(|| "-".to_string(), ElementId::to_string);
            lines.push((entry.t_ms, 0, format!("{:<20} {target}", entry.action.kind().name())));
        }
        for command in &self.commands {
            lines.push((command.t_ms, 1, format!("  list    {:?}", command.value)));
        }
        for event in &self.reorders {
            lines.push((event.t_ms, 2, format!("  reorder {:?}", event.value)));
        }
        // Stable: ties keep gesture, command, reorder order.
        lines.sort_by_key(|(t, rank, _)| (*t, *rank));

        let mut out = format!("session {}\n", self.session);
        for (t_ms, _, line) in lines {
            let _ = writeln!(out, "{t_ms:>8}ms  {line}");
        }
        let _ = writeln!(
            out,
            "{} gestures, {} list commands, {} reorder events, {} ignored",
            self.gestures.len(),
            self.commands.len(),
            self.reorders.len(),
            self.ignored
        );
        out
    }
}

/// Drives the list policy and reorder sensor alongside a replay.
struct ListObserver {
    sensor: ReorderSensor,
    policy: Rc<RefCell<ListGesturePolicy>>,
    /// Commands emitted during the current dispatch, not yet stamped.
    pending: Rc<RefCell<Vec<ListCommand>>>,
    commands: Vec<Stamped<ListCommand>>,
    reorders: Vec<Stamped<ReorderEvent>>,
    _policy_sub: Subscription,
}

impl ListObserver {
    fn attach(bindings: &PointerBindings, config: &TaplineConfig) -> Self {
        let policy = Rc::new(RefCell::new(ListGesturePolicy::new(config.to_list_config())));
        let pending = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&pending);
        let policy_sub = ListGesturePolicy::attach(&policy, bindings.engine().bus(), move |c| {
            sink.borrow_mut().push(c);
        });
        let sensor = ReorderSensor::new(
            config.to_reorder_config(),
            bindings.engine().arbiter().clone(),
        );
        Self {
            sensor,
            policy,
            pending,
            commands: Vec::new(),
            reorders: Vec::new(),
            _policy_sub: policy_sub,
        }
    }

    fn stamp_pending(&mut self, t_ms: u64) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        self.commands
            .extend(pending.into_iter().map(|value| Stamped { t_ms, value }));
    }
}

impl ReplayObserver for ListObserver {
    fn on_register(&mut self, _id: &ElementId, bindings: &PointerBindings, _t_ms: u64) {
        let count = bindings.engine().registry().len();
        self.policy.borrow_mut().set_item_count(count);
    }

    fn on_pointer(
        &mut self,
        host: &HostPointerEvent,
        dispatch: &BindingDispatch,
        bindings: &PointerBindings,
        t_ms: u64,
        now: Instant,
    ) {
        self.stamp_pending(t_ms);
        if let BindingOutcome::Forwarded(_) = dispatch.outcome {
            let events = self
                .sensor
                .handle(&host.event, bindings.engine().registry(), now);
            self.reorders
                .extend(events.into_iter().map(|value| Stamped { t_ms, value }));
        }
    }

    fn on_tick(&mut self, _bindings: &PointerBindings, t_ms: u64, _now: Instant) {
        self.stamp_pending(t_ms);
    }
}

/// Replay `trace` through a list wired from `config`.
pub fn replay_list_session(
    trace: &SessionTrace,
    config: &TaplineConfig,
) -> Result<ReplayReport, tapline_web::TraceError> {
    let session = trace.session_name().unwrap_or_default().to_string();
    let _span = info_span!("tapline.replay", session = %session).entered();

    let mut bindings = PointerBindings::with_config(config.to_gesture_config());
    let mut observer = ListObserver::attach(&bindings, config);
    let transcript = replay_with(trace, &mut bindings, &mut observer)?;
    observer.stamp_pending(trace.duration_ms());

    debug!(
        gestures = transcript.entries.len(),
        commands = observer.commands.len(),
        reorders = observer.reorders.len(),
        "list session replayed"
    );
    Ok(ReplayReport {
        session,
        gestures: transcript.entries,
        commands: observer.commands,
        reorders: observer.reorders,
        ignored: transcript.ignored,
    })
}
