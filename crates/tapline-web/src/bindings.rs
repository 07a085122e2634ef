#![forbid(unsafe_code)]

//! Deterministic host bindings between DOM-style pointer listeners and a
//! [`GestureEngine`].
//!
//! The host (JS glue, a test, or trace replay) owns the real listeners. This
//! module decides *which* listeners should exist and returns explicit
//! [`HostCommand`]s for the host to apply:
//! - pointer-down is listened for on the bound container only,
//! - pointer-move/up/cancel are listened for on the document, so motion and
//!   release outside the container are still observed,
//! - pointer capture is acquired when a session starts and released when it
//!   ends or is torn down.
//!
//! Binding is idempotent: binding the node that is already bound is a no-op,
//! and binding a different node detaches the previous one first. Binding
//! `None` detaches everything and tears down any in-flight session.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tapline_core::{
    ElementId, GestureAction, GestureConfig, GestureEngine, Instant, PointerEvent,
    PointerEventKind, PointerId, Region, Subscription, TrackerOutcome,
};
use tracing::{debug, trace};

/// Host-side identity of a DOM node (or any container surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

/// Where a host listener is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTarget {
    Container(NodeId),
    Document,
}

/// Pointer listener type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEventType {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
}

impl HostEventType {
    /// Listeners installed on the document rather than the container.
    const DOCUMENT: [Self; 3] = [Self::PointerMove, Self::PointerUp, Self::PointerCancel];
}

/// Command for the host to apply to its real listener and capture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Attach {
        target: ListenerTarget,
        event: HostEventType,
    },
    Detach {
        target: ListenerTarget,
        event: HostEventType,
    },
    AcquireCapture {
        pointer_id: PointerId,
    },
    ReleaseCapture {
        pointer_id: PointerId,
    },
}

/// A pointer event as delivered by a host listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostPointerEvent {
    pub event: PointerEvent,
    /// Node whose listener received the event. Container listeners report
    /// the container; document listeners report `None`.
    pub target: Option<NodeId>,
}

impl HostPointerEvent {
    /// Event received by the container's pointer-down listener.
    #[must_use]
    pub const fn on_container(event: PointerEvent, container: NodeId) -> Self {
        Self {
            event,
            target: Some(container),
        }
    }

    /// Event received by a document-level listener.
    #[must_use]
    pub const fn on_document(event: PointerEvent) -> Self {
        Self {
            event,
            target: None,
        }
    }
}

/// Deterministic reason why a host event was not forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingIgnoredReason {
    /// No container is bound.
    Unbound,
    /// Pointer-down that did not arrive through the bound container.
    OutsideContainer,
}

/// Outcome category for one host event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOutcome {
    Forwarded(TrackerOutcome),
    Ignored(BindingIgnoredReason),
}

/// Result of one host event dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingDispatch {
    /// Actions dispatched on the bus while handling the event.
    pub actions: Vec<GestureAction>,
    pub commands: Vec<HostCommand>,
    pub outcome: BindingOutcome,
}

impl BindingDispatch {
    fn ignored(reason: BindingIgnoredReason) -> Self {
        Self {
            actions: Vec::new(),
            commands: Vec::new(),
            outcome: BindingOutcome::Ignored(reason),
        }
    }

    /// True when the event was dropped here or by the tracker.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(
            self.outcome,
            BindingOutcome::Ignored(_) | BindingOutcome::Forwarded(TrackerOutcome::Ignored(_))
        )
    }
}

/// Pointer listener wiring for one gesture engine.
#[derive(Debug)]
pub struct PointerBindings {
    engine: GestureEngine,
    container: Option<NodeId>,
}

impl PointerBindings {
    /// Unbound bindings around `engine`.
    #[must_use]
    pub fn new(engine: GestureEngine) -> Self {
        Self {
            engine,
            container: None,
        }
    }

    /// Unbound bindings around a fresh engine.
    #[must_use]
    pub fn with_config(config: GestureConfig) -> Self {
        Self::new(GestureEngine::new(config))
    }

    /// Bind to `node`, or unbind with `None`.
    ///
    /// Returns the listener changes the host must apply, in order.
    pub fn bind_container(&mut self, node: Option<NodeId>) -> Vec<HostCommand> {
        if node == self.container {
            return Vec::new();
        }

        let mut commands = Vec::with_capacity(8);
        if let Some(previous) = self.container.take() {
            debug!(node = previous.0, "detaching container");
            commands.push(HostCommand::Detach {
                target: ListenerTarget::Container(previous),
                event: HostEventType::PointerDown,
            });
            commands.extend(HostEventType::DOCUMENT.map(|event| HostCommand::Detach {
                target: ListenerTarget::Document,
                event,
            }));
        }

        match node {
            Some(node) => {
                debug!(node = node.0, "binding container");
                commands.push(HostCommand::Attach {
                    target: ListenerTarget::Container(node),
                    event: HostEventType::PointerDown,
                });
                commands.extend(HostEventType::DOCUMENT.map(|event| HostCommand::Attach {
                    target: ListenerTarget::Document,
                    event,
                }));
                self.container = Some(node);
            }
            None => {
                let pointer = self.engine.tracker().active_pointer();
                if self.engine.teardown() {
                    debug!("in-flight session torn down on unbind");
                }
                commands.extend(pointer.map(|pointer_id| HostCommand::ReleaseCapture { pointer_id }));
            }
        }
        commands
    }

    /// Route one host event to the engine.
    pub fn dispatch(&mut self, host: &HostPointerEvent, now: Instant) -> BindingDispatch {
        let Some(container) = self.container else {
            trace!(kind = ?host.event.kind, "ignored: unbound");
            return BindingDispatch::ignored(BindingIgnoredReason::Unbound);
        };
        if host.event.kind == PointerEventKind::Down && host.target != Some(container) {
            trace!(target = ?host.target, "ignored: pointer-down outside container");
            return BindingDispatch::ignored(BindingIgnoredReason::OutsideContainer);
        }

        let dispatch = self.engine.handle(&host.event, now);
        let pointer_id = host.event.pointer_id;
        let commands = match dispatch.outcome {
            TrackerOutcome::SessionStarted => vec![HostCommand::AcquireCapture { pointer_id }],
            TrackerOutcome::SessionEnded => vec![HostCommand::ReleaseCapture { pointer_id }],
            _ => Vec::new(),
        };
        BindingDispatch {
            actions: dispatch.actions,
            commands,
            outcome: BindingOutcome::Forwarded(dispatch.outcome),
        }
    }

    /// Fire due timers. Call on every host tick.
    pub fn poll(&mut self, now: Instant) -> Option<GestureAction> {
        self.engine.poll(now)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.engine.next_deadline()
    }

    /// Delay to hand the host's `setTimeout` before the next [`poll`](Self::poll).
    #[must_use]
    pub fn poll_timeout(&self, now: Instant) -> Option<Duration> {
        self.engine.poll_timeout(now)
    }

    pub fn register_element(&mut self, id: impl Into<ElementId>, region: Option<Region>) {
        self.engine.register_element(id, region);
    }

    pub fn subscribe(&self, listener: impl Fn(&GestureAction) + 'static) -> Subscription {
        self.engine.subscribe(listener)
    }

    #[must_use]
    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.container.is_some()
    }

    #[must_use]
    pub fn engine(&self) -> &GestureEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GestureEngine {
        &mut self.engine
    }
}
