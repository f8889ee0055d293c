//! DOM Events
//!
//! Native event listeners and three-phase dispatch (capture, target, bubble).
//!
//! Listeners are reference-counted closures compared by identity, so the same
//! [`Listener`] handle can be attached, looked up and detached again.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{Document, DomError, DomResult, DomTree, NodeId};

/// Event phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// A dispatched event
#[derive(Debug, Clone)]
pub struct Event {
    event_type: String,
    pub bubbles: bool,
    pub cancelable: bool,
    target: NodeId,
    current_target: NodeId,
    phase: EventPhase,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
    in_passive_listener: bool,
}

impl Event {
    /// Create a bubbling, cancelable event
    pub fn new(event_type: impl Into<String>) -> Self {
        Self::with_options(event_type, true, true)
    }

    pub fn with_options(event_type: impl Into<String>, bubbles: bool, cancelable: bool) -> Self {
        Self {
            event_type: event_type.into(),
            bubbles,
            cancelable,
            target: NodeId::NONE,
            current_target: NodeId::NONE,
            phase: EventPhase::None,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            in_passive_listener: false,
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Node the event was dispatched to
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Node whose listener is currently running
    pub fn current_target(&self) -> NodeId {
        self.current_target
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    /// Prevent default action; ignored for passive listeners
    pub fn prevent_default(&mut self) {
        if self.cancelable && !self.in_passive_listener {
            self.default_prevented = true;
        }
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Event listener callback, compared by identity
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&mut Event)>);

impl Listener {
    pub fn new(callback: impl Fn(&mut Event) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Whether both handles point at the same callback
    #[inline]
    pub fn ptr_eq(&self, other: &Listener) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    pub fn call(&self, event: &mut Event) {
        (self.0)(event)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0))
    }
}

impl<F: Fn(&mut Event) + 'static> From<F> for Listener {
    fn from(callback: F) -> Self {
        Self::new(callback)
    }
}

/// Event listener options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub passive: bool,
}

impl ListenerOptions {
    pub fn capture() -> Self {
        Self {
            capture: true,
            ..Self::default()
        }
    }

    pub fn passive() -> Self {
        Self {
            passive: true,
            ..Self::default()
        }
    }
}

/// Listener attached to a node
#[derive(Debug, Clone)]
pub struct RegisteredListener {
    pub event_type: String,
    pub listener: Listener,
    pub options: ListenerOptions,
}

impl DomTree {
    /// Attach a native listener
    ///
    /// Returns `false` when the same (type, listener, capture) triple is
    /// already attached; the DOM never attaches a listener twice.
    pub fn add_event_listener(
        &mut self,
        id: NodeId,
        event_type: &str,
        listener: Listener,
        options: ListenerOptions,
    ) -> DomResult<bool> {
        let node = self.get_mut(id).ok_or(DomError::NotFound(id))?;
        let duplicate = node.listeners.iter().any(|l| {
            l.event_type == event_type && l.listener == listener && l.options.capture == options.capture
        });
        if duplicate {
            return Ok(false);
        }
        node.listeners.push(RegisteredListener {
            event_type: event_type.to_string(),
            listener,
            options,
        });
        Ok(true)
    }

    /// Detach a native listener; returns whether one was removed
    pub fn remove_event_listener(
        &mut self,
        id: NodeId,
        event_type: &str,
        listener: &Listener,
        capture: bool,
    ) -> bool {
        let Some(node) = self.get_mut(id) else {
            return false;
        };
        let before = node.listeners.len();
        node.listeners.retain(|l| {
            !(l.event_type == event_type && &l.listener == listener && l.options.capture == capture)
        });
        node.listeners.len() != before
    }

    pub fn has_event_listener(&self, id: NodeId, event_type: &str, listener: &Listener, capture: bool) -> bool {
        self.get(id).is_some_and(|node| {
            node.listeners.iter().any(|l| {
                l.event_type == event_type && &l.listener == listener && l.options.capture == capture
            })
        })
    }

    /// Number of native listeners on a node, optionally for one type
    pub fn listener_count(&self, id: NodeId, event_type: Option<&str>) -> usize {
        self.get(id).map_or(0, |node| {
            node.listeners
                .iter()
                .filter(|l| event_type.is_none_or(|t| l.event_type == t))
                .count()
        })
    }

    /// Snapshot of the listeners that fire on `id` for `event_type` in `phase`
    fn listeners_for(&self, id: NodeId, event_type: &str, phase: EventPhase) -> Vec<RegisteredListener> {
        self.get(id).map_or_else(Vec::new, |node| {
            node.listeners
                .iter()
                .filter(|l| l.event_type == event_type)
                .filter(|l| match phase {
                    EventPhase::Capturing => l.options.capture,
                    EventPhase::Bubbling => !l.options.capture,
                    _ => true,
                })
                .cloned()
                .collect()
        })
    }
}

/// Dispatch `event` at `target`
///
/// The document is only borrowed between listener calls, so listeners may
/// mutate the tree. Returns `false` if a listener prevented the default.
pub fn dispatch_event(document: &RefCell<Document>, target: NodeId, event: &mut Event) -> bool {
    let path = {
        let doc = document.borrow();
        if !doc.tree.is_live(target) {
            tracing::warn!("Dispatching {} to stale node {}", event.event_type, target);
            return true;
        }
        doc.tree.ancestors(target)
    };

    event.target = target;
    event.propagation_stopped = false;
    event.immediate_propagation_stopped = false;
    event.default_prevented = false;

    tracing::trace!("Dispatching {} at {} (path length {})", event.event_type, target, path.len());

    for &node in path.iter().rev() {
        invoke(document, node, event, EventPhase::Capturing);
        if event.propagation_stopped {
            return finish(event);
        }
    }

    invoke(document, target, event, EventPhase::AtTarget);

    if event.bubbles {
        for &node in &path {
            if event.propagation_stopped {
                break;
            }
            invoke(document, node, event, EventPhase::Bubbling);
        }
    }

    finish(event)
}

fn invoke(document: &RefCell<Document>, node: NodeId, event: &mut Event, phase: EventPhase) {
    if event.propagation_stopped {
        return;
    }
    let listeners = document.borrow().tree.listeners_for(node, &event.event_type, phase);
    event.current_target = node;
    event.phase = phase;

    for registered in listeners {
        if event.immediate_propagation_stopped {
            break;
        }
        // Skip listeners removed by an earlier listener of this dispatch
        let still_attached = document.borrow().tree.has_event_listener(
            node,
            &event.event_type,
            &registered.listener,
            registered.options.capture,
        );
        if !still_attached {
            continue;
        }
        event.in_passive_listener = registered.options.passive;
        registered.listener.call(event);
        event.in_passive_listener = false;
    }
}

fn finish(event: &mut Event) -> bool {
    event.phase = EventPhase::None;
    event.current_target = NodeId::NONE;
    !event.default_prevented
}
