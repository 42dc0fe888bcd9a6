//! Events the editor publishes to its render layer.
//!
//! The editor never touches a renderer directly. Each state transition
//! appends events to an ordered queue; subscribers are invoked immediately
//! and the renderer may also drain the queue once per frame.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::BezierPath;
use crate::models::{Connection, Mode, Position};

/// Severity of a user-facing toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.level, self.message)
    }
}

/// A state change the render layer must reflect.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    Mounted,
    Unmounted,
    NodeAdded { id: String },
    NodeRemoved { id: String },
    NodeMoved { id: String, position: Position },
    /// Title, description or config changed.
    NodeUpdated { id: String },
    /// Every node of a loaded document is in place; edges follow.
    NodesMounted,
    /// `animate` asks for the dash-offset draw-in transition.
    ConnectionAdded {
        connection: Connection,
        path: Option<BezierPath>,
        animate: bool,
    },
    ConnectionRemoved { connection: Connection },
    /// An attached edge must be redrawn (emitted on every drag step).
    ConnectionRerouted {
        connection: Connection,
        path: BezierPath,
    },
    /// Property panel shows this node, or closes on `None`.
    SelectionChanged { selected: Option<String> },
    /// Connect gesture armed (`source` set) or cleared (`None`).
    PendingConnection {
        source: Option<String>,
        valid_targets: Vec<String>,
    },
    DragStarted { id: String },
    DragEnded { id: String },
    ModeChanged { mode: Mode },
    ZoomChanged { scale: f64 },
    Cleared,
    Notice(Notice),
    /// A line for the run console panel.
    Console(String),
}

type Subscriber = Box<dyn FnMut(&EditorEvent) + Send>;

/// Ordered event queue with immediate subscribers.
#[derive(Default)]
pub struct EventQueue {
    queue: VecDeque<EditorEvent>,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("queued", &self.queue.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked synchronously for every event.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&EditorEvent) + Send + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    pub fn emit(&mut self, event: EditorEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
        self.queue.push_back(event);
    }

    /// Take every queued event in emission order.
    pub fn drain(&mut self) -> Vec<EditorEvent> {
        self.queue.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn subscribers_see_events_before_drain() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut q = EventQueue::new();
        q.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

        q.emit(EditorEvent::Mounted);
        q.emit(EditorEvent::Notice(Notice::info("hi")));

        assert_eq!(seen.lock().unwrap().len(), 2);
        let drained = q.drain();
        assert_eq!(drained[0], EditorEvent::Mounted);
        assert!(q.is_empty());
    }
}
