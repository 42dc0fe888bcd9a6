//! Undo/redo history.
//!
//! A linear, last-writer-wins history: recording a new action discards the
//! redo future. Entries carry structured snapshots rather than rendered
//! markup, so replaying them does not depend on the renderer.

use std::collections::VecDeque;

use serde_json::{Map, Value};

use crate::models::{Connection, Node, Position};

/// Title, description and config of a node at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFields {
    pub title: String,
    pub description: String,
    pub config: Map<String, Value>,
}

impl NodeFields {
    pub fn of(node: &Node) -> Self {
        Self {
            title: node.title.clone(),
            description: node.description.clone(),
            config: node.config.clone(),
        }
    }

    pub fn apply_to(&self, node: &mut Node) {
        node.title = self.title.clone();
        node.description = self.description.clone();
        node.config = self.config.clone();
    }
}

/// One reversible graph mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    /// A node was added (palette drop, duplicate), together with any
    /// connections created in the same gesture.
    Create {
        node: Node,
        connections: Vec<Connection>,
    },
    /// A node was removed along with every connection touching it.
    /// `index` is its former position in the node list.
    Delete {
        node: Node,
        index: usize,
        connections: Vec<Connection>,
    },
    Move {
        node_id: String,
        from: Position,
        to: Position,
    },
    Edit {
        node_id: String,
        from: NodeFields,
        to: NodeFields,
    },
    Connect {
        connection: Connection,
    },
}

impl HistoryEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Delete { .. } => "delete",
            Self::Move { .. } => "move",
            Self::Edit { .. } => "edit",
            Self::Connect { .. } => "connect",
        }
    }
}

/// Bounded undo stack plus redo stack.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a new action; clears the redo stack.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.redo.clear();
        self.push_undo(entry);
    }

    fn push_undo(&mut self, entry: HistoryEntry) {
        self.undo.push_back(entry);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }

    /// Take the most recent action for reversal; it moves to the redo stack.
    pub fn take_undo(&mut self) -> Option<HistoryEntry> {
        let entry = self.undo.pop_back()?;
        self.redo.push(entry.clone());
        Some(entry)
    }

    /// Take the most recently undone action for re-application; it moves
    /// back onto the undo stack without clearing the rest of the redo stack.
    pub fn take_redo(&mut self) -> Option<HistoryEntry> {
        let entry = self.redo.pop()?;
        self.push_undo(entry.clone());
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.undo.back()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
