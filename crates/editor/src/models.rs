//! Core domain models for the graph editor.
//!
//! These types are the in-memory source of truth for a workflow being
//! authored. Their persisted shape lives in [`crate::document`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use nodes::{Category, NodeType, ToolDescriptor};

// ---------------------------------------------------------------------------
// Position / Size
// ---------------------------------------------------------------------------

/// Top-left corner of a node in unscaled canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
}

impl Position {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.left + dx, self.top + dy)
    }
}

/// Width/height pair, used for the canvas surface and the node footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A single step in the workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique within the graph; the join key for connections.
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub category: Category,
    pub node_type: NodeType,
    /// Open key/value map whose shape depends on `node_type`.
    pub config: Map<String, Value>,
    pub position: Position,
}

impl Node {
    /// Build a node from a palette tool; config starts at the type defaults.
    pub fn from_tool(id: impl Into<String>, tool: &ToolDescriptor, position: Position) -> Self {
        Self {
            id: id.into(),
            title: tool.name.clone(),
            description: tool.description.clone(),
            icon: tool.icon.clone(),
            category: tool.category,
            node_type: tool.node_type.clone(),
            config: tool.node_type.default_config(),
            position,
        }
    }

    /// Icon background colour, derived from the category.
    pub fn color(&self) -> &'static str {
        self.category.color()
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// Directed edge from one node to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub source: String,
    pub target: String,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Whether `node_id` is either endpoint.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Interaction intent; decides what a click on a node does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Cursor,
    Connect,
    Zoom,
}

impl Mode {
    /// Hint shown when the mode is activated.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Cursor => "Select mode activated - Click nodes to select and edit",
            Self::Connect => "Connect mode activated - Click nodes to connect them",
            Self::Zoom => "Zoom mode activated - Use mouse wheel to zoom in/out",
        }
    }
}

/// Fields changed by [`crate::GraphEditor::edit_node`]. `None` keeps the
/// current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub config: Option<Map<String, Value>>,
}

/// Options for [`crate::GraphEditor::create_node`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Connect the new node from this existing node.
    pub connect_from: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_tool_copies_palette_fields() {
        let tool = ToolDescriptor::new(
            "Gmail - Send Email",
            "Send personalized email",
            "fas fa-envelope",
            Category::Integration,
            NodeType::GmailSend,
        );
        let node = Node::from_tool("node-1", &tool, Position::new(10.0, 20.0));
        assert_eq!(node.title, "Gmail - Send Email");
        assert_eq!(node.color(), "#9c27b0");
        assert_eq!(node.config["subject"], "Workflow Notification");
    }

    #[test]
    fn connection_touches_either_end() {
        let c = Connection::new("a", "b");
        assert!(c.touches("a"));
        assert!(c.touches("b"));
        assert!(!c.touches("c"));
    }
}
