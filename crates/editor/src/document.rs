//! Persisted graph documents and the JSON contract with the workflow service.
//!
//! `GraphDocument` is what `serialize`/`load` exchange with the store. The
//! loader is lenient: it also accepts the shape written by the scenario
//! builder (`edges` with `from`/`to`, `x`/`y`, numeric ids).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use nodes::{Category, NodeType};

use crate::models::{Connection, Node, Position};

/// Accept `"node-3"` or `3`; numbers become `node-N`.
fn node_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => format!("node-{n}"),
    })
}

fn untitled() -> String {
    "Untitled block".to_string()
}

// ---------------------------------------------------------------------------
// GraphDocument
// ---------------------------------------------------------------------------

/// Where nodes without stored coordinates are placed: a left-to-right row.
const LAYOUT_ORIGIN: Position = Position { left: 150.0, top: 200.0 };
const LAYOUT_SPACING: f64 = 280.0;

/// Persisted shape of one node.
///
/// Deserialized through [`GraphDocument`], which knows each node's index
/// and can lay out nodes that were stored without coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDocument {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub left: f64,
    pub top: f64,
    pub description: String,
    /// Absent in documents saved before node types existed; inferred from
    /// the title on load.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct StoredPoint {
    x: Option<f64>,
    y: Option<f64>,
}

/// A node as it may appear in storage: `left`/`top`, `x`/`y` or a nested
/// `position: {x, y}`, any of them possibly missing.
#[derive(Debug, Deserialize)]
struct StoredNode {
    #[serde(deserialize_with = "node_id")]
    id: String,
    #[serde(default = "untitled")]
    title: String,
    #[serde(default)]
    category: Category,
    #[serde(default, alias = "x")]
    left: Option<f64>,
    #[serde(default, alias = "y")]
    top: Option<f64>,
    #[serde(default)]
    position: Option<StoredPoint>,
    #[serde(default)]
    description: String,
    #[serde(rename = "type", default)]
    node_type: Option<NodeType>,
    #[serde(default)]
    config: Map<String, Value>,
    #[serde(default)]
    icon: Option<String>,
}

impl StoredNode {
    fn into_document(self, index: usize) -> NodeDocument {
        let nested = self.position.unwrap_or(StoredPoint { x: None, y: None });
        let left = nested
            .x
            .or(self.left)
            .unwrap_or(LAYOUT_ORIGIN.left + index as f64 * LAYOUT_SPACING);
        let top = nested.y.or(self.top).unwrap_or(LAYOUT_ORIGIN.top);
        NodeDocument {
            id: self.id,
            title: self.title,
            category: self.category,
            left,
            top,
            description: self.description,
            node_type: self.node_type,
            config: self.config,
            icon: self.icon,
        }
    }
}

impl From<&Node> for NodeDocument {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            title: node.title.clone(),
            category: node.category,
            left: node.position.left,
            top: node.position.top,
            description: node.description.clone(),
            node_type: Some(node.node_type.clone()),
            config: node.config.clone(),
            icon: Some(node.icon.clone()),
        }
    }
}

impl From<NodeDocument> for Node {
    fn from(doc: NodeDocument) -> Self {
        let node_type = match doc.node_type {
            Some(node_type) => node_type.resolve(),
            None => NodeType::infer(&doc.title),
        };
        Self {
            icon: doc
                .icon
                .unwrap_or_else(|| doc.category.default_icon().to_string()),
            id: doc.id,
            title: doc.title,
            description: doc.description,
            category: doc.category,
            node_type,
            config: doc.config,
            position: Position::new(doc.left, doc.top),
        }
    }
}

/// Persisted shape of one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDocument {
    #[serde(alias = "from", deserialize_with = "node_id")]
    pub source: String,
    #[serde(alias = "to", deserialize_with = "node_id")]
    pub target: String,
}

impl From<&Connection> for ConnectionDocument {
    fn from(c: &Connection) -> Self {
        Self {
            source: c.source.clone(),
            target: c.target.clone(),
        }
    }
}

impl From<ConnectionDocument> for Connection {
    fn from(c: ConnectionDocument) -> Self {
        Connection::new(c.source, c.target)
    }
}

/// A whole graph as stored in the `data` field of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredGraph")]
pub struct GraphDocument {
    pub nodes: Vec<NodeDocument>,
    pub connections: Vec<ConnectionDocument>,
}

#[derive(Deserialize)]
struct StoredGraph {
    #[serde(default)]
    nodes: Vec<StoredNode>,
    #[serde(default, alias = "edges")]
    connections: Vec<ConnectionDocument>,
}

impl From<StoredGraph> for GraphDocument {
    fn from(stored: StoredGraph) -> Self {
        Self {
            nodes: stored
                .nodes
                .into_iter()
                .enumerate()
                .map(|(index, node)| node.into_document(index))
                .collect(),
            connections: stored.connections,
        }
    }
}

impl GraphDocument {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Execution contract
// ---------------------------------------------------------------------------

/// One node of an execution request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub config: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionEdge {
    pub from: String,
    pub to: String,
}

/// Body of `POST /api/workflow/execute`. Node ids are sent unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub nodes: Vec<ExecutionNode>,
    #[serde(default)]
    pub edges: Vec<ExecutionEdge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    #[serde(alias = "success")]
    Completed,
    #[serde(alias = "error")]
    Failed,
}

/// Reply of the execution endpoint, shown in the console panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResponse {
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub logs: Vec<String>,
}

impl ExecutionResponse {
    pub fn completed(logs: Vec<String>) -> Self {
        Self { status: ExecutionStatus::Completed, message: None, logs }
    }

    pub fn failed(message: impl Into<String>, logs: Vec<String>) -> Self {
        Self {
            status: ExecutionStatus::Failed,
            message: Some(message.into()),
            logs,
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow store contract
// ---------------------------------------------------------------------------

/// A stored workflow as listed by `GET /api/workflows`.
///
/// `data` is kept as raw JSON; [`WorkflowRecord::document`] parses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub id: i64,
    pub name: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowRecord {
    pub fn document(&self) -> Result<GraphDocument, serde_json::Error> {
        GraphDocument::deserialize(&self.data)
    }
}

/// `GET /api/workflows` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowList {
    pub success: bool,
    #[serde(default)]
    pub workflows: Vec<WorkflowRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `GET /api/workflows/{id}` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `POST /api/workflows` body. With `id` the stored workflow is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveWorkflowRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub data: GraphDocument,
}

/// Reply of `POST /api/workflows` and `DELETE /api/workflows/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveWorkflowReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn persisted_node_shape() {
        let doc = NodeDocument {
            id: "node-1".into(),
            title: "New order".into(),
            category: Category::Trigger,
            left: 10.0,
            top: 20.0,
            description: "d".into(),
            node_type: None,
            config: Map::new(),
            icon: None,
        };
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "id": "node-1", "title": "New order", "category": "trigger",
                "left": 10.0, "top": 20.0, "description": "d"
            })
        );
    }

    #[test]
    fn scenario_shape_is_accepted() {
        let doc: GraphDocument = serde_json::from_value(json!({
            "nodes": [
                { "id": 1, "type": "google_sheet_read", "x": 150, "y": 200 },
                { "id": "node-2", "title": "Mail", "category": "integration" }
            ],
            "edges": [ { "from": 1, "to": "node-2" } ]
        }))
        .unwrap();
        assert_eq!(doc.nodes[0].id, "node-1");
        assert_eq!(doc.nodes[0].left, 150.0);
        assert_eq!(doc.nodes[0].title, "Untitled block");
        assert_eq!(doc.connections[0], ConnectionDocument { source: "node-1".into(), target: "node-2".into() });

        let mail: Node = doc.nodes[1].clone().into();
        assert_eq!(mail.node_type, NodeType::GmailSend);
        assert_eq!(mail.icon, "fas fa-plug");
    }

    #[test]
    fn nested_position_and_default_layout() {
        let doc: GraphDocument = serde_json::from_value(json!({
            "nodes": [
                { "id": 1, "type": "sheets_read", "position": { "x": 500, "y": 300 } },
                { "id": 2, "type": "send_mail" },
                { "id": 3, "type": "slack", "y": 90 }
            ],
            "edges": [ { "from": 1, "to": 2 }, { "from": 2, "to": 3 } ]
        }))
        .unwrap();
        let at: Vec<_> = doc.nodes.iter().map(|n| (n.left, n.top)).collect();
        assert_eq!(at, [(500.0, 300.0), (430.0, 200.0), (710.0, 90.0)]);
    }

    #[test]
    fn free_text_types_map_to_known_nodes() {
        let doc: GraphDocument = serde_json::from_value(json!({
            "nodes": [
                { "id": 1, "type": "sheets_read" },
                { "id": 2, "type": "send_mail" },
                { "id": 3, "type": "slack" },
                { "id": 4, "type": "crm_sync" }
            ]
        }))
        .unwrap();
        let types: Vec<NodeType> = doc.nodes.into_iter().map(|d| Node::from(d).node_type).collect();
        assert_eq!(
            types,
            [
                NodeType::GoogleSheetRead,
                NodeType::GmailSend,
                NodeType::SlackNotify,
                NodeType::Other("crm_sync".into())
            ]
        );
    }

    #[test]
    fn execution_status_aliases() {
        let r: ExecutionResponse =
            serde_json::from_value(json!({ "status": "error", "message": "Cycle detected in workflow!" })).unwrap();
        assert_eq!(r.status, ExecutionStatus::Failed);
        assert!(r.logs.is_empty());
        let r: ExecutionResponse = serde_json::from_value(json!({ "status": "completed", "logs": ["ok"] })).unwrap();
        assert_eq!(r.status, ExecutionStatus::Completed);
    }

    #[test]
    fn record_parses_its_document() {
        let record = WorkflowRecord {
            id: 7,
            name: "w".into(),
            data: json!({ "nodes": [{ "id": "node-1", "title": "A" }], "connections": [] }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(record.document().unwrap().nodes.len(), 1);
    }
}
