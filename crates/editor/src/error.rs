//! Editor-level error types.

use thiserror::Error;

/// Errors produced by the graph editor (user input + document validation).
///
/// Every variant is recoverable: the editor reports it to the user as a
/// notice and leaves its state as it was.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditorError {
    // ------ Gesture / input errors ------

    /// An operation named a node that is not on the canvas.
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// Source and target of a connection are the same node.
    #[error("Cannot connect node to itself")]
    SelfConnection,

    /// The ordered pair is already connected.
    #[error("Connection already exists")]
    DuplicateConnection { from: String, to: String },

    /// The user declined the confirmation prompt.
    #[error("action cancelled")]
    Cancelled,

    /// A config value was rejected by the node type.
    #[error(transparent)]
    InvalidConfig(#[from] nodes::CatalogError),

    /// Nothing to run.
    #[error("Add at least one node before running the workflow")]
    EmptyGraph,

    // ------ Document validation errors ------

    /// Two or more nodes share the same ID.
    #[error("duplicate node ID: '{0}'")]
    DuplicateNodeId(String),

    /// An edge references a node ID that doesn't exist in the graph.
    #[error("edge references unknown node '{node_id}' ({side} side)")]
    UnknownNodeReference {
        node_id: String,
        side: &'static str,
    },

    /// Topological ordering found a cycle.
    #[error("Cycle detected in workflow!")]
    CycleDetected,
}

/// Rejected editor settings.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid editor config: {0}")]
    Parse(String),

    #[error("zoom limits must be positive with min_zoom <= max_zoom (got {min}..{max})")]
    ZoomRange { min: f64, max: f64 },

    #[error("zoom_step must be positive (got {0})")]
    ZoomStep(f64),
}
