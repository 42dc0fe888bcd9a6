//! The graph editor state machine.
//!
//! `GraphEditor` owns one workflow graph plus everything needed to author it:
//! mode, pending connection, selection, drag gesture, viewport and history.
//! Every method is a synchronous state transition; rendering happens by
//! draining (or subscribing to) the [`EditorEvent`] stream.

use std::fmt;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use nodes::{Category, Integration, IntegrationStatus, NoIntegrations, NodeType, ToolDescriptor};

use crate::config::EditorConfig;
use crate::dag;
use crate::document::{
    ConnectionDocument, ExecutionEdge, ExecutionNode, ExecutionRequest, ExecutionResponse, ExecutionStatus,
    GraphDocument, NodeDocument,
};
use crate::error::EditorError;
use crate::events::{EditorEvent, EventQueue, Notice};
use crate::geometry::{clamp_position, input_anchor, output_anchor, BezierPath, Point, Rect, Viewport};
use crate::history::{History, HistoryEntry, NodeFields};
use crate::models::{Connection, CreateOptions, Mode, Node, NodeEdit, Position, Size};

/// Interactive yes/no prompt used by destructive operations.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// A pre-answered prompt.
impl Confirm for bool {
    fn confirm(&mut self, _message: &str) -> bool {
        *self
    }
}

/// A non-blocking problem with the current graph, reported before a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    MissingIntegration { node_id: String, integration: Integration },
    Cycle,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIntegration { node_id, integration } => write!(
                f,
                "{node_id} needs the {integration} integration. Connect it before running this workflow"
            ),
            Self::Cycle => f.write_str("Workflow contains a cycle; some steps may never run"),
        }
    }
}

/// An in-progress pointer drag. Released by `end_drag` or `cancel_drag`.
#[derive(Debug, Clone, PartialEq)]
struct DragGesture {
    node_id: String,
    start: Position,
    /// Pointer position relative to the node's top-left corner.
    grab: Point,
}

pub struct GraphEditor {
    id: Uuid,
    config: EditorConfig,
    surface: Option<Size>,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    counter: u64,
    selected: Option<String>,
    mode: Mode,
    pending: Option<String>,
    viewport: Viewport,
    drag: Option<DragGesture>,
    history: History,
    events: EventQueue,
    integrations: Box<dyn IntegrationStatus>,
}

impl fmt::Debug for GraphEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphEditor")
            .field("id", &self.id)
            .field("nodes", &self.nodes.len())
            .field("connections", &self.connections.len())
            .field("mode", &self.mode)
            .field("scale", &self.viewport.scale())
            .finish()
    }
}

impl Default for GraphEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl GraphEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            viewport: Viewport::from_config(&config),
            history: History::new(config.history_limit),
            config,
            surface: None,
            nodes: Vec::new(),
            connections: Vec::new(),
            counter: 0,
            selected: None,
            mode: Mode::default(),
            pending: None,
            drag: None,
            events: EventQueue::new(),
            integrations: Box::new(NoIntegrations),
        }
    }

    /// Use `status` to decide which integration advisories apply.
    pub fn with_integrations(mut self, status: impl IntegrationStatus + 'static) -> Self {
        self.integrations = Box::new(status);
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn selected(&self) -> Option<&Node> {
        self.selected.as_deref().and_then(|id| self.node(id))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Source of the armed connection gesture, if any.
    pub fn pending_source(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scale(&self) -> f64 {
        self.viewport.scale()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&EditorEvent) + Send + 'static,
    {
        self.events.subscribe(callback);
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain()
    }

    /// Report a notice through the event stream. Used by collaborators
    /// (e.g. a persistence session) that have no state of their own to show.
    pub fn notify(&mut self, notice: Notice) {
        self.events.emit(EditorEvent::Notice(notice));
    }

    // -----------------------------------------------------------------------
    // Surface
    // -----------------------------------------------------------------------

    pub fn mount(&mut self, surface: Size) {
        debug!(editor = %self.id, width = surface.width, height = surface.height, "surface mounted");
        self.surface = Some(surface);
        self.events.emit(EditorEvent::Mounted);
    }

    pub fn unmount(&mut self) {
        if self.surface.take().is_some() {
            self.drag = None;
            self.events.emit(EditorEvent::Unmounted);
        }
    }

    fn bounds(&self) -> Size {
        self.surface.unwrap_or(self.config.surface)
    }

    fn clamp(&self, position: Position) -> Position {
        clamp_position(position, self.bounds(), self.config.node_size)
    }

    // -----------------------------------------------------------------------
    // Create / duplicate
    // -----------------------------------------------------------------------

    /// Drop `tool` centred under canvas point `point`.
    ///
    /// Returns `None` without side effects when the surface is not mounted.
    pub fn create_node(&mut self, tool: &ToolDescriptor, point: Point, options: CreateOptions) -> Option<&Node> {
        if self.surface.is_none() {
            debug!(editor = %self.id, tool = %tool.name, "create ignored: surface not mounted");
            return None;
        }
        if self.pending.is_some() {
            self.cancel_pending(true);
        }

        let footprint = self.config.node_size;
        let position = self.clamp(Position::new(
            point.x - footprint.width / 2.0,
            point.y - footprint.height / 2.0,
        ));
        let id = self.next_id();
        let node = Node::from_tool(id.clone(), tool, position);
        debug!(editor = %self.id, node = %id, node_type = %node.node_type, "node created");
        self.nodes.push(node.clone());
        self.events.emit(EditorEvent::NodeAdded { id: id.clone() });

        let mut created = Vec::new();
        if let Some(source) = options.connect_from {
            let connection = Connection::new(source, id.clone());
            match self.check_connection(&connection) {
                Ok(()) => {
                    self.add_connection(connection.clone(), true);
                    created.push(connection);
                }
                Err(err) => {
                    warn!(editor = %self.id, error = %err, "drop connection skipped");
                    self.events.emit(EditorEvent::Notice(Notice::warning(err.to_string())));
                }
            }
        }

        self.history.push(HistoryEntry::Create { node: node.clone(), connections: created });
        self.warn_missing_integration(&node);
        self.set_selected(Some(id));
        self.nodes.last()
    }

    /// [`GraphEditor::create_node`] for a drop measured in client space.
    pub fn drop_tool(
        &mut self,
        tool: &ToolDescriptor,
        client: Point,
        canvas_rect: &Rect,
        options: CreateOptions,
    ) -> Option<&Node> {
        let point = self.viewport.client_to_canvas(client, canvas_rect);
        self.create_node(tool, point, options)
    }

    /// Clone a node under a fresh id, offset so it does not hide the
    /// original. Connections are not copied.
    pub fn duplicate_node(&mut self, id: &str) -> Result<&Node, EditorError> {
        let Some(original) = self.node(id).cloned() else {
            return self.reject(EditorError::UnknownNode(id.to_string()));
        };
        let offset = self.config.duplicate_offset;
        let mut copy = original;
        copy.id = self.next_id();
        copy.position = self.clamp(copy.position.offset(offset, offset));
        debug!(editor = %self.id, from = %id, node = %copy.id, "node duplicated");

        let new_id = copy.id.clone();
        self.nodes.push(copy.clone());
        self.events.emit(EditorEvent::NodeAdded { id: new_id.clone() });
        self.history.push(HistoryEntry::Create { node: copy, connections: Vec::new() });
        self.events.emit(EditorEvent::Notice(Notice::info("Node duplicated")));
        self.set_selected(Some(new_id));
        self.nodes.last().ok_or_else(|| EditorError::UnknownNode(id.to_string()))
    }

    fn next_id(&mut self) -> String {
        loop {
            // A loaded id like `node-18446744073709551615` can saturate the
            // counter; start over from the bottom and skip ids in use.
            self.counter = self.counter.checked_add(1).unwrap_or(1);
            let id = format!("node-{}", self.counter);
            if self.node(&id).is_none() {
                return id;
            }
        }
    }

    fn warn_missing_integration(&mut self, node: &Node) {
        if let Some(integration) = node.node_type.required_integration() {
            if !self.integrations.is_connected(integration) {
                let advisory = Advisory::MissingIntegration { node_id: node.id.clone(), integration };
                self.events.emit(EditorEvent::Notice(Notice::warning(advisory.to_string())));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Drag
    // -----------------------------------------------------------------------

    /// Start dragging `id`; `pointer` is in canvas space.
    pub fn begin_drag(&mut self, id: &str, pointer: Point) -> Result<(), EditorError> {
        if self.surface.is_none() {
            return Ok(());
        }
        let Some(node) = self.node(id) else {
            return self.reject(EditorError::UnknownNode(id.to_string()));
        };
        let gesture = DragGesture {
            node_id: id.to_string(),
            start: node.position,
            grab: Point::new(pointer.x - node.position.left, pointer.y - node.position.top),
        };
        if self.drag.is_some() {
            self.end_drag();
        }
        self.drag = Some(gesture);
        self.events.emit(EditorEvent::DragStarted { id: id.to_string() });
        Ok(())
    }

    /// Follow the pointer. Every attached edge is re-routed on each step.
    pub fn drag_to(&mut self, pointer: Point) -> Option<Position> {
        let (node_id, grab) = {
            let gesture = self.drag.as_ref()?;
            (gesture.node_id.clone(), gesture.grab)
        };
        let position = self.clamp(Position::new(pointer.x - grab.x, pointer.y - grab.y));
        self.set_position(&node_id, position);
        Some(position)
    }

    /// Release the pointer. Returns whether a move was recorded.
    pub fn end_drag(&mut self) -> bool {
        let Some(gesture) = self.drag.take() else {
            return false;
        };
        self.events.emit(EditorEvent::DragEnded { id: gesture.node_id.clone() });
        let Some(end) = self.node(&gesture.node_id).map(|n| n.position) else {
            return false;
        };
        if end == gesture.start {
            return false;
        }
        debug!(editor = %self.id, node = %gesture.node_id, left = end.left, top = end.top, "node moved");
        self.history.push(HistoryEntry::Move { node_id: gesture.node_id, from: gesture.start, to: end });
        true
    }

    /// Abort the drag and put the node back where it started.
    pub fn cancel_drag(&mut self) {
        if let Some(gesture) = self.drag.take() {
            self.set_position(&gesture.node_id, gesture.start);
            self.events.emit(EditorEvent::DragEnded { id: gesture.node_id });
        }
    }

    /// Move a node in one step, as a drag from its current position.
    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), EditorError> {
        let Some(from) = self.node(id).map(|n| n.position) else {
            return self.reject(EditorError::UnknownNode(id.to_string()));
        };
        let to = self.clamp(position);
        if to == from {
            return Ok(());
        }
        self.set_position(id, to);
        self.history.push(HistoryEntry::Move { node_id: id.to_string(), from, to });
        Ok(())
    }

    fn set_position(&mut self, id: &str, position: Position) {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return;
        };
        if node.position == position {
            return;
        }
        node.position = position;
        self.events.emit(EditorEvent::NodeMoved { id: id.to_string(), position });
        self.reroute(id);
    }

    fn reroute(&mut self, id: &str) {
        for (connection, path) in self.paths_for(id) {
            self.events.emit(EditorEvent::ConnectionRerouted { connection, path });
        }
    }

    // -----------------------------------------------------------------------
    // Selection / clicks / connect
    // -----------------------------------------------------------------------

    pub fn select_node(&mut self, id: &str) -> Result<(), EditorError> {
        if self.node(id).is_none() {
            return self.reject(EditorError::UnknownNode(id.to_string()));
        }
        self.set_selected(Some(id.to_string()));
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.set_selected(None);
    }

    fn set_selected(&mut self, selected: Option<String>) {
        if self.selected != selected {
            self.selected = selected.clone();
            self.events.emit(EditorEvent::SelectionChanged { selected });
        }
    }

    /// A click on a node: selects it, or drives the connect gesture in
    /// connect mode.
    pub fn click_node(&mut self, id: &str) -> Result<(), EditorError> {
        if self.node(id).is_none() {
            return self.reject(EditorError::UnknownNode(id.to_string()));
        }
        match (self.mode, self.pending.clone()) {
            (Mode::Connect, None) => {
                let valid_targets = self.nodes.iter().filter(|n| n.id != id).map(|n| n.id.clone()).collect();
                self.pending = Some(id.to_string());
                self.events.emit(EditorEvent::PendingConnection { source: Some(id.to_string()), valid_targets });
                self.events.emit(EditorEvent::Notice(Notice::info("Now click another node to connect")));
                Ok(())
            }
            (Mode::Connect, Some(source)) => self.connect(&source, id),
            _ => self.select_node(id),
        }
    }

    /// A click on empty canvas cancels a pending connection and closes the
    /// property panel.
    pub fn click_canvas(&mut self) {
        if self.pending.is_some() {
            self.cancel_pending(true);
        }
        self.clear_selection();
    }

    fn cancel_pending(&mut self, announce: bool) {
        if self.pending.take().is_some() {
            self.events.emit(EditorEvent::PendingConnection { source: None, valid_targets: Vec::new() });
            if announce {
                self.events.emit(EditorEvent::Notice(Notice::warning("Connection cancelled")));
            }
        }
    }

    /// Connect `source` to `target`. The pending gesture is cleared whatever
    /// the outcome.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<(), EditorError> {
        self.cancel_pending(false);
        let connection = Connection::new(source, target);
        if let Err(err) = self.check_connection(&connection) {
            return self.reject(err);
        }
        debug!(editor = %self.id, source, target, "nodes connected");
        self.add_connection(connection.clone(), true);
        self.history.push(HistoryEntry::Connect { connection });
        self.events.emit(EditorEvent::Notice(Notice::success("Nodes connected")));
        Ok(())
    }

    fn check_connection(&self, connection: &Connection) -> Result<(), EditorError> {
        for id in [&connection.source, &connection.target] {
            if self.node(id).is_none() {
                return Err(EditorError::UnknownNode(id.clone()));
            }
        }
        if connection.source == connection.target {
            return Err(EditorError::SelfConnection);
        }
        if self.connections.contains(connection) {
            return Err(EditorError::DuplicateConnection {
                from: connection.source.clone(),
                to: connection.target.clone(),
            });
        }
        Ok(())
    }

    fn add_connection(&mut self, connection: Connection, animate: bool) {
        let path = self.connection_path(&connection);
        self.connections.push(connection.clone());
        self.events.emit(EditorEvent::ConnectionAdded { connection, path, animate });
    }

    fn remove_connection(&mut self, connection: &Connection) {
        let before = self.connections.len();
        self.connections.retain(|c| c != connection);
        if self.connections.len() != before {
            self.events.emit(EditorEvent::ConnectionRemoved { connection: connection.clone() });
        }
    }

    // -----------------------------------------------------------------------
    // Delete / edit
    // -----------------------------------------------------------------------

    /// Remove a node and every connection touching it, after confirmation.
    #[instrument(skip_all, fields(editor = %self.id, node = %id))]
    pub fn delete_node(&mut self, id: &str, mut confirm: impl Confirm) -> Result<(), EditorError> {
        let Some(title) = self.node(id).map(|n| n.title.clone()) else {
            return self.reject(EditorError::UnknownNode(id.to_string()));
        };
        if !confirm.confirm(&format!("Delete \"{title}\"?")) {
            debug!("delete declined");
            return Err(EditorError::Cancelled);
        }
        if let Some((index, node, connections)) = self.detach_node(id) {
            debug!(removed_connections = connections.len(), "node deleted");
            self.history.push(HistoryEntry::Delete { node, index, connections });
        }
        Ok(())
    }

    /// Take a node and its connections out of the graph.
    fn detach_node(&mut self, id: &str) -> Option<(usize, Node, Vec<Connection>)> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        if self.drag.as_ref().is_some_and(|d| d.node_id == id) {
            self.drag = None;
        }
        if self.pending.as_deref() == Some(id) {
            self.cancel_pending(false);
        }

        let (removed, kept): (Vec<_>, Vec<_>) = self.connections.drain(..).partition(|c| c.touches(id));
        self.connections = kept;
        for connection in &removed {
            self.events.emit(EditorEvent::ConnectionRemoved { connection: connection.clone() });
        }

        let node = self.nodes.remove(index);
        self.events.emit(EditorEvent::NodeRemoved { id: id.to_string() });
        if self.selected.as_deref() == Some(id) {
            self.set_selected(None);
        }
        Some((index, node, removed))
    }

    /// Put a detached node back, then every connection whose endpoints exist.
    fn attach_node(&mut self, node: Node, index: usize, connections: &[Connection]) {
        let id = node.id.clone();
        let index = index.min(self.nodes.len());
        self.nodes.insert(index, node);
        self.events.emit(EditorEvent::NodeAdded { id });
        for connection in connections {
            if self.check_connection(connection).is_ok() {
                self.add_connection(connection.clone(), false);
            }
        }
    }

    /// Update title, description and config. Blank text keeps the previous
    /// value.
    pub fn edit_node(&mut self, id: &str, edit: NodeEdit) -> Result<(), EditorError> {
        let Some(node) = self.node(id) else {
            return self.reject(EditorError::UnknownNode(id.to_string()));
        };
        if let Some(config) = &edit.config {
            if let Err(err) = node.node_type.validate_config(config) {
                return self.reject(err.into());
            }
        }

        let from = NodeFields::of(node);
        let mut to = from.clone();
        if let Some(title) = edit.title.filter(|t| !t.trim().is_empty()) {
            to.title = title;
        }
        if let Some(description) = edit.description.filter(|d| !d.trim().is_empty()) {
            to.description = description;
        }
        if let Some(config) = edit.config {
            to.config = config;
        }
        if to == from {
            return Ok(());
        }

        self.apply_fields(id, &to);
        self.history.push(HistoryEntry::Edit { node_id: id.to_string(), from, to });
        self.events.emit(EditorEvent::Notice(Notice::success("Node updated")));
        Ok(())
    }

    fn apply_fields(&mut self, id: &str, fields: &NodeFields) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            fields.apply_to(node);
            self.events.emit(EditorEvent::NodeUpdated { id: id.to_string() });
            if self.selected.as_deref() == Some(id) {
                // Refresh the open property panel.
                self.events.emit(EditorEvent::SelectionChanged { selected: Some(id.to_string()) });
            }
        }
    }

    // -----------------------------------------------------------------------
    // Undo / redo
    // -----------------------------------------------------------------------

    /// Reverse the most recent action. Returns `false` on an empty history.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.take_undo() else {
            return false;
        };
        debug!(editor = %self.id, kind = entry.kind(), "undo");
        match entry {
            HistoryEntry::Create { node, .. } => {
                self.detach_node(&node.id);
            }
            HistoryEntry::Delete { node, index, connections } => self.attach_node(node, index, &connections),
            HistoryEntry::Move { node_id, from, .. } => self.set_position(&node_id, from),
            HistoryEntry::Edit { node_id, from, .. } => self.apply_fields(&node_id, &from),
            HistoryEntry::Connect { connection } => self.remove_connection(&connection),
        }
        true
    }

    /// Re-apply the most recently undone action.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.take_redo() else {
            return false;
        };
        debug!(editor = %self.id, kind = entry.kind(), "redo");
        match entry {
            HistoryEntry::Create { node, connections } => {
                let end = self.nodes.len();
                self.attach_node(node, end, &connections);
            }
            HistoryEntry::Delete { node, .. } => {
                self.detach_node(&node.id);
            }
            HistoryEntry::Move { node_id, to, .. } => self.set_position(&node_id, to),
            HistoryEntry::Edit { node_id, to, .. } => self.apply_fields(&node_id, &to),
            HistoryEntry::Connect { connection } => {
                if self.check_connection(&connection).is_ok() {
                    self.add_connection(connection, false);
                }
            }
        }
        true
    }

    // -----------------------------------------------------------------------
    // Mode / zoom
    // -----------------------------------------------------------------------

    pub fn set_mode(&mut self, mode: Mode) {
        self.cancel_pending(false);
        self.mode = mode;
        debug!(editor = %self.id, ?mode, "mode changed");
        self.events.emit(EditorEvent::ModeChanged { mode });
        self.events.emit(EditorEvent::Notice(Notice::info(mode.hint())));
    }

    /// Scroll-wheel over the canvas. Only zoom mode reacts.
    pub fn wheel(&mut self, delta_y: f64) -> Option<f64> {
        if self.mode != Mode::Zoom {
            return None;
        }
        let before = self.viewport.scale();
        let scale = self.viewport.wheel(delta_y);
        self.zoom_changed(before);
        Some(scale)
    }

    pub fn zoom_in(&mut self) -> f64 {
        let before = self.viewport.scale();
        self.viewport.zoom_in();
        self.zoom_changed(before)
    }

    pub fn zoom_out(&mut self) -> f64 {
        let before = self.viewport.scale();
        self.viewport.zoom_out();
        self.zoom_changed(before)
    }

    pub fn reset_zoom(&mut self) -> f64 {
        let before = self.viewport.scale();
        self.viewport.reset();
        self.zoom_changed(before)
    }

    fn zoom_changed(&mut self, before: f64) -> f64 {
        let scale = self.viewport.scale();
        if scale != before {
            self.events.emit(EditorEvent::ZoomChanged { scale });
        }
        scale
    }

    // -----------------------------------------------------------------------
    // Paths
    // -----------------------------------------------------------------------

    /// Curve from the source's output anchor to the target's input anchor.
    pub fn connection_path(&self, connection: &Connection) -> Option<BezierPath> {
        let source = self.node(&connection.source)?;
        let target = self.node(&connection.target)?;
        let size = self.config.node_size;
        Some(BezierPath::between(
            output_anchor(source.position, size),
            input_anchor(target.position, size),
            self.config.curve_padding,
        ))
    }

    /// Paths of every connection attached to `node_id`.
    pub fn paths_for(&self, node_id: &str) -> Vec<(Connection, BezierPath)> {
        self.connections
            .iter()
            .filter(|c| c.touches(node_id))
            .filter_map(|c| self.connection_path(c).map(|p| (c.clone(), p)))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    pub fn serialize(&self) -> GraphDocument {
        GraphDocument {
            nodes: self.nodes.iter().map(NodeDocument::from).collect(),
            connections: self.connections.iter().map(ConnectionDocument::from).collect(),
        }
    }

    /// Replace the graph with `document`.
    ///
    /// Duplicate node ids reject the whole document and leave the editor
    /// untouched. Connections are only emitted after `NodesMounted`; invalid
    /// ones are skipped with a warning. History and selection are reset.
    #[instrument(skip_all, fields(editor = %self.id, nodes = document.nodes.len()))]
    pub fn load(&mut self, document: GraphDocument) -> Result<(), EditorError> {
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = document.nodes.iter().find(|n| !seen.insert(n.id.as_str())) {
            let err = EditorError::DuplicateNodeId(dup.id.clone());
            return self.reject(err);
        }

        self.reset();
        for doc in document.nodes {
            let node = Node::from(doc);
            if let Some(n) = numeric_suffix(&node.id) {
                self.counter = self.counter.max(n);
            }
            let id = node.id.clone();
            self.nodes.push(node);
            self.events.emit(EditorEvent::NodeAdded { id });
        }
        self.events.emit(EditorEvent::NodesMounted);

        let mut skipped = 0usize;
        for doc in document.connections {
            let connection = Connection::from(doc);
            match self.check_connection(&connection) {
                Ok(()) => self.add_connection(connection, false),
                Err(err) => {
                    warn!(error = %err, source = %connection.source, target = %connection.target, "connection skipped");
                    skipped += 1;
                }
            }
        }
        if skipped > 0 {
            self.events.emit(EditorEvent::Notice(Notice::warning(format!(
                "Skipped {skipped} invalid connection(s)"
            ))));
        }
        debug!(connections = self.connections.len(), "document loaded");
        Ok(())
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.counter = 0;
        self.drag = None;
        self.cancel_pending(false);
        self.set_selected(None);
        self.history.clear();
        self.events.emit(EditorEvent::Cleared);
    }

    /// Remove every node and connection, after confirmation.
    pub fn clear(&mut self, mut confirm: impl Confirm) -> Result<(), EditorError> {
        if !confirm.confirm("Clear the entire canvas?") {
            return Err(EditorError::Cancelled);
        }
        self.reset();
        self.events.emit(EditorEvent::Notice(Notice::info("Canvas cleared")));
        Ok(())
    }

    /// Replace the graph with the demo workflow, after confirmation.
    pub fn load_demo(&mut self, mut confirm: impl Confirm) -> Result<(), EditorError> {
        if !confirm.confirm("Reset to the demo workflow? Unsaved changes are lost.") {
            return Err(EditorError::Cancelled);
        }
        self.load(demo_workflow())
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    /// Problems worth showing before a run. None of them block it.
    pub fn advisories(&self) -> Vec<Advisory> {
        let mut advisories: Vec<Advisory> = self
            .nodes
            .iter()
            .filter_map(|n| {
                let integration = n.node_type.required_integration()?;
                (!self.integrations.is_connected(integration))
                    .then(|| Advisory::MissingIntegration { node_id: n.id.clone(), integration })
            })
            .collect();

        let ids: Vec<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let edges: Vec<(&str, &str)> = self
            .connections
            .iter()
            .map(|c| (c.source.as_str(), c.target.as_str()))
            .collect();
        if let Err(EditorError::CycleDetected) = dag::execution_order(&ids, &edges) {
            advisories.push(Advisory::Cycle);
        }
        advisories
    }

    /// Flatten the graph into an execution request. Advisories are reported
    /// as warnings; only an empty graph is refused.
    #[instrument(skip_all, fields(editor = %self.id))]
    pub fn run_graph(&mut self) -> Result<ExecutionRequest, EditorError> {
        if self.nodes.is_empty() {
            return self.reject(EditorError::EmptyGraph);
        }
        for advisory in self.advisories() {
            self.events.emit(EditorEvent::Notice(Notice::warning(advisory.to_string())));
        }
        let request = ExecutionRequest {
            nodes: self
                .nodes
                .iter()
                .map(|n| ExecutionNode { id: n.id.clone(), node_type: n.node_type.clone(), config: n.config.clone() })
                .collect(),
            edges: self
                .connections
                .iter()
                .map(|c| ExecutionEdge { from: c.source.clone(), to: c.target.clone() })
                .collect(),
        };
        info!(nodes = request.nodes.len(), edges = request.edges.len(), "workflow submitted");
        self.events.emit(EditorEvent::Console(format!(
            "Running workflow with {} node(s)...",
            request.nodes.len()
        )));
        Ok(request)
    }

    /// Print an execution reply to the console panel.
    pub fn show_execution(&mut self, response: &ExecutionResponse) {
        let status = match response.status {
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
        };
        self.events.emit(EditorEvent::Console(format!("Status: {status}")));
        if let Some(message) = &response.message {
            self.events.emit(EditorEvent::Console(message.clone()));
        }
        for line in &response.logs {
            self.events.emit(EditorEvent::Console(line.clone()));
        }
        let notice = match response.status {
            ExecutionStatus::Completed => Notice::success("Workflow executed successfully"),
            ExecutionStatus::Failed => Notice::error(
                response.message.clone().unwrap_or_else(|| "Workflow execution failed".to_string()),
            ),
        };
        self.events.emit(EditorEvent::Notice(notice));
    }

    fn reject<T>(&mut self, err: EditorError) -> Result<T, EditorError> {
        warn!(editor = %self.id, error = %err, "input rejected");
        self.events.emit(EditorEvent::Notice(Notice::warning(err.to_string())));
        Err(err)
    }
}

/// Trailing number of an id such as `node-12`.
fn numeric_suffix(id: &str) -> Option<u64> {
    id.rsplit('-').next()?.parse().ok()
}

/// The starter graph shown to new users: a POS order and a webhook both
/// feeding a Slack notification.
pub fn demo_workflow() -> GraphDocument {
    let node = |id: &str, title: &str, description: &str, category: Category, node_type: NodeType, left, top| {
        NodeDocument {
            id: id.to_string(),
            title: title.to_string(),
            category,
            left,
            top,
            description: description.to_string(),
            config: node_type.default_config(),
            node_type: Some(node_type),
            icon: None,
        }
    };
    GraphDocument {
        nodes: vec![
            node(
                "node-1",
                "New order",
                "Sync new orders from the POS every five minutes.",
                Category::Trigger,
                NodeType::Custom,
                300.0,
                220.0,
            ),
            node("node-2", "Webhook", "Receive events from the POS", Category::Trigger, NodeType::MakeWebhook, 550.0, 220.0),
            node(
                "node-3",
                "Slack notify",
                "Send a message to #retail-ops when a VIP order exceeds limit.",
                Category::Custom,
                NodeType::SlackNotify,
                425.0,
                400.0,
            ),
        ],
        connections: vec![
            ConnectionDocument { source: "node-1".into(), target: "node-3".into() },
            ConnectionDocument { source: "node-2".into(), target: "node-3".into() },
        ],
    }
}
