//! `Session`: one editor bound to the workflow service.
//!
//! Failures never touch the graph: they are reported as notices through the
//! editor's event stream and returned to the caller. Nothing is retried.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use editor::document::{SaveWorkflowRequest, WorkflowRecord};
use editor::{ExecutionResponse, ExecutionStatus, GraphEditor, Notice};

use crate::{ClientError, WorkflowApi};

/// Number of runs kept in [`Session::runs`].
pub const RUN_HISTORY_LIMIT: usize = 20;

/// One answered execution request, as listed in the run history panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    pub started_at: DateTime<Utc>,
    pub status: ExecutionStatus,
    pub duration_ms: i64,
}

#[derive(Debug)]
pub struct Session<A> {
    api: A,
    editor: GraphEditor,
    workflow_id: Option<i64>,
    name: Option<String>,
    runs: VecDeque<RunRecord>,
}

impl<A: WorkflowApi> Session<A> {
    pub fn new(api: A, editor: GraphEditor) -> Self {
        Self { api, editor, workflow_id: None, name: None, runs: VecDeque::new() }
    }

    pub fn editor(&self) -> &GraphEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut GraphEditor {
        &mut self.editor
    }

    /// Id of the stored workflow being edited, once saved or opened.
    pub fn workflow_id(&self) -> Option<i64> {
        self.workflow_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Answered runs, newest first.
    pub fn runs(&self) -> &VecDeque<RunRecord> {
        &self.runs
    }

    /// Start a new, unsaved workflow. The graph itself is left as is.
    pub fn detach(&mut self) {
        self.workflow_id = None;
        self.name = None;
    }

    fn fail<T>(&mut self, err: ClientError) -> Result<T, ClientError> {
        warn!(editor = %self.editor.id(), error = %err, "workflow request failed");
        let notice = match err {
            ClientError::MissingName | ClientError::NotSaved | ClientError::Editor(_) => Notice::warning(err.to_string()),
            _ => Notice::error(err.to_string()),
        };
        self.editor.notify(notice);
        Err(err)
    }

    #[instrument(skip(self), fields(editor = %self.editor.id()))]
    pub async fn list(&mut self) -> Result<Vec<WorkflowRecord>, ClientError> {
        match self.api.list().await {
            Ok(workflows) => Ok(workflows),
            Err(err) => self.fail(err),
        }
    }

    /// Save the current graph. `name` is required the first time; later
    /// saves overwrite the same workflow and may rename it.
    #[instrument(skip(self), fields(editor = %self.editor.id(), id = ?self.workflow_id))]
    pub async fn save(&mut self, name: Option<&str>) -> Result<i64, ClientError> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| self.name.clone());
        let Some(name) = name else {
            return self.fail(ClientError::MissingName);
        };

        let request = SaveWorkflowRequest {
            id: self.workflow_id,
            name: name.clone(),
            data: self.editor.serialize(),
        };
        match self.api.save(&request).await {
            Ok(id) => {
                info!(id, nodes = request.data.nodes.len(), "workflow saved");
                self.workflow_id = Some(id);
                self.name = Some(name);
                self.editor.notify(Notice::success("Workflow saved successfully"));
                Ok(id)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Replace the graph with a stored workflow.
    #[instrument(skip(self), fields(editor = %self.editor.id()))]
    pub async fn open(&mut self, id: i64) -> Result<(), ClientError> {
        let saved = match self.api.get(id).await {
            Ok(saved) => saved,
            Err(err) => return self.fail(err),
        };
        // `load` reports its own rejection notice.
        self.editor.load(saved.document)?;
        info!(id, "workflow opened");
        self.workflow_id = Some(saved.id);
        self.name = Some(saved.name.clone());
        self.editor.notify(Notice::success(format!("Loaded \"{}\"", saved.name)));
        Ok(())
    }

    /// Delete the stored workflow. The graph stays on the canvas as an
    /// unsaved draft.
    #[instrument(skip(self), fields(editor = %self.editor.id(), id = ?self.workflow_id))]
    pub async fn delete(&mut self) -> Result<(), ClientError> {
        let Some(id) = self.workflow_id else {
            return self.fail(ClientError::NotSaved);
        };
        match self.api.delete(id).await {
            Ok(()) => {
                info!(id, "workflow deleted");
                self.detach();
                self.editor.notify(Notice::success("Workflow deleted"));
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    /// Submit the graph for execution and show the reply in the console.
    #[instrument(skip(self), fields(editor = %self.editor.id()))]
    pub async fn run(&mut self) -> Result<ExecutionResponse, ClientError> {
        // `run_graph` reports its own rejection notice.
        let request = self.editor.run_graph()?;
        let started_at = Utc::now();
        match self.api.execute(&request).await {
            Ok(response) => {
                let duration_ms = (Utc::now() - started_at).num_milliseconds();
                info!(status = ?response.status, duration_ms, "run finished");
                self.runs.push_front(RunRecord { started_at, status: response.status, duration_ms });
                self.runs.truncate(RUN_HISTORY_LIMIT);
                self.editor.show_execution(&response);
                Ok(response)
            }
            Err(err) => self.fail(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Failure, MockApi};

    use editor::{EditorEvent, ExecutionStatus, NoticeLevel, Point, Size};
    use nodes::Catalog;

    fn session(api: &MockApi) -> Session<MockApi> {
        let mut editor = GraphEditor::default();
        editor.mount(Size::new(1600.0, 900.0));
        editor.load(editor::demo_workflow()).unwrap();
        editor.drain_events();
        Session::new(api.clone(), editor)
    }

    fn last_notice(session: &mut Session<MockApi>) -> Option<(NoticeLevel, String)> {
        session.editor_mut().drain_events().into_iter().rev().find_map(|e| match e {
            EditorEvent::Notice(n) => Some((n.level, n.message)),
            _ => None,
        })
    }

    #[tokio::test]
    async fn first_save_needs_a_name_then_overwrites() {
        let api = MockApi::new();
        let mut s = session(&api);

        assert!(matches!(s.save(None).await, Err(ClientError::MissingName)));
        assert_eq!(last_notice(&mut s).map(|n| n.0), Some(NoticeLevel::Warning));
        assert!(api.calls().is_empty());

        let id = s.save(Some("  Orders ")).await.unwrap();
        assert_eq!(s.workflow_id(), Some(id));
        assert_eq!(s.name(), Some("Orders"));

        s.editor_mut().move_node("node-1", editor::Position::new(0.0, 0.0)).unwrap();
        assert_eq!(s.save(None).await.unwrap(), id);
        let (name, stored) = api.stored(id).unwrap();
        assert_eq!(name, "Orders");
        assert_eq!(stored, s.editor().serialize());
    }

    #[tokio::test]
    async fn failed_save_leaves_the_session_unsaved() {
        let api = MockApi::new();
        let mut s = session(&api);
        api.fail_with(Failure::Reject("Database unavailable".into()));

        assert!(matches!(s.save(Some("Orders")).await, Err(ClientError::Rejected(_))));
        assert_eq!(s.workflow_id(), None);
        assert_eq!(last_notice(&mut s), Some((NoticeLevel::Error, "Database unavailable".into())));
        assert_eq!(s.editor().nodes().len(), 3);
    }

    #[tokio::test]
    async fn open_replaces_the_graph() {
        let api = MockApi::new();
        let mut first = session(&api);
        let id = first.save(Some("Demo")).await.unwrap();

        let mut editor = GraphEditor::default();
        editor.mount(Size::new(1600.0, 900.0));
        editor.create_node(&Catalog::builtin().tools()[0], Point::new(200.0, 200.0), Default::default());
        let mut second = Session::new(api.clone(), editor);

        second.open(id).await.unwrap();
        assert_eq!(second.workflow_id(), Some(id));
        assert_eq!(second.name(), Some("Demo"));
        assert_eq!(second.editor().serialize(), first.editor().serialize());
        assert!(!second.editor().history().can_undo());
    }

    #[tokio::test]
    async fn failed_open_keeps_the_current_graph() {
        let api = MockApi::new();
        let mut s = session(&api);
        let before = s.editor().serialize();

        assert!(matches!(s.open(7).await, Err(ClientError::Status { status: 404, .. })));
        assert_eq!(s.editor().serialize(), before);
        assert_eq!(last_notice(&mut s).map(|n| n.0), Some(NoticeLevel::Error));
    }

    #[tokio::test]
    async fn delete_requires_a_saved_workflow() {
        let api = MockApi::new();
        let mut s = session(&api);
        assert!(matches!(s.delete().await, Err(ClientError::NotSaved)));

        let id = s.save(Some("Temp")).await.unwrap();
        s.delete().await.unwrap();
        assert_eq!(s.workflow_id(), None);
        assert!(api.stored(id).is_none());
        assert_eq!(s.editor().nodes().len(), 3);
    }

    #[tokio::test]
    async fn run_shows_the_reply_in_the_console() {
        let api = MockApi::new();
        let mut s = session(&api);

        let response = s.run().await.unwrap();
        assert_eq!(response.status, ExecutionStatus::Completed);
        let console: Vec<_> = s
            .editor_mut()
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                EditorEvent::Console(line) => Some(line),
                _ => None,
            })
            .collect();
        assert_eq!(console[0], "Running workflow with 3 node(s)...");
        assert_eq!(&console[2..], ["node-1", "node-2", "node-3"]);
    }

    #[tokio::test]
    async fn answered_runs_are_kept_newest_first() {
        let api = MockApi::new();
        let mut s = session(&api);

        s.run().await.unwrap();
        s.editor_mut().connect("node-3", "node-1").unwrap();
        let reply = s.run().await.unwrap();
        assert_eq!(reply.status, ExecutionStatus::Failed);

        let statuses: Vec<_> = s.runs().iter().map(|r| r.status).collect();
        assert_eq!(statuses, [ExecutionStatus::Failed, ExecutionStatus::Completed]);
        assert!(s.runs()[0].started_at >= s.runs()[1].started_at);

        api.fail_with(Failure::Unauthorized);
        assert!(s.run().await.is_err());
        assert_eq!(s.runs().len(), 2);
    }

    #[tokio::test]
    async fn run_history_is_bounded() {
        let api = MockApi::new();
        let mut s = session(&api);
        for _ in 0..RUN_HISTORY_LIMIT + 3 {
            s.run().await.unwrap();
        }
        assert_eq!(s.runs().len(), RUN_HISTORY_LIMIT);
    }

    #[tokio::test]
    async fn unauthorized_is_reported_without_side_effects() {
        let api = MockApi::new();
        let mut s = session(&api);
        api.fail_with(Failure::Unauthorized);

        assert!(matches!(s.run().await, Err(ClientError::Unauthorized)));
        assert_eq!(
            last_notice(&mut s),
            Some((NoticeLevel::Error, "session expired, please sign in again".into()))
        );
        assert_eq!(api.calls(), vec!["execute"]);
    }

    #[tokio::test]
    async fn empty_graph_is_not_submitted() {
        let api = MockApi::new();
        let mut s = Session::new(api.clone(), GraphEditor::default());
        assert!(matches!(s.run().await, Err(ClientError::Editor(editor::EditorError::EmptyGraph))));
        assert!(api.calls().is_empty());
    }
}
