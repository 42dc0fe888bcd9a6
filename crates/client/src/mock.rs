//! `MockApi`: an in-memory `WorkflowApi` for tests.
//!
//! Clones share state, so a test can keep a handle while a `Session` owns
//! another and inspect the calls afterwards.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use editor::document::{SaveWorkflowRequest, WorkflowRecord};
use editor::{dag, ExecutionRequest, ExecutionResponse, GraphDocument};

use crate::{ClientError, SavedWorkflow, WorkflowApi};

/// How the next calls should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Answer `success: false` with this message.
    Reject(String),
    Unauthorized,
}

#[derive(Debug, Default)]
struct State {
    workflows: BTreeMap<i64, (String, GraphDocument)>,
    next_id: i64,
    failure: Option<Failure>,
    calls: Vec<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<State>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail until [`MockApi::recover`].
    pub fn fail_with(&self, failure: Failure) {
        self.lock().failure = Some(failure);
    }

    pub fn recover(&self) {
        self.lock().failure = None;
    }

    /// Names of the trait methods called, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn stored(&self, id: i64) -> Option<(String, GraphDocument)> {
        self.lock().workflows.get(&id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self, call: &'static str) -> Result<MutexGuard<'_, State>, ClientError> {
        let mut state = self.lock();
        state.calls.push(call);
        match state.failure.clone() {
            Some(Failure::Reject(message)) => Err(ClientError::Rejected(message)),
            Some(Failure::Unauthorized) => Err(ClientError::Unauthorized),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl WorkflowApi for MockApi {
    async fn list(&self) -> Result<Vec<WorkflowRecord>, ClientError> {
        let state = self.begin("list")?;
        let now = Utc::now();
        state
            .workflows
            .iter()
            .map(|(id, (name, document))| -> Result<WorkflowRecord, ClientError> {
                Ok(WorkflowRecord {
                    id: *id,
                    name: name.clone(),
                    data: serde_json::to_value(document)?,
                    created_at: now,
                    updated_at: now,
                })
            })
            .collect()
    }

    async fn get(&self, id: i64) -> Result<SavedWorkflow, ClientError> {
        let state = self.begin("get")?;
        let (name, document) = state
            .workflows
            .get(&id)
            .cloned()
            .ok_or_else(|| ClientError::Status { status: 404, message: "Workflow not found".into() })?;
        Ok(SavedWorkflow { id, name, document })
    }

    async fn save(&self, request: &SaveWorkflowRequest) -> Result<i64, ClientError> {
        let mut state = self.begin("save")?;
        let id = match request.id {
            Some(id) if state.workflows.contains_key(&id) => id,
            Some(_) => return Err(ClientError::Status { status: 404, message: "Workflow not found".into() }),
            None => {
                state.next_id += 1;
                state.next_id
            }
        };
        state.workflows.insert(id, (request.name.clone(), request.data.clone()));
        Ok(id)
    }

    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        let mut state = self.begin("delete")?;
        state
            .workflows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ClientError::Status { status: 404, message: "Workflow not found".into() })
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse, ClientError> {
        let _state = self.begin("execute")?;
        Ok(match dag::request_order(request) {
            Ok(order) => ExecutionResponse::completed(order),
            Err(err) => ExecutionResponse::failed(err.to_string(), Vec::new()),
        })
    }
}
