//! The `WorkflowApi` trait: the editor's view of the workflow service.

use async_trait::async_trait;

use editor::document::{SaveWorkflowRequest, WorkflowRecord};
use editor::{ExecutionRequest, ExecutionResponse, GraphDocument};

use crate::ClientError;

/// A stored workflow, with its data parsed into a graph document.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedWorkflow {
    pub id: i64,
    pub name: String,
    pub document: GraphDocument,
}

#[async_trait]
pub trait WorkflowApi: Send + Sync {
    async fn list(&self) -> Result<Vec<WorkflowRecord>, ClientError>;

    async fn get(&self, id: i64) -> Result<SavedWorkflow, ClientError>;

    /// Insert (no `id`) or overwrite; returns the stored id.
    async fn save(&self, request: &SaveWorkflowRequest) -> Result<i64, ClientError>;

    async fn delete(&self, id: i64) -> Result<(), ClientError>;

    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse, ClientError>;
}
