//! The seam between the API and whatever actually runs workflows.

use async_trait::async_trait;
use tracing::info;

use editor::document::{ExecutionRequest, ExecutionResponse};

/// Runs a validated workflow. `order` is the topological order of the
/// request's node ids.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn execute(&self, request: &ExecutionRequest, order: &[String]) -> ExecutionResponse;
}

/// Built-in backend: plans the run and reports the order without invoking
/// any integration.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanOnly;

#[async_trait]
impl ExecutionBackend for PlanOnly {
    async fn execute(&self, request: &ExecutionRequest, order: &[String]) -> ExecutionResponse {
        let total = order.len();
        let logs = order
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let kind = request
                    .nodes
                    .iter()
                    .find(|n| &n.id == id)
                    .map(|n| n.node_type.to_string())
                    .unwrap_or_default();
                format!("Step {}/{total}: {id} ({kind})", i + 1)
            })
            .collect();
        info!(steps = total, "workflow planned");
        ExecutionResponse::completed(logs)
    }
}
