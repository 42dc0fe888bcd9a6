use axum::{extract::State, Json};
use tracing::{instrument, warn};

use super::AppState;
use editor::dag;
use editor::document::{ExecutionRequest, ExecutionResponse};

/// Validate the graph and hand it to the execution backend.
///
/// Validation failures are reported in the body (`status: "failed"`), not
/// as HTTP errors, so the editor's console can show them.
#[instrument(skip_all, fields(nodes = request.nodes.len(), edges = request.edges.len()))]
pub async fn execute(State(state): State<AppState>, Json(request): Json<ExecutionRequest>) -> Json<ExecutionResponse> {
    if request.nodes.is_empty() {
        return Json(ExecutionResponse::failed("Workflow has no nodes", Vec::new()));
    }
    let order = match dag::request_order(&request) {
        Ok(order) => order,
        Err(err) => {
            warn!(error = %err, "workflow rejected");
            return Json(ExecutionResponse::failed(err.to_string(), Vec::new()));
        }
    };
    Json(state.backend.execute(&request, &order).await)
}
