use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::AppState;
use crate::ApiError;
use db::{models::WorkflowRow, repository::workflows as wf_repo};
use editor::document::{SaveWorkflowReply, SaveWorkflowRequest, WorkflowList, WorkflowRecord, WorkflowReply};

fn record(row: WorkflowRow) -> Result<WorkflowRecord, ApiError> {
    Ok(WorkflowRecord {
        data: row.data_json()?,
        id: row.id,
        name: row.name,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<WorkflowList>, ApiError> {
    let workflows = wf_repo::list_workflows(&state.pool)
        .await?
        .into_iter()
        .map(record)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(WorkflowList { success: true, workflows, message: None }))
}

#[instrument(skip(state))]
pub async fn get(Path(id): Path<i64>, State(state): State<AppState>) -> Result<Json<WorkflowReply>, ApiError> {
    let row = wf_repo::get_workflow(&state.pool, id).await?;
    Ok(Json(WorkflowReply {
        success: true,
        id: Some(row.id),
        data: Some(row.data_json()?),
        name: Some(row.name),
        message: None,
    }))
}

/// Insert, or overwrite when the body carries an `id`.
#[instrument(skip(state, payload), fields(id = ?payload.id, name = %payload.name))]
pub async fn save(
    State(state): State<AppState>,
    Json(payload): Json<SaveWorkflowRequest>,
) -> Result<Json<SaveWorkflowReply>, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Workflow name is required".into()));
    }
    let data = serde_json::to_string(&payload.data)?;

    let row = match payload.id {
        Some(id) => wf_repo::update_workflow(&state.pool, id, name, &data).await?,
        None => wf_repo::create_workflow(&state.pool, name, &data).await?,
    };
    info!(id = row.id, nodes = payload.data.nodes.len(), "workflow saved");
    Ok(Json(SaveWorkflowReply { success: true, id: Some(row.id), message: None }))
}

#[instrument(skip(state))]
pub async fn delete(Path(id): Path<i64>, State(state): State<AppState>) -> Result<Json<SaveWorkflowReply>, ApiError> {
    wf_repo::delete_workflow(&state.pool, id).await?;
    info!(id, "workflow deleted");
    Ok(Json(SaveWorkflowReply { success: true, id: None, message: None }))
}
