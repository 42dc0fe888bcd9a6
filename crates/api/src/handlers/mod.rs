//! Route table and shared handler state.

pub mod executions;
pub mod workflows;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::ExecutionBackend;

#[derive(Clone)]
pub struct AppState {
    pub pool: db::DbPool,
    pub backend: Arc<dyn ExecutionBackend>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/workflows", get(workflows::list).post(workflows::save))
        .route("/api/workflows/:id", get(workflows::get).delete(workflows::delete))
        .route("/api/workflow/execute", post(executions::execute))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlanOnly;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Router {
        let pool = db::memory_pool().await.unwrap();
        router(AppState { pool, backend: Arc::new(PlanOnly) })
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn graph() -> Value {
        json!({
            "nodes": [
                { "id": "node-1", "title": "New order", "category": "trigger", "left": 10, "top": 10, "description": "" },
                { "id": "node-2", "title": "Slack notify", "category": "custom", "left": 10, "top": 200, "description": "" }
            ],
            "connections": [ { "source": "node-1", "target": "node-2" } ]
        })
    }

    #[tokio::test]
    async fn save_get_list_delete_round_trip() {
        let app = app().await;

        let (status, saved) = call(&app, "POST", "/api/workflows", Some(json!({ "name": "Orders", "data": graph() }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["success"], true);
        let id = saved["id"].as_i64().unwrap();

        let (status, got) = call(&app, "GET", &format!("/api/workflows/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(got["name"], "Orders");
        assert_eq!(got["data"]["nodes"][1]["id"], "node-2");
        assert_eq!(got["data"]["connections"][0]["target"], "node-2");

        let (_, listed) = call(&app, "GET", "/api/workflows", None).await;
        assert_eq!(listed["success"], true);
        assert_eq!(listed["workflows"].as_array().unwrap().len(), 1);
        assert!(listed["workflows"][0]["created_at"].is_string());

        let (status, deleted) = call(&app, "DELETE", &format!("/api/workflows/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted, json!({ "success": true }));

        let (status, missing) = call(&app, "GET", &format!("/api/workflows/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(missing["success"], false);
    }

    #[tokio::test]
    async fn save_with_id_updates_in_place() {
        let app = app().await;
        let (_, saved) = call(&app, "POST", "/api/workflows", Some(json!({ "name": "v1", "data": graph() }))).await;
        let id = saved["id"].as_i64().unwrap();

        let (status, again) = call(
            &app,
            "POST",
            "/api/workflows",
            Some(json!({ "id": id, "name": "v2", "data": { "nodes": [], "connections": [] } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["id"], id);

        let (_, listed) = call(&app, "GET", "/api/workflows", None).await;
        assert_eq!(listed["workflows"].as_array().unwrap().len(), 1);
        assert_eq!(listed["workflows"][0]["name"], "v2");
    }

    #[tokio::test]
    async fn save_requires_a_name() {
        let app = app().await;
        let (status, body) = call(&app, "POST", "/api/workflows", Some(json!({ "name": "  ", "data": graph() }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Workflow name is required");
    }

    #[tokio::test]
    async fn updating_or_deleting_a_missing_workflow_is_404() {
        let app = app().await;
        let (status, _) = call(&app, "POST", "/api/workflows", Some(json!({ "id": 99, "name": "x", "data": graph() }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "DELETE", "/api/workflows/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn execute_plans_in_topological_order() {
        let app = app().await;
        let (status, body) = call(
            &app,
            "POST",
            "/api/workflow/execute",
            Some(json!({
                "nodes": [
                    { "id": "node-2", "type": "slack_notify", "config": {} },
                    { "id": "node-1", "type": "custom", "config": {} }
                ],
                "edges": [ { "from": "node-1", "to": "node-2" } ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed");
        assert_eq!(
            body["logs"],
            json!(["Step 1/2: node-1 (custom)", "Step 2/2: node-2 (slack_notify)"])
        );
    }

    #[tokio::test]
    async fn execute_reports_cycles_as_failed() {
        let app = app().await;
        let (status, body) = call(
            &app,
            "POST",
            "/api/workflow/execute",
            Some(json!({
                "nodes": [ { "id": "a", "type": "custom" }, { "id": "b", "type": "custom" } ],
                "edges": [ { "from": "a", "to": "b" }, { "from": "b", "to": "a" } ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "failed");
        assert_eq!(body["message"], "Cycle detected in workflow!");
    }
}
