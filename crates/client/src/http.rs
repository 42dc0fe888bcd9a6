//! `HttpClient`: `WorkflowApi` over the REST endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use editor::document::{SaveWorkflowReply, SaveWorkflowRequest, WorkflowList, WorkflowRecord, WorkflowReply};
use editor::{ExecutionRequest, ExecutionResponse, GraphDocument};

use crate::{ClientError, SavedWorkflow, WorkflowApi};

/// Where the workflow service lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Per-request timeout in seconds. There are no retries.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Map the HTTP status, then decode the body.
async fn read<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ClientError::Unauthorized);
    }
    let body = resp.text().await?;
    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);
        return Err(ClientError::Status { status: status.as_u16(), message });
    }
    Ok(serde_json::from_str(&body)?)
}

fn rejected(message: Option<String>) -> ClientError {
    ClientError::Rejected(message.unwrap_or_else(|| "Request failed".to_string()))
}

#[async_trait]
impl WorkflowApi for HttpClient {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<WorkflowRecord>, ClientError> {
        let resp = self.client.get(self.url("/api/workflows")).send().await?;
        let list: WorkflowList = read(resp).await?;
        if !list.success {
            return Err(rejected(list.message));
        }
        Ok(list.workflows)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<SavedWorkflow, ClientError> {
        let resp = self.client.get(self.url(&format!("/api/workflows/{id}"))).send().await?;
        let reply: WorkflowReply = read(resp).await?;
        if !reply.success {
            return Err(rejected(reply.message));
        }
        let document = match reply.data {
            Some(data) => GraphDocument::deserialize(data)?,
            None => GraphDocument::default(),
        };
        Ok(SavedWorkflow {
            id: reply.id.unwrap_or(id),
            name: reply.name.unwrap_or_default(),
            document,
        })
    }

    #[instrument(skip_all, fields(id = ?request.id, name = %request.name))]
    async fn save(&self, request: &SaveWorkflowRequest) -> Result<i64, ClientError> {
        let resp = self.client.post(self.url("/api/workflows")).json(request).send().await?;
        let reply: SaveWorkflowReply = read(resp).await?;
        match (reply.success, reply.id) {
            (true, Some(id)) => {
                debug!(id, "workflow saved");
                Ok(id)
            }
            (true, None) => request.id.ok_or_else(|| rejected(Some("Server returned no workflow id".into()))),
            (false, _) => Err(rejected(reply.message)),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        let resp = self.client.delete(self.url(&format!("/api/workflows/{id}"))).send().await?;
        let reply: SaveWorkflowReply = read(resp).await?;
        if !reply.success {
            return Err(rejected(reply.message));
        }
        Ok(())
    }

    #[instrument(skip_all, fields(nodes = request.nodes.len()))]
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse, ClientError> {
        let resp = self.client.post(self.url("/api/workflow/execute")).json(request).send().await?;
        read(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::{http::StatusCode as AxumStatus, routing::get, Router};
    use editor::{ExecutionStatus, GraphEditor};

    async fn spawn(app: Router) -> HttpClient {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        HttpClient::new(&ClientConfig::new(format!("http://{addr}/"))).unwrap()
    }

    async fn service() -> HttpClient {
        let pool = db::memory_pool().await.unwrap();
        spawn(api::router(api::AppState { pool, backend: Arc::new(api::PlanOnly) })).await
    }

    #[tokio::test]
    async fn save_list_get_delete_against_the_service() {
        let client = service().await;
        let document = editor::demo_workflow();

        let id = client
            .save(&SaveWorkflowRequest { id: None, name: "Demo".into(), data: document.clone() })
            .await
            .unwrap();

        let listed = client.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].document().unwrap(), document);

        let saved = client.get(id).await.unwrap();
        assert_eq!(saved.name, "Demo");
        assert_eq!(saved.document, document);

        client.delete(id).await.unwrap();
        assert!(matches!(client.get(id).await, Err(ClientError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn execute_returns_the_plan() {
        let client = service().await;
        let mut editor = GraphEditor::default();
        editor.load(editor::demo_workflow()).unwrap();
        let request = editor.run_graph().unwrap();

        let response = client.execute(&request).await.unwrap();
        assert_eq!(response.status, ExecutionStatus::Completed);
        assert_eq!(response.logs.len(), 3);
    }

    #[tokio::test]
    async fn server_messages_surface_in_errors() {
        let client = service().await;
        let err = client
            .save(&SaveWorkflowRequest { id: None, name: String::new(), data: GraphDocument::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 400, ref message } if message == "Workflow name is required"));
    }

    #[tokio::test]
    async fn forbidden_maps_to_unauthorized() {
        let app = Router::new().route("/api/workflows", get(|| async { AxumStatus::FORBIDDEN }));
        let client = spawn(app).await;
        assert!(matches!(client.list().await, Err(ClientError::Unauthorized)));
    }
}
