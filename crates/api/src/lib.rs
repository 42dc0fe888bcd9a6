//! `api` crate: HTTP REST API for saved workflows.
//!
//! Exposes:
//!   GET    /api/workflows
//!   GET    /api/workflows/{id}
//!   POST   /api/workflows
//!   DELETE /api/workflows/{id}
//!   POST   /api/workflow/execute

pub mod backend;
pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

pub use backend::{ExecutionBackend, PlanOnly};
pub use error::ApiError;
pub use handlers::{router, AppState};

/// Bind `addr` and serve the API until the process is stopped.
pub async fn serve(addr: SocketAddr, pool: db::DbPool) -> std::io::Result<()> {
    let state = AppState { pool, backend: Arc::new(PlanOnly) };
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "workflow API listening");
    axum::serve(listener, router(state)).await
}
