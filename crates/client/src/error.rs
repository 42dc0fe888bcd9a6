use thiserror::Error;

use editor::EditorError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 401 or 403 from the service.
    #[error("session expired, please sign in again")]
    Unauthorized,

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The service answered `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("Please enter a workflow name")]
    MissingName,

    #[error("Save the workflow first")]
    NotSaved,
}
