//! Row structs that map 1-to-1 onto database tables.
//!
//! These are *persistence* models and carry no editor behaviour.
//! The graph document type lives in the `editor` crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted workflow row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkflowRow {
    pub id: i64,
    pub name: String,
    /// Serialized graph document (`{nodes, connections}`) as JSON text.
    pub data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowRow {
    /// Parse `data` back into JSON.
    pub fn data_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.data)
    }
}
