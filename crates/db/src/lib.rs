//! `db` crate: the persistence layer.
//!
//! Provides a SQLite connection pool, the workflow row struct, and one
//! repository function per statement. No editor logic lives here; the graph
//! document is stored as opaque JSON text.

pub mod error;
pub mod models;
pub mod pool;
pub mod repository;

pub use error::DbError;
pub use models::WorkflowRow;
pub use pool::{create_pool, memory_pool, run_migrations, DbPool};
