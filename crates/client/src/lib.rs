//! `client` crate: talks to the workflow service and binds an editor to it.
//!
//! [`WorkflowApi`] is the service contract; [`HttpClient`] implements it
//! over HTTP and [`mock::MockApi`] in memory. [`Session`] owns a
//! `GraphEditor` plus the identity of the workflow being edited and its
//! recent runs.

pub mod api;
pub mod error;
pub mod http;
pub mod mock;
pub mod session;

pub use api::{SavedWorkflow, WorkflowApi};
pub use error::ClientError;
pub use http::{ClientConfig, HttpClient};
pub use session::{RunRecord, Session, RUN_HISTORY_LIMIT};
