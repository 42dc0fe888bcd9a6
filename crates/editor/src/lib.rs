//! `editor` crate: the workflow graph editor: models, geometry, history,
//! documents and the `GraphEditor` state machine.

pub mod config;
pub mod dag;
pub mod document;
pub mod editor;
pub mod error;
pub mod events;
pub mod geometry;
pub mod history;
pub mod models;

pub use config::EditorConfig;
pub use document::{ExecutionRequest, ExecutionResponse, ExecutionStatus, GraphDocument};
pub use editor::{demo_workflow, Advisory, Confirm, GraphEditor};
pub use error::{ConfigError, EditorError};
pub use events::{EditorEvent, Notice, NoticeLevel};
pub use geometry::{BezierPath, Point, Rect, Viewport};
pub use models::{Connection, CreateOptions, Mode, Node, NodeEdit, Position, Size};
