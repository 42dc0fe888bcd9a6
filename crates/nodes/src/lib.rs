//! `nodes` crate: the node catalogue behind the builder's tool palette.
//!
//! Every block that can be dropped on the canvas is described here: its
//! cosmetic [`Category`], its semantic [`NodeType`] (which decides the
//! configuration fields shown in the property panel) and the external
//! [`Integration`] it needs, if any.

pub mod catalog;
pub mod error;
pub mod mock;
pub mod traits;

pub use catalog::{Catalog, Category, ConfigField, FieldKind, NodeType, ToolDescriptor};
pub use error::CatalogError;
pub use traits::{Integration, IntegrationStatus, NoIntegrations};
