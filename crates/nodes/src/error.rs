//! Catalogue-level error type.

use thiserror::Error;

/// Errors raised while resolving tools or checking node configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No tool with this name exists in the palette.
    #[error("unknown tool: '{0}'")]
    UnknownTool(String),

    /// A select-style config field received a value outside its options.
    #[error("invalid value '{value}' for field '{field}' (expected one of: {expected})")]
    InvalidFieldValue {
        field: String,
        value: String,
        expected: String,
    },
}
