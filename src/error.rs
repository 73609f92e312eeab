//! Error types for the object model and persistence core

use std::path::PathBuf;

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors surfaced by the registry, object model, and JSON adapter
///
/// All of these are unrecoverable at the point of detection and are surfaced
/// directly to the caller; none represent transient conditions. The file I/O
/// variants are deliberately narrow so callers can branch on them the way they
/// would on errno.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("schema already registered: {name} version {version}")]
    SchemaAlreadyRegistered { name: String, version: u32 },

    #[error("upgrade function for {name} must target version {expected}, got {got}")]
    InvalidUpgradeOrder {
        name: String,
        expected: u32,
        got: u32,
    },

    #[error("unsupported schema: {name} version {version}")]
    UnsupportedSchema { name: String, version: u32 },

    #[error("malformed schema tag: {0:?}")]
    MalformedSchemaTag(String),

    #[error("cyclic object graph detected")]
    CyclicGraph,

    #[error("shallow copy of a serializable object is not allowed")]
    InvalidCopy,

    #[error("unknown field {field:?} on schema {schema}")]
    UnknownField { schema: String, field: String },

    #[error("field {field:?} on schema {schema} expects {expected}, got {got}")]
    FieldTypeMismatch {
        schema: String,
        field: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("target is a directory: {0}")]
    IsADirectory(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
