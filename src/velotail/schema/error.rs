//! Schema Error Types

use std::path::PathBuf;
use thiserror::Error;

/// Error types for schema loading and registry lookups
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema file missing, unreadable, or not a valid Avro schema
    #[error("Failed to load schema from {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    /// Registry has no schema with this ID
    #[error("Schema {id} not found in registry")]
    NotFound { id: u32 },

    /// Registry unreachable or answered with an error
    #[error("Failed to fetch schema {id}: {message}")]
    Fetch { id: u32, message: String },

    /// Registry returned a schema that is not usable Avro
    #[error("Schema {id} is not a valid Avro schema: {message}")]
    Parse { id: u32, message: String },
}

impl SchemaError {
    /// NotFound and Fetch both mean no schema text was obtained for the ID
    pub fn is_fetch(&self) -> bool {
        matches!(self, SchemaError::NotFound { .. } | SchemaError::Fetch { .. })
    }
}

pub type SchemaResult<T> = Result<T, SchemaError>;
