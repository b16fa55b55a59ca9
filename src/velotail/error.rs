/*!
# Error Types for velotail

Top-level errors that end the process, plus the per-message error that the
read loop logs and skips.
*/

use crate::velotail::schema::SchemaError;
use crate::velotail::serialization::SerializationError;
use rdkafka::error::KafkaError;
use thiserror::Error;

/// Process exit code for a clean shutdown
pub const EXIT_OK: i32 = 0;
/// Process exit code for invalid or missing startup parameters
pub const EXIT_CONFIG: i32 = 1;
/// Process exit code for an unusable schema source
pub const EXIT_SCHEMA_SOURCE: i32 = 2;
/// Process exit code for a consumer that could not be created or subscribed
pub const EXIT_KAFKA: i32 = 3;
/// Process exit code when decoded output can no longer be written
pub const EXIT_IO: i32 = 4;

/// Errors that terminate the consumer
#[derive(Debug, Error)]
pub enum TailError {
    /// Missing or contradictory startup parameters
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Schema file could not be loaded, or the registry client could not be built
    #[error("Schema source unavailable: {0}")]
    SchemaSource(#[source] SchemaError),

    /// Too many consecutive messages whose schema could not be fetched
    #[error("Schema fetch failed for {failures} consecutive messages, last error: {last}")]
    SchemaFetchPersistent {
        failures: u32,
        #[source]
        last: SchemaError,
    },

    /// Kafka consumer setup errors
    #[error("Kafka operation failed: {message}")]
    Kafka {
        #[source]
        source: KafkaError,
        message: String,
    },

    /// I/O errors with additional context
    #[error("I/O operation failed: {operation}")]
    Io {
        #[source]
        source: std::io::Error,
        operation: String,
    },
}

impl TailError {
    /// Helper to create configuration errors
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Helper to create Kafka errors with context
    pub fn kafka(source: KafkaError, message: impl Into<String>) -> Self {
        Self::Kafka {
            source,
            message: message.into(),
        }
    }

    /// Helper to create I/O errors with context
    pub fn io(source: std::io::Error, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            operation: operation.into(),
        }
    }

    /// Exit code reported by the `velo-tail` binary for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            TailError::Config { .. } => EXIT_CONFIG,
            TailError::SchemaSource(_) | TailError::SchemaFetchPersistent { .. } => {
                EXIT_SCHEMA_SOURCE
            }
            TailError::Kafka { .. } => EXIT_KAFKA,
            TailError::Io { .. } => EXIT_IO,
        }
    }
}

/// Type alias for Results using TailError
pub type TailResult<T> = Result<T, TailError>;

/// Failure confined to a single message. The read loop logs it and moves on.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl MessageError {
    /// True when the schema could not be fetched from the registry
    pub fn is_schema_fetch(&self) -> bool {
        matches!(self, MessageError::Schema(e) if e.is_fetch())
    }

    /// True when a schema was resolved for the message before it failed
    pub fn schema_resolved(&self) -> bool {
        match self {
            MessageError::Serialization(SerializationError::Envelope { .. }) => false,
            MessageError::Serialization(_) => true,
            MessageError::Schema(SchemaError::Parse { .. }) => true,
            MessageError::Schema(_) => false,
        }
    }
}
