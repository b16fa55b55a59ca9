//! Error types for serialization

use thiserror::Error;

/// Failures while framing, decoding, or rendering a single message
#[derive(Debug, Error)]
pub enum SerializationError {
    /// Message is too short to carry the 5-byte wire envelope
    #[error("Message of {len} bytes is shorter than the 5-byte wire envelope")]
    Envelope { len: usize },

    /// Payload does not match the structure the schema expects
    #[error("Avro decode failed: {0}")]
    Decode(String),

    /// Decoded value could not be converted to text
    #[error("Render failed: {0}")]
    Render(String),
}

impl SerializationError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }
}

pub type SerializationResult<T> = Result<T, SerializationError>;
