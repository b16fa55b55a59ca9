//! Avro codec for schema-driven decoding of message payloads

use crate::velotail::serialization::{SerializationError, SerializationResult};
use apache_avro::{types::Value as AvroValue, Schema as AvroSchema};

/// Avro codec bound to one writer schema
///
/// Stateless apart from the parsed schema, so a single instance is shared by
/// every message written with that schema.
#[derive(Debug)]
pub struct AvroCodec {
    schema: AvroSchema,
}

impl AvroCodec {
    /// Create a new AvroCodec with the given schema JSON
    pub fn new(schema_json: &str) -> Result<Self, apache_avro::Error> {
        let schema = AvroSchema::parse_str(schema_json)?;
        Ok(AvroCodec { schema })
    }

    /// Full name of the schema when it is a named type (record, enum, fixed)
    pub fn schema_name(&self) -> Option<String> {
        self.schema.name().map(|name| name.fullname(None))
    }

    /// Decode a raw Avro datum (no container header, no wire envelope)
    ///
    /// The reader yields `null` for a string cut short by the end of the
    /// payload, so every decoded value is checked against the schema before
    /// it is returned.
    pub fn decode(&self, payload: &[u8]) -> SerializationResult<AvroValue> {
        let mut reader = payload;
        let value = apache_avro::from_avro_datum(&self.schema, &mut reader, None)
            .map_err(|e| SerializationError::decode(e.to_string()))?;

        if !value.validate(&self.schema) {
            return Err(SerializationError::decode(format!(
                "datum does not match the writer schema ({} bytes, payload truncated?)",
                payload.len()
            )));
        }

        if !reader.is_empty() {
            log::debug!(
                "Ignoring {} trailing bytes after Avro datum ({} bytes total)",
                reader.len(),
                payload.len()
            );
        }

        Ok(value)
    }

    /// Render a decoded value as single-line JSON
    ///
    /// Unions render as the value of the selected branch (`"rush"`), not the
    /// Avro JSON encoding with a type wrapper (`{"string":"rush"}`).
    pub fn render(&self, value: AvroValue) -> SerializationResult<String> {
        let json = serde_json::Value::try_from(value)
            .map_err(|e| SerializationError::render(e.to_string()))?;

        serde_json::to_string(&json).map_err(|e| SerializationError::render(e.to_string()))
    }

    /// Decode then render in one step
    pub fn decode_to_text(&self, payload: &[u8]) -> SerializationResult<String> {
        let value = self.decode(payload)?;
        self.render(value)
    }
}
