use crate::velotail::error::MessageError;
use crate::velotail::pipeline::MessageFilter;
use crate::velotail::schema::SchemaResolver;
use crate::velotail::serialization::WireEnvelope;

/// Result of running one message through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Payload did not contain the filter text; nothing was decoded
    Filtered,
    /// Decoded and rendered text
    Rendered(String),
}

/// Filter, resolve, decode and render a single payload
pub struct DecodePipeline {
    filter: Option<MessageFilter>,
    resolver: SchemaResolver,
}

impl DecodePipeline {
    pub fn new(resolver: SchemaResolver, filter: Option<MessageFilter>) -> Self {
        Self { filter, resolver }
    }

    pub async fn process(&mut self, payload: &[u8]) -> Result<Outcome, MessageError> {
        if let Some(filter) = &self.filter {
            if !filter.matches(payload) {
                return Ok(Outcome::Filtered);
            }
        }

        let envelope = WireEnvelope::parse(payload)?;
        if !envelope.has_standard_magic() {
            log::debug!(
                "Unexpected marker byte {:#04x} for schema {}",
                envelope.magic,
                envelope.schema_id
            );
        }

        let codec = self.resolver.resolve(&envelope).await?;
        let text = codec.decode_to_text(envelope.payload)?;
        Ok(Outcome::Rendered(text))
    }
}
