use crate::velotail::serialization::{SerializationError, SerializationResult};

/// Marker byte written by Confluent serializers in front of the schema ID
pub const MAGIC_BYTE: u8 = 0;

/// Marker byte plus the 4-byte schema ID
pub const ENVELOPE_LEN: usize = 5;

/// Borrowed view over a framed message
///
/// ```text
/// +-------+-------------------+------------------+
/// | magic | schema id (u32 BE)| avro datum ...   |
/// +-------+-------------------+------------------+
///   0       1..5                5..
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireEnvelope<'a> {
    pub magic: u8,
    pub schema_id: u32,
    pub payload: &'a [u8],
}

impl<'a> WireEnvelope<'a> {
    /// Split a raw message into marker, schema ID and datum
    pub fn parse(bytes: &'a [u8]) -> SerializationResult<Self> {
        if bytes.len() < ENVELOPE_LEN {
            return Err(SerializationError::Envelope { len: bytes.len() });
        }

        let mut id = [0u8; 4];
        id.copy_from_slice(&bytes[1..ENVELOPE_LEN]);

        Ok(WireEnvelope {
            magic: bytes[0],
            schema_id: u32::from_be_bytes(id),
            payload: &bytes[ENVELOPE_LEN..],
        })
    }

    /// Whether the marker byte is the one Confluent serializers write
    pub fn has_standard_magic(&self) -> bool {
        self.magic == MAGIC_BYTE
    }
}

/// Build the 5 header bytes for a schema ID
pub fn encode_header(magic: u8, schema_id: u32) -> [u8; ENVELOPE_LEN] {
    let mut header = [0u8; ENVELOPE_LEN];
    header[0] = magic;
    header[1..].copy_from_slice(&schema_id.to_be_bytes());
    header
}
