//! Wire framing and Avro decoding for consumed messages
//!
//! Messages carry the Confluent wire envelope: one marker byte, a big-endian
//! `u32` schema ID, then a raw Avro datum. [`WireEnvelope`] splits the frame and
//! [`AvroCodec`] turns the datum into JSON text.

mod avro_codec;
mod envelope;
mod error;

pub use avro_codec::AvroCodec;
pub use envelope::{encode_header, WireEnvelope, ENVELOPE_LEN, MAGIC_BYTE};
pub use error::{SerializationError, SerializationResult};
