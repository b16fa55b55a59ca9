//! Decode pipeline and read loop
//!
//! Each consumed message goes through
//! filter → [`SchemaResolver`](crate::velotail::schema::SchemaResolver) →
//! [`AvroCodec`](crate::velotail::serialization::AvroCodec) decode → render,
//! strictly one message at a time.

pub mod decode;
pub mod filter;
pub mod read_loop;

pub use decode::{DecodePipeline, Outcome};
pub use filter::MessageFilter;
pub use read_loop::{LoopStats, ReadLoop, ReadLoopConfig};
