//! # velotail
//!
//! Tail a Kafka topic and print each Avro-encoded message as a line of JSON.
//!
//! Payloads use the Confluent wire format: a marker byte, a big-endian `u32`
//! schema ID, then the Avro datum. The writer schema is looked up by that ID
//! in a schema registry, or taken from a local schema file.
//!
//! ## Features
//!
//! - **Registry or file schemas**: per-ID codec cache for registry lookups, a
//!   single codec for file mode
//! - **Substring filter**: skip messages before any decoding happens
//! - **Per-message isolation**: a malformed message is logged and skipped, the
//!   consumer keeps running
//! - **Bounded registry retries**: transient registry failures are retried with
//!   exponential backoff; persistent failure stops the consumer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use velotail::{DecodePipeline, ReadLoop, ReadLoopConfig, SchemaResolver, TailConfig, TopicConsumer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TailConfig::builder()
//!         .bootstrap_servers("localhost:9092")
//!         .group_id("velo-tail")
//!         .topic("orders")
//!         .schema_registry_url(Some("http://localhost:8081".to_string()))
//!         .build()?;
//!
//!     let resolver = SchemaResolver::from_source(&config.schema_source, &config.registry)?;
//!     let pipeline = DecodePipeline::new(resolver, None);
//!
//!     let mut consumer = TopicConsumer::new(&config.consumer)?;
//!     consumer.subscribe(&config.topic)?;
//!
//!     let stats = ReadLoop::new(consumer, pipeline, std::io::stdout(), ReadLoopConfig::from(&config))
//!         .run(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await?;
//!     println!("{}", stats);
//!     Ok(())
//! }
//! ```

pub mod velotail;

pub use velotail::config::{SchemaSource, TailConfig, TailConfigBuilder};
pub use velotail::error::{MessageError, TailError, TailResult};
pub use velotail::kafka::{ConsumedMessage, ConsumerConfig, MessageSource, StreamSource, TopicConsumer};
pub use velotail::pipeline::{DecodePipeline, LoopStats, MessageFilter, Outcome, ReadLoop, ReadLoopConfig};
pub use velotail::schema::{
    RegistryAuth, RegistryClientConfig, SchemaError, SchemaProvider, SchemaRegistryClient,
    SchemaResolver,
};
pub use velotail::serialization::{AvroCodec, SerializationError, WireEnvelope};
