//! Kafka consumption
//!
//! Thin layer over `rdkafka`'s `StreamConsumer`: configuration, a context that
//! forwards librdkafka logs to the `log` crate, and the [`MessageSource`]
//! seam the read loop pulls messages through.

pub mod consumer_config;
pub mod consumer_context;
pub mod kafka_consumer;

pub use consumer_config::{
    is_reserved_property, ConsumerConfig, AUTO_OFFSET_RESET, RESERVED_PROPERTIES,
};
pub use consumer_context::{convert_kafka_log_level, TailConsumerContext};
pub use kafka_consumer::{ConsumedMessage, MessageSource, StreamSource, TopicConsumer};
