use crate::velotail::kafka::{ConsumerConfig, TailConsumerContext};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::{BorrowedMessage, Message as KafkaMessage};

/// A message pulled from the topic, detached from the consumer
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumedMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    /// Raw value bytes; empty for tombstones
    pub payload: Vec<u8>,
}

impl ConsumedMessage {
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            payload,
        }
    }

    fn from_kafka(message: &BorrowedMessage<'_>) -> Self {
        Self {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
            payload: message.payload().map(|p| p.to_vec()).unwrap_or_default(),
        }
    }
}

impl std::fmt::Display for ConsumedMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]@{}", self.topic, self.partition, self.offset)
    }
}

/// Where the read loop gets its messages from
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next message. `None` means the source is exhausted.
    async fn next_message(&mut self) -> Option<Result<ConsumedMessage, KafkaError>>;
}

/// Kafka consumer subscribed to a single topic
pub struct TopicConsumer {
    consumer: StreamConsumer<TailConsumerContext>,
}

impl TopicConsumer {
    /// Creates a new consumer; nothing is fetched until [`subscribe`](Self::subscribe)
    pub fn new(config: &ConsumerConfig) -> Result<Self, KafkaError> {
        let consumer: StreamConsumer<TailConsumerContext> = config
            .to_client_config()
            .create_with_context(TailConsumerContext)?;

        log::info!(
            "Created consumer for brokers {} in group {}",
            config.brokers,
            config.group_id
        );

        Ok(Self { consumer })
    }

    pub fn subscribe(&mut self, topic: &str) -> Result<(), KafkaError> {
        self.consumer.subscribe(&[topic])?;
        log::info!("Subscribed to topic {}", topic);
        Ok(())
    }
}

#[async_trait]
impl MessageSource for TopicConsumer {
    async fn next_message(&mut self) -> Option<Result<ConsumedMessage, KafkaError>> {
        // StreamConsumer never runs dry; it blocks until a message or error arrives
        let result = self.consumer.recv().await;
        Some(result.map(|message| ConsumedMessage::from_kafka(&message)))
    }
}

/// Adapts any stream of consume results into a [`MessageSource`]
pub struct StreamSource<S> {
    inner: S,
}

impl<S> StreamSource<S>
where
    S: Stream<Item = Result<ConsumedMessage, KafkaError>> + Unpin + Send,
{
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S> MessageSource for StreamSource<S>
where
    S: Stream<Item = Result<ConsumedMessage, KafkaError>> + Unpin + Send,
{
    async fn next_message(&mut self) -> Option<Result<ConsumedMessage, KafkaError>> {
        self.inner.next().await
    }
}
