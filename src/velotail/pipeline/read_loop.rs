use std::future::Future;
use std::io::Write;

use crate::velotail::config::{TailConfig, DEFAULT_MAX_CONSECUTIVE_FETCH_FAILURES};
use crate::velotail::error::{MessageError, TailError, TailResult};
use crate::velotail::kafka::{ConsumedMessage, MessageSource};
use crate::velotail::pipeline::{DecodePipeline, Outcome};
use crate::velotail::schema::SchemaError;

/// Limits applied by the read loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLoopConfig {
    /// Consecutive schema fetch failures before giving up; 0 never gives up
    pub max_consecutive_fetch_failures: u32,
    /// Stop after this many printed messages
    pub max_messages: Option<u64>,
}

impl Default for ReadLoopConfig {
    fn default() -> Self {
        Self {
            max_consecutive_fetch_failures: DEFAULT_MAX_CONSECUTIVE_FETCH_FAILURES,
            max_messages: None,
        }
    }
}

impl From<&TailConfig> for ReadLoopConfig {
    fn from(config: &TailConfig) -> Self {
        Self {
            max_consecutive_fetch_failures: config.max_consecutive_fetch_failures,
            max_messages: config.max_messages,
        }
    }
}

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub received: u64,
    pub filtered: u64,
    pub printed: u64,
    pub failed: u64,
    pub broker_errors: u64,
}

impl std::fmt::Display for LoopStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "received={} filtered={} printed={} failed={} broker_errors={}",
            self.received, self.filtered, self.printed, self.failed, self.broker_errors
        )
    }
}

/// Pulls messages one at a time and writes each decoded message as a line
///
/// Broker errors and per-message failures are logged and skipped. The loop
/// only returns an error when the registry keeps failing, or when the output
/// can no longer be written.
pub struct ReadLoop<S, W> {
    source: S,
    pipeline: DecodePipeline,
    output: W,
    config: ReadLoopConfig,
    stats: LoopStats,
    consecutive_fetch_failures: u32,
}

impl<S, W> ReadLoop<S, W>
where
    S: MessageSource,
    W: Write,
{
    pub fn new(source: S, pipeline: DecodePipeline, output: W, config: ReadLoopConfig) -> Self {
        Self {
            source,
            pipeline,
            output,
            config,
            stats: LoopStats::default(),
            consecutive_fetch_failures: 0,
        }
    }

    /// Run until `shutdown` completes, the source is exhausted, or the
    /// message limit is reached
    pub async fn run<F>(mut self, shutdown: F) -> TailResult<LoopStats>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            if let Some(max) = self.config.max_messages {
                if self.stats.printed >= max {
                    log::info!("Printed {} messages, stopping", max);
                    break;
                }
            }

            let next = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    log::info!("Shutdown requested, stopping consumer");
                    break;
                }
                next = self.source.next_message() => next,
            };

            let message = match next {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    self.stats.broker_errors += 1;
                    log::error!("Consumer error: {}", e);
                    continue;
                }
                None => {
                    log::info!("Message source exhausted");
                    break;
                }
            };

            self.handle_message(message).await?;
        }

        self.output
            .flush()
            .map_err(|e| TailError::io(e, "flush decoded output"))?;
        log::info!("Read loop finished: {}", self.stats);
        Ok(self.stats)
    }

    async fn handle_message(&mut self, message: ConsumedMessage) -> TailResult<()> {
        self.stats.received += 1;

        match self.pipeline.process(&message.payload).await {
            Ok(Outcome::Filtered) => {
                self.stats.filtered += 1;
            }
            Ok(Outcome::Rendered(text)) => {
                self.consecutive_fetch_failures = 0;
                writeln!(self.output, "{}", text)
                    .map_err(|e| TailError::io(e, "write decoded message"))?;
                self.stats.printed += 1;
            }
            Err(MessageError::Schema(e)) if e.is_fetch() => {
                self.stats.failed += 1;
                self.on_fetch_failure(&message, e)?;
            }
            Err(e) => {
                self.stats.failed += 1;
                if e.schema_resolved() {
                    self.consecutive_fetch_failures = 0;
                }
                log::warn!("Skipping message {}: {}", message, e);
            }
        }

        Ok(())
    }

    fn on_fetch_failure(&mut self, message: &ConsumedMessage, error: SchemaError) -> TailResult<()> {
        self.consecutive_fetch_failures += 1;
        log::error!(
            "Skipping message {}: {} ({} consecutive schema fetch failures)",
            message,
            error,
            self.consecutive_fetch_failures
        );

        let limit = self.config.max_consecutive_fetch_failures;
        if limit > 0 && self.consecutive_fetch_failures >= limit {
            return Err(TailError::SchemaFetchPersistent {
                failures: self.consecutive_fetch_failures,
                last: error,
            });
        }
        Ok(())
    }
}
