use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;
use std::process;

use velotail::velotail::error::EXIT_OK;
use velotail::{
    DecodePipeline, MessageFilter, ReadLoop, ReadLoopConfig, SchemaResolver, TailConfig,
    TailError, TailResult, TopicConsumer,
};

#[derive(Parser, Debug)]
#[command(name = "velo-tail")]
#[command(about = "Consume a Kafka topic and print Avro messages as JSON")]
#[command(version)]
struct Cli {
    /// Kafka broker addresses (comma-separated host:port)
    #[arg(long, env = "VELO_TAIL_BOOTSTRAP_SERVERS")]
    bootstrap_servers: Option<String>,

    /// Consumer group ID
    #[arg(long, env = "VELO_TAIL_GROUP_ID")]
    group_id: Option<String>,

    /// Topic to consume
    #[arg(long, env = "VELO_TAIL_TOPIC")]
    topic: Option<String>,

    /// Schema registry URL; schemas are looked up by the ID embedded in each message
    #[arg(long, env = "VELO_TAIL_SCHEMA_REGISTRY_URL", conflicts_with = "schema_file")]
    schema_registry_url: Option<String>,

    /// Avro schema file applied to every message
    #[arg(long, env = "VELO_TAIL_SCHEMA_FILE")]
    schema_file: Option<PathBuf>,

    /// Only print messages whose raw payload contains this text
    #[arg(long, env = "VELO_TAIL_GREP")]
    grep: Option<String>,

    /// Schema registry basic auth username
    #[arg(long, env = "VELO_TAIL_REGISTRY_USERNAME")]
    registry_username: Option<String>,

    /// Schema registry basic auth password
    #[arg(long, env = "VELO_TAIL_REGISTRY_PASSWORD", hide_env_values = true)]
    registry_password: Option<String>,

    /// Schema registry bearer token
    #[arg(long, env = "VELO_TAIL_REGISTRY_TOKEN", hide_env_values = true)]
    registry_token: Option<String>,

    /// Schema registry request timeout in seconds
    #[arg(long, default_value = "10")]
    registry_timeout_secs: u64,

    /// Retries for failed schema registry requests
    #[arg(long, default_value = "3")]
    registry_max_retries: u32,

    /// Stop after this many consecutive schema fetch failures (0 = never)
    #[arg(long, default_value = "5")]
    max_consecutive_fetch_failures: u32,

    /// Stop after printing this many messages
    #[arg(long)]
    max_messages: Option<u64>,

    /// Kafka client ID
    #[arg(long, env = "VELO_TAIL_CLIENT_ID")]
    client_id: Option<String>,

    /// Extra librdkafka property (key=value), may be repeated
    #[arg(short = 'X', long = "consumer-property", value_name = "KEY=VALUE")]
    consumer_properties: Vec<String>,
}

impl Cli {
    fn into_config(self) -> TailResult<TailConfig> {
        let mut builder = TailConfig::builder()
            .schema_registry_url(self.schema_registry_url)
            .schema_file(self.schema_file)
            .registry_basic_auth(self.registry_username, self.registry_password)
            .registry_token(self.registry_token)
            .registry_timeout_secs(self.registry_timeout_secs)
            .registry_max_retries(self.registry_max_retries)
            .grep(self.grep)
            .max_consecutive_fetch_failures(self.max_consecutive_fetch_failures)
            .max_messages(self.max_messages)
            .client_id(self.client_id);

        if let Some(servers) = self.bootstrap_servers {
            builder = builder.bootstrap_servers(servers);
        }
        if let Some(group_id) = self.group_id {
            builder = builder.group_id(group_id);
        }
        if let Some(topic) = self.topic {
            builder = builder.topic(topic);
        }
        for property in &self.consumer_properties {
            builder = builder.consumer_property(property)?;
        }

        builder.build()
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(()) => EXIT_OK,
        Err(e) => {
            error!("{}", e);
            e.exit_code()
        }
    };
    process::exit(code);
}

async fn run(cli: Cli) -> TailResult<()> {
    let config = cli.into_config()?;
    info!(
        "Consuming topic {} from {} using {}",
        config.topic, config.consumer.brokers, config.schema_source
    );

    let resolver = build_resolver(&config).await?;
    let filter = config.grep.as_deref().map(MessageFilter::new);
    let pipeline = DecodePipeline::new(resolver, filter);

    let mut consumer = TopicConsumer::new(&config.consumer)
        .map_err(|e| TailError::kafka(e, "Failed to create consumer"))?;
    consumer
        .subscribe(&config.topic)
        .map_err(|e| TailError::kafka(e, format!("Failed to subscribe to {}", config.topic)))?;

    let read_loop = ReadLoop::new(
        consumer,
        pipeline,
        std::io::stdout(),
        ReadLoopConfig::from(&config),
    );
    read_loop.run(shutdown_signal()).await?;
    Ok(())
}

async fn build_resolver(config: &TailConfig) -> TailResult<SchemaResolver> {
    let resolver = SchemaResolver::from_source(&config.schema_source, &config.registry)
        .map_err(TailError::SchemaSource)?;
    if !resolver.check_source().await {
        warn!(
            "{} is not reachable yet, schemas will be fetched on demand",
            resolver.describe()
        );
    }
    Ok(resolver)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for Ctrl-C, shutdown only by termination: {}", e);
        std::future::pending::<()>().await;
    }
}
