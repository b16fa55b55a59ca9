//! Runtime configuration
//!
//! [`TailConfigBuilder`] collects raw options (from the CLI, environment, or
//! code) and validates them once into a [`TailConfig`]. Validation failures are
//! [`TailError::Config`] and stop the process before any consumer is created.

use std::path::PathBuf;

use crate::velotail::error::{TailError, TailResult};
use crate::velotail::kafka::{is_reserved_property, ConsumerConfig};
use crate::velotail::schema::{RegistryAuth, RegistryClientConfig};

/// Default number of consecutive schema fetch failures tolerated by the read loop
pub const DEFAULT_MAX_CONSECUTIVE_FETCH_FAILURES: u32 = 5;

/// Where message schemas come from. Exactly one per process.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    /// Look up the schema ID embedded in each message
    Registry { url: String, auth: RegistryAuth },
    /// Apply one schema file to every message
    File { path: PathBuf },
}

impl SchemaSource {
    /// Pick the schema source from the two mutually exclusive options
    pub fn from_options(
        registry_url: Option<String>,
        schema_file: Option<PathBuf>,
        auth: RegistryAuth,
    ) -> TailResult<Self> {
        let registry_url = registry_url.filter(|url| !url.trim().is_empty());
        let schema_file = schema_file.filter(|path| !path.as_os_str().is_empty());

        match (registry_url, schema_file) {
            (Some(_), Some(_)) => Err(TailError::config(
                "schema registry URL and schema file are mutually exclusive",
            )),
            (None, None) => Err(TailError::config(
                "either a schema registry URL or a schema file is required",
            )),
            (Some(url), None) => {
                let url = url.trim().to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(TailError::config(format!(
                        "schema registry URL must start with http:// or https://, got '{}'",
                        url
                    )));
                }
                Ok(SchemaSource::Registry { url, auth })
            }
            (None, Some(path)) => {
                if !matches!(auth, RegistryAuth::None) {
                    log::warn!("Registry credentials are ignored when a schema file is used");
                }
                Ok(SchemaSource::File { path })
            }
        }
    }

    pub fn is_registry(&self) -> bool {
        matches!(self, SchemaSource::Registry { .. })
    }
}

impl std::fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaSource::Registry { url, .. } => write!(f, "schema registry {}", url),
            SchemaSource::File { path } => write!(f, "schema file {}", path.display()),
        }
    }
}

/// Validated configuration for one consumer process
#[derive(Debug, Clone, PartialEq)]
pub struct TailConfig {
    pub consumer: ConsumerConfig,
    pub topic: String,
    pub schema_source: SchemaSource,
    pub registry: RegistryClientConfig,
    /// Only decode messages whose raw payload contains this text
    pub grep: Option<String>,
    /// 0 disables the limit
    pub max_consecutive_fetch_failures: u32,
    /// Stop after printing this many messages
    pub max_messages: Option<u64>,
}

impl TailConfig {
    pub fn builder() -> TailConfigBuilder {
        TailConfigBuilder::default()
    }
}

/// Collects raw options and validates them into a [`TailConfig`]
#[derive(Debug, Clone, Default)]
pub struct TailConfigBuilder {
    bootstrap_servers: Option<String>,
    group_id: Option<String>,
    topic: Option<String>,
    client_id: Option<String>,
    schema_registry_url: Option<String>,
    schema_file: Option<PathBuf>,
    registry_username: Option<String>,
    registry_password: Option<String>,
    registry_token: Option<String>,
    registry: RegistryClientConfig,
    grep: Option<String>,
    max_consecutive_fetch_failures: Option<u32>,
    max_messages: Option<u64>,
    consumer_properties: Vec<(String, String)>,
}

impl TailConfigBuilder {
    pub fn bootstrap_servers(mut self, servers: impl Into<String>) -> Self {
        self.bootstrap_servers = Some(servers.into());
        self
    }

    pub fn group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn client_id(mut self, client_id: Option<String>) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn schema_registry_url(mut self, url: Option<String>) -> Self {
        self.schema_registry_url = url;
        self
    }

    pub fn schema_file(mut self, path: Option<PathBuf>) -> Self {
        self.schema_file = path;
        self
    }

    pub fn registry_basic_auth(
        mut self,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        self.registry_username = username;
        self.registry_password = password;
        self
    }

    pub fn registry_token(mut self, token: Option<String>) -> Self {
        self.registry_token = token;
        self
    }

    pub fn registry_timeout_secs(mut self, seconds: u64) -> Self {
        self.registry.timeout_seconds = seconds;
        self
    }

    pub fn registry_max_retries(mut self, retries: u32) -> Self {
        self.registry.max_retries = retries;
        self
    }

    pub fn grep(mut self, grep: Option<String>) -> Self {
        self.grep = grep;
        self
    }

    pub fn max_consecutive_fetch_failures(mut self, failures: u32) -> Self {
        self.max_consecutive_fetch_failures = Some(failures);
        self
    }

    pub fn max_messages(mut self, max: Option<u64>) -> Self {
        self.max_messages = max;
        self
    }

    /// Raw librdkafka property in `key=value` form
    ///
    /// Keys backed by a dedicated option (brokers, group, client ID, offset
    /// reset) are rejected.
    pub fn consumer_property(mut self, property: &str) -> TailResult<Self> {
        let (key, value) = property.split_once('=').ok_or_else(|| {
            TailError::config(format!(
                "consumer property '{}' must have the form key=value",
                property
            ))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(TailError::config(format!(
                "consumer property '{}' has an empty key",
                property
            )));
        }
        if is_reserved_property(key) {
            return Err(TailError::config(format!(
                "consumer property '{}' cannot be overridden with -X, use the dedicated option",
                key
            )));
        }
        self.consumer_properties
            .push((key.to_string(), value.trim().to_string()));
        Ok(self)
    }

    /// Validate every option and produce the final configuration
    pub fn build(self) -> TailResult<TailConfig> {
        let bootstrap_servers = required(self.bootstrap_servers, "bootstrap servers")?;
        let group_id = required(self.group_id, "consumer group id")?;
        let topic = required(self.topic, "topic")?;

        if bootstrap_servers
            .split(',')
            .any(|server| server.trim().is_empty())
        {
            return Err(TailError::config(format!(
                "bootstrap servers '{}' contain an empty entry",
                bootstrap_servers
            )));
        }

        let auth = match (
            self.registry_username,
            self.registry_password,
            self.registry_token,
        ) {
            (Some(_), _, Some(_)) => {
                return Err(TailError::config(
                    "registry basic auth and bearer token are mutually exclusive",
                ))
            }
            (Some(username), Some(password), None) => RegistryAuth::Basic { username, password },
            (Some(_), None, None) => {
                return Err(TailError::config(
                    "registry username was given without a password",
                ))
            }
            (None, Some(_), _) => {
                return Err(TailError::config(
                    "registry password was given without a username",
                ))
            }
            (None, None, Some(token)) => RegistryAuth::Bearer { token },
            (None, None, None) => RegistryAuth::None,
        };

        let schema_source =
            SchemaSource::from_options(self.schema_registry_url, self.schema_file, auth)?;

        let mut consumer = ConsumerConfig::new(bootstrap_servers, group_id);
        if let Some(client_id) = self.client_id.filter(|id| !id.trim().is_empty()) {
            consumer = consumer.client_id(client_id);
        }
        for (key, value) in self.consumer_properties {
            consumer = consumer.custom_property(key, value);
        }

        if self.registry.timeout_seconds == 0 {
            return Err(TailError::config("registry timeout must be at least 1 second"));
        }

        Ok(TailConfig {
            consumer,
            topic,
            schema_source,
            registry: self.registry,
            // An empty filter would match everything
            grep: self.grep.filter(|g| !g.is_empty()),
            max_consecutive_fetch_failures: self
                .max_consecutive_fetch_failures
                .unwrap_or(DEFAULT_MAX_CONSECUTIVE_FETCH_FAILURES),
            max_messages: self.max_messages,
        })
    }
}

fn required(value: Option<String>, name: &str) -> TailResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(TailError::config(format!("{} is required", name))),
    }
}
