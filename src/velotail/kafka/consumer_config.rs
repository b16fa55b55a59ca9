use rdkafka::config::ClientConfig;
use std::collections::HashMap;

/// New consumer groups always start from the beginning of the topic
pub const AUTO_OFFSET_RESET: &str = "earliest";

/// Properties owned by [`ConsumerConfig`] fields; custom properties never replace them
pub const RESERVED_PROPERTIES: &[&str] = &[
    "bootstrap.servers",
    "metadata.broker.list",
    "group.id",
    "client.id",
    "auto.offset.reset",
];

/// Configuration for the topic consumer
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerConfig {
    /// Comma-separated `host:port` list
    pub brokers: String,
    /// Consumer group ID
    pub group_id: String,
    /// Client ID reported to the brokers
    pub client_id: Option<String>,
    /// Extra librdkafka properties
    pub custom_properties: HashMap<String, String>,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: "velo-tail".to_string(),
            client_id: None,
            custom_properties: HashMap::new(),
        }
    }
}

impl ConsumerConfig {
    /// Create a new config with brokers and group ID
    pub fn new(brokers: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            group_id: group_id.into(),
            ..Default::default()
        }
    }

    /// Set client ID
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Add a raw librdkafka property
    pub fn custom_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_properties.insert(key.into(), value.into());
        self
    }

    /// Build the librdkafka client configuration
    ///
    /// Custom properties are applied first; reserved keys among them are
    /// skipped so the validated fields always win.
    pub fn to_client_config(&self) -> ClientConfig {
        let mut client_config = ClientConfig::new();
        client_config.set("enable.partition.eof", "false");

        for (key, value) in &self.custom_properties {
            if is_reserved_property(key) {
                log::warn!("Ignoring consumer property {}, it is set by velo-tail", key);
                continue;
            }
            client_config.set(key, value);
        }

        client_config
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("auto.offset.reset", AUTO_OFFSET_RESET);

        if let Some(client_id) = &self.client_id {
            client_config.set("client.id", client_id);
        }

        client_config
    }
}

pub fn is_reserved_property(key: &str) -> bool {
    RESERVED_PROPERTIES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(key.trim()))
}
