//! Schema Registry Client Implementation
//!
//! HTTP client for the read side of the Confluent Schema Registry API, with
//! authentication and bounded retry.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::velotail::schema::{SchemaError, SchemaProvider, SchemaResult};

const REGISTRY_CONTENT_TYPE: &str = "application/vnd.schemaregistry.v1+json";

/// Schema Registry client used to look up writer schemas by ID
pub struct SchemaRegistryClient {
    base_url: String,
    auth: RegistryAuth,
    http_client: Client,
    config: RegistryClientConfig,
}

/// Configuration for Schema Registry client
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum retry attempts
    pub max_retries: u32,
    /// Base retry delay in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for RegistryClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl RegistryClientConfig {
    /// Backoff before retry number `attempt + 1`
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt);
        Duration::from_millis(self.retry_delay_ms.saturating_mul(factor))
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RegistryAuth {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    Bearer {
        token: String,
    },
}

/// Schema as returned by `GET /schemas/ids/{id}`
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredSchema {
    pub id: u32,
    pub schema: String,
    /// `AVRO` when the registry omits the field
    pub schema_type: String,
}

/// API response for schema retrieval
#[derive(Debug, Deserialize)]
struct SchemaResponse {
    schema: String,
    #[serde(rename = "schemaType", default)]
    schema_type: Option<String>,
}

/// Why a request produced no usable response
#[derive(Debug)]
enum RequestFailure {
    Status { status: StatusCode, body: String },
    Transport(String),
}

impl std::fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestFailure::Status { status, body } => {
                write!(f, "Request failed with status {}: {}", status, body)
            }
            RequestFailure::Transport(message) => write!(f, "Request failed: {}", message),
        }
    }
}

impl SchemaRegistryClient {
    /// Create a new Schema Registry client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(base_url, RegistryClientConfig::default())
    }

    /// Create client with configuration
    pub fn with_config(base_url: impl Into<String>, config: RegistryClientConfig) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth: RegistryAuth::None,
            http_client: Client::new(),
            config,
        }
    }

    /// Set authentication configuration
    pub fn with_auth(mut self, auth: RegistryAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get schema by ID
    pub async fn get_schema(&self, id: u32) -> SchemaResult<RegisteredSchema> {
        let url = format!("{}/schemas/ids/{}", self.base_url, id);
        let response = self
            .execute_request(&url, self.config.max_retries)
            .await
            .map_err(|failure| match failure {
            RequestFailure::Status { status, .. } if status == StatusCode::NOT_FOUND => {
                SchemaError::NotFound { id }
            }
            other => SchemaError::Fetch {
                id,
                message: other.to_string(),
            },
        })?;

        let schema_response: SchemaResponse =
            response.json().await.map_err(|e| SchemaError::Fetch {
                id,
                message: format!("Failed to parse schema response: {}", e),
            })?;

        Ok(RegisteredSchema {
            id,
            schema: schema_response.schema,
            schema_type: schema_response
                .schema_type
                .unwrap_or_else(|| "AVRO".to_string()),
        })
    }

    /// Check if the registry is reachable. Makes a single attempt.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/subjects", self.base_url);
        match self.execute_request(&url, 0).await {
            Ok(_) => true,
            Err(failure) => {
                log::debug!("Schema registry health check failed: {}", failure);
                false
            }
        }
    }

    async fn execute_request(
        &self,
        url: &str,
        max_retries: u32,
    ) -> Result<Response, RequestFailure> {
        let mut last_error = None;

        for attempt in 0..=max_retries {
            let mut request = self
                .http_client
                .get(url)
                .header("Accept", REGISTRY_CONTENT_TYPE)
                .header("Content-Type", REGISTRY_CONTENT_TYPE)
                .timeout(Duration::from_secs(self.config.timeout_seconds));

            request = match &self.auth {
                RegistryAuth::Basic { username, password } => {
                    request.basic_auth(username, Some(password))
                }
                RegistryAuth::Bearer { token } => request.bearer_auth(token),
                RegistryAuth::None => request,
            };

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let body = response.text().await.unwrap_or_default();
                    let client_error = status.is_client_error();
                    last_error = Some(RequestFailure::Status { status, body });

                    // 4xx will not change on retry
                    if client_error {
                        break;
                    }
                }
                Err(e) => {
                    last_error = Some(RequestFailure::Transport(e.to_string()));
                }
            }

            if attempt < max_retries {
                let delay = self.config.retry_delay(attempt);
                log::debug!(
                    "Schema registry request to {} failed (attempt {}), retrying in {:?}",
                    url,
                    attempt + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| RequestFailure::Transport("All retry attempts failed".to_string())))
    }
}

#[async_trait]
impl SchemaProvider for SchemaRegistryClient {
    async fn fetch_schema(&self, id: u32) -> SchemaResult<String> {
        let registered = self.get_schema(id).await?;
        if !registered.schema_type.eq_ignore_ascii_case("AVRO") {
            return Err(SchemaError::Parse {
                id,
                message: format!("unsupported schema type {}", registered.schema_type),
            });
        }
        Ok(registered.schema)
    }

    async fn health_check(&self) -> bool {
        SchemaRegistryClient::health_check(self).await
    }

    fn describe(&self) -> String {
        format!("schema registry at {}", self.base_url)
    }
}
