//! Maps a framed message to the codec for its writer schema

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::velotail::config::SchemaSource;
use crate::velotail::schema::{
    RegistryClientConfig, SchemaError, SchemaRegistryClient, SchemaResult,
};
use crate::velotail::serialization::{AvroCodec, WireEnvelope};

/// Source of schema definitions keyed by registry ID
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Fetch the Avro schema JSON registered under `id`
    async fn fetch_schema(&self, id: u32) -> SchemaResult<String>;

    /// Whether the provider can currently serve requests
    async fn health_check(&self) -> bool {
        true
    }

    /// Human-readable description for log lines
    fn describe(&self) -> String {
        "schema provider".to_string()
    }
}

enum ResolverMode {
    Registry {
        provider: Arc<dyn SchemaProvider>,
        codecs: HashMap<u32, Arc<AvroCodec>>,
    },
    File {
        path: PathBuf,
        codec: Arc<AvroCodec>,
    },
}

/// Resolves the codec for each message
///
/// In registry mode codecs are built on first sight of an ID and reused for
/// every later message carrying it. Failed lookups are not cached, so the
/// next message with the same ID asks the registry again.
pub struct SchemaResolver {
    mode: ResolverMode,
}

impl SchemaResolver {
    /// Build a resolver for the configured schema source.
    ///
    /// File mode reads and parses the schema here; any problem is returned
    /// as [`SchemaError::Load`].
    pub fn from_source(
        source: &SchemaSource,
        registry_config: &RegistryClientConfig,
    ) -> SchemaResult<Self> {
        match source {
            SchemaSource::Registry { url, auth } => {
                let client = SchemaRegistryClient::with_config(url.as_str(), registry_config.clone())
                    .with_auth(auth.clone());
                Ok(Self::from_provider(Arc::new(client)))
            }
            SchemaSource::File { path } => Self::from_file(path),
        }
    }

    /// Registry-backed resolver
    pub fn from_provider(provider: Arc<dyn SchemaProvider>) -> Self {
        Self {
            mode: ResolverMode::Registry {
                provider,
                codecs: HashMap::new(),
            },
        }
    }

    /// Resolver that applies one schema file to every message
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref().to_path_buf();
        let schema_json = std::fs::read_to_string(&path).map_err(|e| SchemaError::Load {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let codec = AvroCodec::new(&schema_json).map_err(|e| SchemaError::Load {
            path: path.clone(),
            message: e.to_string(),
        })?;

        log::info!(
            "Loaded schema {} from {}",
            codec.schema_name().unwrap_or_else(|| "<unnamed>".to_string()),
            path.display()
        );

        Ok(Self {
            mode: ResolverMode::File {
                path,
                codec: Arc::new(codec),
            },
        })
    }

    /// Codec for the message, fetching its schema from the registry if needed
    pub async fn resolve(&mut self, envelope: &WireEnvelope<'_>) -> SchemaResult<Arc<AvroCodec>> {
        match &mut self.mode {
            ResolverMode::File { codec, .. } => {
                log::debug!(
                    "Message carries schema ID {}, using schema file",
                    envelope.schema_id
                );
                Ok(Arc::clone(codec))
            }
            ResolverMode::Registry { provider, codecs } => {
                let id = envelope.schema_id;
                if let Some(codec) = codecs.get(&id) {
                    return Ok(Arc::clone(codec));
                }

                log::debug!("Fetching schema {} from {}", id, provider.describe());
                let schema_json = provider.fetch_schema(id).await?;
                let codec = AvroCodec::new(&schema_json).map_err(|e| SchemaError::Parse {
                    id,
                    message: e.to_string(),
                })?;

                log::info!(
                    "Resolved schema {} ({})",
                    id,
                    codec.schema_name().unwrap_or_else(|| "<unnamed>".to_string())
                );

                let codec = Arc::new(codec);
                codecs.insert(id, Arc::clone(&codec));
                Ok(codec)
            }
        }
    }

    /// Probe the schema source once. A schema file is always available
    /// after construction.
    pub async fn check_source(&self) -> bool {
        match &self.mode {
            ResolverMode::Registry { provider, .. } => provider.health_check().await,
            ResolverMode::File { .. } => true,
        }
    }

    pub fn describe(&self) -> String {
        match &self.mode {
            ResolverMode::Registry { provider, .. } => provider.describe(),
            ResolverMode::File { path, .. } => format!("schema file {}", path.display()),
        }
    }

    /// Number of codecs held by the registry cache (always 1 in file mode)
    pub fn cached_schema_count(&self) -> usize {
        match &self.mode {
            ResolverMode::Registry { codecs, .. } => codecs.len(),
            ResolverMode::File { .. } => 1,
        }
    }

    /// Schema file in use, if the resolver is in file mode
    pub fn schema_file(&self) -> Option<&Path> {
        match &self.mode {
            ResolverMode::File { path, .. } => Some(path),
            ResolverMode::Registry { .. } => None,
        }
    }
}
