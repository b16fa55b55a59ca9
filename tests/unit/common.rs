//! Shared helpers: Avro payload builders, an in-memory schema provider, and a
//! minimal HTTP stub standing in for a schema registry.

use apache_avro::types::Value as AvroValue;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub use velotail::velotail::kafka::ConsumedMessage;
pub use velotail::velotail::schema::{SchemaError, SchemaProvider, SchemaResult};
pub use velotail::velotail::serialization::encode_header;

pub const EVENT_SCHEMA: &str =
    r#"{"type":"record","name":"E","fields":[{"name":"msg","type":"string"}]}"#;

pub const EVENT_SCHEMA_ID: u32 = 1;

/// Avro datum for `{"msg": text}` under [`EVENT_SCHEMA`]
pub fn event_datum(text: &str) -> Vec<u8> {
    let schema = apache_avro::Schema::parse_str(EVENT_SCHEMA).expect("valid schema");
    apache_avro::to_avro_datum(
        &schema,
        AvroValue::Record(vec![(
            "msg".to_string(),
            AvroValue::String(text.to_string()),
        )]),
    )
    .expect("encodable record")
}

/// Datum framed with the wire envelope for `schema_id`
pub fn framed_event(schema_id: u32, text: &str) -> Vec<u8> {
    let mut bytes = encode_header(0, schema_id).to_vec();
    bytes.extend_from_slice(&event_datum(text));
    bytes
}

pub fn consumed(offset: i64, payload: Vec<u8>) -> ConsumedMessage {
    ConsumedMessage::new("events", 0, offset, payload)
}

/// Schema provider backed by a fixed map, counting every lookup
#[derive(Default)]
pub struct MapProvider {
    schemas: HashMap<u32, String>,
    calls: AtomicUsize,
}

impl MapProvider {
    pub fn with_event_schema() -> Self {
        let mut schemas = HashMap::new();
        schemas.insert(EVENT_SCHEMA_ID, EVENT_SCHEMA.to_string());
        Self {
            schemas,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchemaProvider for MapProvider {
    async fn fetch_schema(&self, id: u32) -> SchemaResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.schemas
            .get(&id)
            .cloned()
            .ok_or(SchemaError::NotFound { id })
    }
}

type Handler = dyn Fn(&str, usize) -> (u16, String) + Send + Sync;

/// HTTP stub that answers each request through a handler of `(path, hit number)`
pub struct StubRegistry {
    pub url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubRegistry {
    pub async fn spawn<F>(handler: F) -> Self
    where
        F: Fn(&str, usize) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub registry");
        let addr = listener.local_addr().expect("local addr");
        let hits = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let accept_hits = Arc::clone(&hits);
        let accept_requests = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let handler = Arc::clone(&handler);
                let hits = Arc::clone(&accept_hits);
                let requests = Arc::clone(&accept_requests);

                tokio::spawn(async move {
                    let mut buf = vec![0u8; 16 * 1024];
                    let mut read = 0;
                    loop {
                        let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        read += n;
                        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") || read == buf.len()
                        {
                            break;
                        }
                    }

                    let request = String::from_utf8_lossy(&buf[..read]).to_string();
                    let path = request
                        .split_whitespace()
                        .nth(1)
                        .unwrap_or("/")
                        .to_string();
                    let hit = hits.fetch_add(1, Ordering::SeqCst) + 1;
                    requests.lock().unwrap().push(request);

                    let (status, body) = handler(&path, hit);
                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/vnd.schemaregistry.v1+json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        reason(status),
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            url: format!("http://{}", addr),
            hits,
            requests,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw request heads received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Registry response body for a schema lookup
pub fn schema_body(schema: &str) -> String {
    serde_json::json!({ "schema": schema }).to_string()
}

/// Base URL on which nothing is listening
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
