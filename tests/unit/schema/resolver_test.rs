use crate::unit::common::*;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};
use velotail::velotail::config::SchemaSource;
use velotail::velotail::schema::{RegistryAuth, RegistryClientConfig, SchemaResolver};
use velotail::velotail::serialization::WireEnvelope;

fn registry_config() -> RegistryClientConfig {
    RegistryClientConfig {
        timeout_seconds: 2,
        max_retries: 0,
        retry_delay_ms: 1,
    }
}

#[tokio::test]
async fn test_registry_source_fetches_each_id_once() {
    let registry = StubRegistry::spawn(|path, _| match path {
        "/schemas/ids/1" => (200, schema_body(EVENT_SCHEMA)),
        _ => (404, "{}".to_string()),
    })
    .await;

    let source = SchemaSource::Registry {
        url: registry.url.clone(),
        auth: RegistryAuth::None,
    };
    let mut resolver = SchemaResolver::from_source(&source, &registry_config()).unwrap();

    for text in ["first", "second", "third"] {
        let bytes = framed_event(1, text);
        let envelope = WireEnvelope::parse(&bytes).unwrap();
        let codec = resolver.resolve(&envelope).await.unwrap();
        let rendered = codec.decode_to_text(envelope.payload).unwrap();
        assert!(rendered.contains(text));
    }

    assert_eq!(registry.hits(), 1);
    assert_eq!(resolver.cached_schema_count(), 1);
}

#[tokio::test]
async fn test_registry_unknown_id_is_recoverable() {
    let registry = StubRegistry::spawn(|path, _| match path {
        "/schemas/ids/1" => (200, schema_body(EVENT_SCHEMA)),
        _ => (404, "{}".to_string()),
    })
    .await;

    let source = SchemaSource::Registry {
        url: registry.url.clone(),
        auth: RegistryAuth::None,
    };
    let mut resolver = SchemaResolver::from_source(&source, &registry_config()).unwrap();

    let unknown = framed_event(77, "lost");
    let err = resolver
        .resolve(&WireEnvelope::parse(&unknown).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaError::NotFound { id: 77 }));

    let known = framed_event(1, "found");
    assert!(resolver
        .resolve(&WireEnvelope::parse(&known).unwrap())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_file_source_applies_to_every_id() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(EVENT_SCHEMA.as_bytes()).unwrap();

    let source = SchemaSource::File {
        path: file.path().to_path_buf(),
    };
    let mut resolver = SchemaResolver::from_source(&source, &registry_config()).unwrap();

    for id in [0, 1, 999_999] {
        let bytes = framed_event(id, "from file");
        let envelope = WireEnvelope::parse(&bytes).unwrap();
        let codec = resolver.resolve(&envelope).await.unwrap();
        assert_eq!(
            codec.decode_to_text(envelope.payload).unwrap(),
            r#"{"msg":"from file"}"#
        );
    }
}

#[test]
fn test_file_source_load_errors() {
    let dir = TempDir::new().unwrap();

    let missing = SchemaSource::File {
        path: dir.path().join("missing.avsc"),
    };
    let err = SchemaResolver::from_source(&missing, &registry_config())
        .err()
        .expect("missing file must fail");
    assert!(matches!(err, SchemaError::Load { .. }));
    assert!(err.to_string().contains("missing.avsc"));

    let bad_path: PathBuf = dir.path().join("bad.avsc");
    std::fs::write(&bad_path, r#"{"type": "record", "name": "E", "fields": "nope"}"#).unwrap();
    let bad = SchemaSource::File { path: bad_path };
    let err = SchemaResolver::from_source(&bad, &registry_config())
        .err()
        .expect("malformed schema must fail");
    assert!(matches!(err, SchemaError::Load { .. }));
}

#[tokio::test]
async fn test_registry_source_check() {
    let registry = StubRegistry::spawn(|path, _| match path {
        "/subjects" => (200, "[]".to_string()),
        _ => (404, "{}".to_string()),
    })
    .await;

    let source = SchemaSource::Registry {
        url: registry.url.clone(),
        auth: RegistryAuth::None,
    };
    let resolver = SchemaResolver::from_source(&source, &registry_config()).unwrap();
    assert!(resolver.check_source().await);
    assert!(resolver.describe().contains(registry.url.as_str()));
    assert_eq!(registry.hits(), 1);

    let unreachable = SchemaSource::Registry {
        url: closed_port_url().await,
        auth: RegistryAuth::None,
    };
    let config = RegistryClientConfig {
        max_retries: 3,
        ..registry_config()
    };
    let resolver = SchemaResolver::from_source(&unreachable, &config).unwrap();
    assert!(!resolver.check_source().await);
}
